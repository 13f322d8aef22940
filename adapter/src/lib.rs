pub mod database;
pub mod hook;
pub mod kv;
pub mod notifier;
pub mod repository;
