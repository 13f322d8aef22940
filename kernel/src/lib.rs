pub mod dispatch;
pub mod hook;
pub mod model;
pub mod notification;
pub mod repository;
