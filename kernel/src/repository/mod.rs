pub mod booking;
pub mod catalog;
pub mod customer;
pub mod health;
pub mod service_request;
pub mod technician;
pub mod wallet;
