pub mod booking;
pub mod catalog;
pub mod service_request;
pub mod technician;
