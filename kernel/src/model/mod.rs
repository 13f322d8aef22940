pub mod booking;
pub mod catalog;
pub mod geo;
pub mod id;
pub mod service_request;
pub mod slot;
pub mod technician;
pub mod wallet;
