use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    accept_booking, broadcast_booking, cancel_booking, expiry_check, register_booking,
    show_booking,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let booking_routers = Router::new()
        .route("/", post(register_booking))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id/broadcast", post(broadcast_booking))
        .route("/:booking_id/accept", post(accept_booking))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/expiry-check", post(expiry_check));

    Router::new().nest("/bookings", booking_routers)
}
