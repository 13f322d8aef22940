use crate::model::booking::{
    AcceptBookingRequest, BookingResponse, BroadcastResponse, CancelBookingRequest,
    CreateBookingRequest, CreateBookingResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garde::Validate;
use kernel::dispatch::BookingDraft;
use kernel::model::{id::BookingId, slot::TimeSlot};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_booking(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let Some(time_slot) = TimeSlot::from_token(&req.time_slot) else {
        return Err(AppError::UnprocessableEntity(format!(
            "'{}' is not a bookable time slot",
            req.time_slot
        )));
    };

    let booking_id = registry
        .dispatch_engine()
        .create_booking(BookingDraft::new(
            req.customer_id,
            req.sub_service_id,
            req.requested_date,
            time_slot,
            req.job_notes,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse { booking_id }),
    ))
}

pub async fn broadcast_booking(
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BroadcastResponse>> {
    let outcome = registry.dispatch_engine().broadcast(booking_id).await?;
    Ok(Json(BroadcastResponse {
        notified_technicians: outcome.technician_ids.len(),
        auto_cancel_at: outcome.auto_cancel_at,
    }))
}

pub async fn accept_booking(
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<AcceptBookingRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;
    registry
        .dispatch_engine()
        .accept(booking_id, req.technician_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn cancel_booking(
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CancelBookingRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;
    registry
        .dispatch_engine()
        .cancel_by_customer(booking_id, req.customer_id)
        .await?;
    Ok(StatusCode::OK)
}

/// Defensive expiry poke, safe to call at any time for any booking.
pub async fn expiry_check(
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .dispatch_engine()
        .auto_cancel_check(booking_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn show_booking(
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    registry
        .dispatch_engine()
        .find_booking(booking_id)
        .await
        .map(BookingResponse::from)
        .map(Json)
}
