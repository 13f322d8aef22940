use crate::hook::{BookingHooks, CancelReason};
use crate::model::{
    booking::{event::CreateBooking, Booking, BookingStatus},
    id::{BookingId, CustomerId, SubServiceId, TechnicianId},
    service_request::event::CreateServiceRequest,
    slot::TimeSlot,
};
use crate::notification::{notify_best_effort, Notifier, NotifyEvent, Recipient};
use crate::repository::{
    booking::BookingRepository, catalog::ServiceCatalog, customer::CustomerDirectory,
    service_request::ServiceRequestRepository, wallet::WalletRepository,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use derive_new::new;
use serde_json::json;
use shared::config::DispatchConfig;
use shared::error::{AppError, AppResult};
use std::sync::Arc;

pub mod matcher;
pub mod scheduler;
#[cfg(test)]
pub(crate) mod testing;

use matcher::EligibilityMatcher;
use scheduler::AutoCancelScheduler;

/// A customer's booking submission, before any persistence.
#[derive(Debug, new)]
pub struct BookingDraft {
    pub customer_id: CustomerId,
    pub sub_service_id: SubServiceId,
    pub requested_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub job_notes: Option<String>,
}

/// What a successful broadcast produced: the snapshot of notified
/// technicians and the armed deadline.
#[derive(Debug)]
pub struct BroadcastOutcome {
    pub technician_ids: Vec<TechnicianId>,
    pub auto_cancel_at: DateTime<Utc>,
}

/// Orchestrates the booking lifecycle: create, broadcast to eligible
/// technicians, resolve the acceptance race, customer cancellation and
/// the defensive expiry check. Correctness under concurrency rests on
/// the store's conditional updates, not on locks held here.
pub struct DispatchEngine {
    bookings: Arc<dyn BookingRepository>,
    requests: Arc<dyn ServiceRequestRepository>,
    wallets: Arc<dyn WalletRepository>,
    customers: Arc<dyn CustomerDirectory>,
    catalog: Arc<dyn ServiceCatalog>,
    notifier: Arc<dyn Notifier>,
    hooks: Arc<dyn BookingHooks>,
    matcher: EligibilityMatcher,
    scheduler: AutoCancelScheduler,
    config: DispatchConfig,
}

impl DispatchEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        requests: Arc<dyn ServiceRequestRepository>,
        wallets: Arc<dyn WalletRepository>,
        customers: Arc<dyn CustomerDirectory>,
        catalog: Arc<dyn ServiceCatalog>,
        notifier: Arc<dyn Notifier>,
        hooks: Arc<dyn BookingHooks>,
        matcher: EligibilityMatcher,
        scheduler: AutoCancelScheduler,
        config: DispatchConfig,
    ) -> Self {
        Self {
            bookings,
            requests,
            wallets,
            customers,
            catalog,
            notifier,
            hooks,
            matcher,
            scheduler,
            config,
        }
    }

    /// Create a booking in `Pending` with no deadline, plus its paired
    /// service request.
    pub async fn create_booking(&self, draft: BookingDraft) -> AppResult<BookingId> {
        if self
            .customers
            .find_location(draft.customer_id)
            .await?
            .is_none()
        {
            return Err(AppError::PreconditionFailed(
                "customer has no registered location; set an address first".into(),
            ));
        }

        if self
            .catalog
            .find_sub_service(draft.sub_service_id)
            .await?
            .is_none()
        {
            return Err(AppError::EntityNotFound(format!(
                "sub-service {} not found",
                draft.sub_service_id
            )));
        }

        if self
            .bookings
            .active_duplicate_exists(
                draft.customer_id,
                draft.sub_service_id,
                draft.requested_date,
                draft.time_slot,
            )
            .await?
        {
            return Err(AppError::DuplicateBooking);
        }

        let booking_id = self
            .bookings
            .create(CreateBooking::new(
                draft.customer_id,
                draft.sub_service_id,
                draft.requested_date,
                draft.time_slot,
            ))
            .await?;
        self.requests
            .create(CreateServiceRequest::new(booking_id, draft.job_notes))
            .await?;

        tracing::info!(%booking_id, "booking created");
        Ok(booking_id)
    }

    /// Compute eligibility, persist the broadcast snapshot, arm the
    /// deadline and fan out to every eligible technician. Call at most
    /// once per pending lifetime; `NoTechniciansAvailable` leaves the
    /// booking pending and retryable.
    pub async fn broadcast(&self, booking_id: BookingId) -> AppResult<BroadcastOutcome> {
        let booking = self.fetch_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::AlreadyProcessed);
        }
        if booking.auto_cancel_at.is_some() {
            return Err(AppError::AlreadyProcessed);
        }

        let Some(location) = self.customers.find_location(booking.customer_id).await? else {
            return Err(AppError::PreconditionFailed(
                "customer has no registered location; set an address first".into(),
            ));
        };
        let sub_service = self.fetch_sub_service(booking.sub_service_id).await?;

        let eligible = self
            .matcher
            .find_eligible(
                location,
                sub_service.category_id,
                booking.requested_date,
                booking.time_slot,
                self.config.search_radius_meters,
            )
            .await?;
        if eligible.is_empty() {
            return Err(AppError::NoTechniciansAvailable);
        }
        let technician_ids: Vec<TechnicianId> =
            eligible.iter().map(|t| t.technician_id).collect();

        // The snapshot and the deadline commit before anybody is told.
        self.requests
            .set_broadcast_set(booking_id, &technician_ids)
            .await?;
        let auto_cancel_at =
            Utc::now() + Duration::minutes(self.config.broadcast_window_minutes);
        if !self.bookings.mark_broadcast(booking_id, auto_cancel_at).await? {
            return Err(AppError::AlreadyProcessed);
        }

        self.scheduler.arm(booking_id, auto_cancel_at).await?;

        let payload = json!({
            "bookingId": booking_id,
            "requestedDate": booking.requested_date,
            "timeSlot": booking.time_slot.token(),
        });
        for technician_id in &technician_ids {
            notify_best_effort(
                self.notifier.as_ref(),
                Recipient::Technician(*technician_id),
                NotifyEvent::NewBookingRequest,
                payload.clone(),
            )
            .await;
        }

        tracing::info!(%booking_id, broadcast = technician_ids.len(), %auto_cancel_at, "booking broadcast");
        Ok(BroadcastOutcome {
            technician_ids,
            auto_cancel_at,
        })
    }

    /// The acceptance race point. First committer wins via the store's
    /// status compare-and-set; everyone else observes `AlreadyProcessed`,
    /// the expected outcome of losing, not a fault.
    pub async fn accept(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
    ) -> AppResult<()> {
        let booking = self.fetch_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::AlreadyProcessed);
        }

        let sub_service = self.fetch_sub_service(booking.sub_service_id).await?;
        let cost = sub_service.coin_cost;

        // Balance precheck: reject without touching anything so the
        // booking stays acceptable by other technicians.
        let current = self.wallets.balance(technician_id).await?;
        if current < cost {
            return Err(AppError::InsufficientBalance {
                required: cost,
                current,
            });
        }

        let accepted_at = Utc::now();
        let arrival_deadline = booking.time_slot.start_datetime(booking.requested_date);
        if !self
            .bookings
            .try_confirm(booking_id, technician_id, accepted_at, arrival_deadline)
            .await?
        {
            return Err(AppError::AlreadyProcessed);
        }

        // The confirm CAS won; the debit can still lose to a concurrent
        // drain of the same wallet, in which case the confirmation is
        // reverted and the booking reopens for the rest of the set.
        if let Err(debit_error) = self.wallets.debit(technician_id, cost).await {
            if let Err(revert_error) = self.bookings.try_revert_confirm(booking_id).await {
                tracing::error!(%booking_id, %revert_error, "failed to revert confirmation");
            }
            return Err(debit_error);
        }

        self.scheduler.disarm(booking_id).await;

        let payload = json!({
            "bookingId": booking_id,
            "technicianId": technician_id,
            "acceptedAt": accepted_at,
        });
        notify_best_effort(
            self.notifier.as_ref(),
            Recipient::Customer(booking.customer_id),
            NotifyEvent::BookingAccepted,
            payload.clone(),
        )
        .await;
        for other in self.broadcast_set_of(booking_id).await {
            if other != technician_id {
                notify_best_effort(
                    self.notifier.as_ref(),
                    Recipient::Technician(other),
                    NotifyEvent::BookingRequestClosed,
                    json!({ "bookingId": booking_id }),
                )
                .await;
            }
        }

        if let Err(error) = self
            .hooks
            .on_booking_confirmed(booking_id, technician_id)
            .await
        {
            tracing::warn!(%booking_id, %error, "confirmation hook failed");
        }

        tracing::info!(%booking_id, %technician_id, "booking confirmed");
        Ok(())
    }

    /// Customer-initiated cancellation, permitted only while pending and
    /// within the grace window measured from booking creation (not from
    /// broadcast).
    pub async fn cancel_by_customer(
        &self,
        booking_id: BookingId,
        customer_id: CustomerId,
    ) -> AppResult<()> {
        let booking = self.fetch_booking(booking_id).await?;
        if booking.customer_id != customer_id {
            return Err(AppError::ForbiddenOperation(
                "booking belongs to another customer".into(),
            ));
        }

        match booking.status {
            BookingStatus::Pending => {}
            BookingStatus::Confirmed | BookingStatus::InProgress | BookingStatus::Completed => {
                return Err(AppError::AlreadyConfirmed);
            }
            _ => return Err(AppError::AlreadyProcessed),
        }

        let grace_deadline =
            booking.created_at + Duration::minutes(self.config.grace_window_minutes);
        if Utc::now() > grace_deadline {
            return Err(AppError::WindowExpired);
        }

        if !self
            .bookings
            .try_transition(booking_id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await?
        {
            return Err(AppError::AlreadyProcessed);
        }

        self.scheduler.disarm(booking_id).await;

        for technician_id in self.broadcast_set_of(booking_id).await {
            notify_best_effort(
                self.notifier.as_ref(),
                Recipient::Technician(technician_id),
                NotifyEvent::BookingRequestClosed,
                json!({ "bookingId": booking_id }),
            )
            .await;
        }

        if let Err(error) = self
            .hooks
            .on_booking_cancelled(booking_id, CancelReason::Customer)
            .await
        {
            tracing::warn!(%booking_id, %error, "cancellation hook failed");
        }

        tracing::info!(%booking_id, "booking cancelled by customer");
        Ok(())
    }

    /// Defensive poke alongside the scheduler: if the deadline has
    /// passed and the booking is still pending, perform the same
    /// transition the timer would. Safe to call redundantly.
    pub async fn auto_cancel_check(&self, booking_id: BookingId) -> AppResult<()> {
        let booking = self.fetch_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Ok(());
        }
        let Some(auto_cancel_at) = booking.auto_cancel_at else {
            // Never broadcast, so there is no deadline to enforce.
            return Ok(());
        };
        if Utc::now() < auto_cancel_at {
            return Ok(());
        }
        self.scheduler.fire(booking_id).await
    }

    pub async fn find_booking(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.fetch_booking(booking_id).await
    }

    async fn fetch_booking(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("booking {booking_id} not found")))
    }

    async fn fetch_sub_service(
        &self,
        sub_service_id: SubServiceId,
    ) -> AppResult<crate::model::catalog::SubService> {
        self.catalog
            .find_sub_service(sub_service_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("sub-service {sub_service_id} not found"))
            })
    }

    async fn broadcast_set_of(&self, booking_id: BookingId) -> Vec<TechnicianId> {
        match self.requests.find_by_booking_id(booking_id).await {
            Ok(Some(request)) => request.broadcast_technician_ids,
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%booking_id, %error, "broadcast set unavailable for close-out");
                Vec::new()
            }
        }
    }
}
