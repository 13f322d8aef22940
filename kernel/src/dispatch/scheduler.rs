use crate::hook::{BookingHooks, CancelReason};
use crate::model::booking::BookingStatus;
use crate::model::id::BookingId;
use crate::notification::{notify_best_effort, Notifier, NotifyEvent, Recipient};
use crate::repository::{booking::BookingRepository, service_request::ServiceRequestRepository};
use chrono::{DateTime, Utc};
use serde_json::json;
use shared::error::AppResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Process-local registry of one-shot auto-cancel timers, keyed by
/// booking id. The registry is a cache, never the source of truth: the
/// durable deadline lives on the booking row, `fire` re-checks status
/// before acting, and `recover` rebuilds the registry at boot. At most
/// one live timer exists per booking id; re-arming disarms first.
#[derive(Clone)]
pub struct AutoCancelScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    timers: Mutex<HashMap<BookingId, JoinHandle<()>>>,
    bookings: Arc<dyn BookingRepository>,
    requests: Arc<dyn ServiceRequestRepository>,
    notifier: Arc<dyn Notifier>,
    hooks: Arc<dyn BookingHooks>,
}

impl AutoCancelScheduler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        requests: Arc<dyn ServiceRequestRepository>,
        notifier: Arc<dyn Notifier>,
        hooks: Arc<dyn BookingHooks>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                timers: Mutex::new(HashMap::new()),
                bookings,
                requests,
                notifier,
                hooks,
            }),
        }
    }

    /// Schedule the auto-cancellation of `booking_id` at `deadline`. A
    /// deadline already in the past fires immediately instead of
    /// scheduling.
    pub async fn arm(&self, booking_id: BookingId, deadline: DateTime<Utc>) -> AppResult<()> {
        self.disarm(booking_id).await;

        let delay = match (deadline - Utc::now()).to_std() {
            Ok(delay) => delay,
            Err(_) => {
                tracing::info!(%booking_id, %deadline, "deadline already passed, firing now");
                return self.fire(booking_id).await;
            }
        };

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = scheduler.fire(booking_id).await {
                // Never let one booking's failure take down the timer
                // loop for the others.
                tracing::error!(%booking_id, %error, "auto-cancel fire failed");
            }
        });

        self.inner.timers.lock().await.insert(booking_id, handle);
        tracing::debug!(%booking_id, %deadline, "auto-cancel timer armed");
        Ok(())
    }

    /// Cancel any pending timer for the id; no-op when absent. Advisory
    /// cleanup only: a timer that slips through still re-checks status
    /// in `fire` and becomes a no-op.
    pub async fn disarm(&self, booking_id: BookingId) {
        if let Some(handle) = self.inner.timers.lock().await.remove(&booking_id) {
            handle.abort();
            tracing::debug!(%booking_id, "auto-cancel timer disarmed");
        }
    }

    /// The timer callback body, also invoked by the defensive
    /// `auto_cancel_check` poke. Transitions a still-pending booking to
    /// `AutoCancelled`; the conditional status update makes redundant or
    /// raced invocations harmless.
    pub async fn fire(&self, booking_id: BookingId) -> AppResult<()> {
        if let Some(handle) = self.inner.timers.lock().await.remove(&booking_id) {
            handle.abort();
        }

        let Some(booking) = self.inner.bookings.find_by_id(booking_id).await? else {
            tracing::warn!(%booking_id, "auto-cancel fired for a vanished booking");
            return Ok(());
        };
        if booking.status != BookingStatus::Pending {
            tracing::debug!(%booking_id, status = %booking.status, "booking already resolved");
            return Ok(());
        }

        let transitioned = self
            .inner
            .bookings
            .try_transition(booking_id, BookingStatus::Pending, BookingStatus::AutoCancelled)
            .await?;
        if !transitioned {
            // Raced by an acceptance or a manual cancel between the
            // fetch and the conditional update.
            tracing::debug!(%booking_id, "auto-cancel lost the transition race");
            return Ok(());
        }

        tracing::info!(%booking_id, "booking auto-cancelled at deadline");

        // The status is durably committed; everything below is
        // best-effort and must not bubble up.
        let broadcast_set = match self.inner.requests.find_by_booking_id(booking_id).await {
            Ok(Some(request)) => request.broadcast_technician_ids,
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%booking_id, %error, "broadcast set unavailable for close-out");
                Vec::new()
            }
        };

        let payload = json!({ "bookingId": booking_id });
        for technician_id in broadcast_set {
            notify_best_effort(
                self.inner.notifier.as_ref(),
                Recipient::Technician(technician_id),
                NotifyEvent::BookingAutoCancelled,
                payload.clone(),
            )
            .await;
        }
        notify_best_effort(
            self.inner.notifier.as_ref(),
            Recipient::Customer(booking.customer_id),
            NotifyEvent::BookingAutoCancelled,
            payload,
        )
        .await;

        if let Err(error) = self
            .inner
            .hooks
            .on_booking_cancelled(booking_id, CancelReason::Auto)
            .await
        {
            tracing::warn!(%booking_id, %error, "cancellation hook failed");
        }

        Ok(())
    }

    /// Boot recovery: re-scan pending bookings carrying a deadline and
    /// rebuild the timer registry. Past deadlines fire immediately.
    pub async fn recover(&self) -> AppResult<()> {
        let pending = self.inner.bookings.find_pending_with_deadline().await?;
        let total = pending.len();
        for booking in pending {
            let Some(deadline) = booking.auto_cancel_at else {
                continue;
            };
            if let Err(error) = self.arm(booking.booking_id, deadline).await {
                tracing::error!(booking_id = %booking.booking_id, %error, "recovery arm failed");
            }
        }
        tracing::info!(total, "auto-cancel scheduler recovered");
        Ok(())
    }

    /// Best-effort disarm of every timer. Durable deadlines are
    /// untouched; the next boot recovery re-arms them.
    pub async fn shutdown(&self) {
        let mut timers = self.inner.timers.lock().await;
        let total = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        tracing::info!(total, "auto-cancel scheduler shut down");
    }

    pub async fn armed_count(&self) -> usize {
        self.inner.timers.lock().await.len()
    }
}
