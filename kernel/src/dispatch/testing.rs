//! In-memory fakes for exercising the dispatch core without a database.
//! The booking and wallet fakes reproduce the store-level conditional
//! semantics (status compare-and-set, floor-checked debit) under a
//! single lock, so race assertions hold the same way they do against
//! Postgres.

use crate::hook::{BookingHooks, CancelReason};
use crate::model::{
    booking::{event::CreateBooking, Booking, BookingStatus},
    catalog::SubService,
    geo::GeoPoint,
    id::{BookingId, CategoryId, CustomerId, SubServiceId, TechnicianId},
    service_request::{event::CreateServiceRequest, ServiceRequest},
    slot::TimeSlot,
    technician::Technician,
};
use crate::notification::{Notifier, NotifyEvent, Recipient};
use crate::repository::{
    booking::BookingRepository, catalog::ServiceCatalog, customer::CustomerDirectory,
    service_request::ServiceRequestRepository, technician::TechnicianDirectory,
    wallet::WalletRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::config::DispatchConfig;
use shared::error::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::matcher::EligibilityMatcher;
use super::scheduler::AutoCancelScheduler;
use super::DispatchEngine;

#[derive(Default)]
pub(crate) struct InMemoryBookingStore {
    bookings: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingStore {
    pub(crate) fn insert(&self, booking: Booking) {
        self.bookings
            .lock()
            .unwrap()
            .insert(booking.booking_id, booking);
    }

    pub(crate) fn status_of(&self, booking_id: BookingId) -> Option<BookingStatus> {
        self.bookings
            .lock()
            .unwrap()
            .get(&booking_id)
            .map(|b| b.status)
    }

    pub(crate) fn get(&self, booking_id: BookingId) -> Option<Booking> {
        self.bookings.lock().unwrap().get(&booking_id).cloned()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingStore {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let booking_id = BookingId::new();
        let booking = Booking {
            booking_id,
            customer_id: event.customer_id,
            technician_id: None,
            sub_service_id: event.sub_service_id,
            requested_date: event.requested_date,
            time_slot: event.time_slot,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
            accepted_at: None,
            auto_cancel_at: None,
            arrival_deadline: None,
        };
        self.bookings.lock().unwrap().insert(booking_id, booking);
        Ok(booking_id)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.bookings.lock().unwrap().get(&booking_id).cloned())
    }

    async fn active_duplicate_exists(
        &self,
        customer_id: CustomerId,
        sub_service_id: SubServiceId,
        requested_date: NaiveDate,
        time_slot: TimeSlot,
    ) -> AppResult<bool> {
        Ok(self.bookings.lock().unwrap().values().any(|b| {
            b.customer_id == customer_id
                && b.sub_service_id == sub_service_id
                && b.requested_date == requested_date
                && b.time_slot == time_slot
                && b.status.is_active()
        }))
    }

    async fn mark_broadcast(
        &self,
        booking_id: BookingId,
        auto_cancel_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&booking_id) {
            Some(b) if b.status == BookingStatus::Pending && b.auto_cancel_at.is_none() => {
                b.auto_cancel_at = Some(auto_cancel_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn try_confirm(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
        accepted_at: DateTime<Utc>,
        arrival_deadline: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&booking_id) {
            Some(b) if b.status == BookingStatus::Pending && b.technician_id.is_none() => {
                b.status = BookingStatus::Confirmed;
                b.technician_id = Some(technician_id);
                b.accepted_at = Some(accepted_at);
                b.arrival_deadline = Some(arrival_deadline);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn try_revert_confirm(&self, booking_id: BookingId) -> AppResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&booking_id) {
            Some(b) if b.status == BookingStatus::Confirmed => {
                b.status = BookingStatus::Pending;
                b.technician_id = None;
                b.accepted_at = None;
                b.arrival_deadline = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn try_transition(
        &self,
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&booking_id) {
            Some(b) if b.status == from => {
                b.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_pending_with_deadline(&self) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.status == BookingStatus::Pending && b.auto_cancel_at.is_some())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryServiceRequestStore {
    requests: Mutex<HashMap<BookingId, ServiceRequest>>,
}

impl InMemoryServiceRequestStore {
    pub(crate) fn broadcast_set(&self, booking_id: BookingId) -> Vec<TechnicianId> {
        self.requests
            .lock()
            .unwrap()
            .get(&booking_id)
            .map(|r| r.broadcast_technician_ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryServiceRequestStore {
    async fn create(&self, event: CreateServiceRequest) -> AppResult<()> {
        self.requests.lock().unwrap().insert(
            event.booking_id,
            ServiceRequest {
                booking_id: event.booking_id,
                broadcast_technician_ids: Vec::new(),
                job_notes: event.job_notes,
            },
        );
        Ok(())
    }

    async fn find_by_booking_id(
        &self,
        booking_id: BookingId,
    ) -> AppResult<Option<ServiceRequest>> {
        Ok(self.requests.lock().unwrap().get(&booking_id).cloned())
    }

    async fn set_broadcast_set(
        &self,
        booking_id: BookingId,
        technician_ids: &[TechnicianId],
    ) -> AppResult<()> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .entry(booking_id)
            .or_insert_with(|| ServiceRequest {
                booking_id,
                broadcast_technician_ids: Vec::new(),
                job_notes: None,
            });
        request.broadcast_technician_ids = technician_ids.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryWalletStore {
    balances: Mutex<HashMap<TechnicianId, i64>>,
}

impl InMemoryWalletStore {
    pub(crate) fn set_balance(&self, technician_id: TechnicianId, balance: i64) {
        self.balances.lock().unwrap().insert(technician_id, balance);
    }

    pub(crate) fn balance_of(&self, technician_id: TechnicianId) -> i64 {
        *self
            .balances
            .lock()
            .unwrap()
            .get(&technician_id)
            .unwrap_or(&0)
    }
}

#[async_trait]
impl WalletRepository for InMemoryWalletStore {
    async fn balance(&self, technician_id: TechnicianId) -> AppResult<i64> {
        Ok(self.balance_of(technician_id))
    }

    async fn debit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()> {
        let mut balances = self.balances.lock().unwrap();
        let current = balances.entry(technician_id).or_insert(0);
        if *current < amount {
            return Err(AppError::InsufficientBalance {
                required: amount,
                current: *current,
            });
        }
        *current -= amount;
        Ok(())
    }

    async fn credit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()> {
        let mut balances = self.balances.lock().unwrap();
        *balances.entry(technician_id).or_insert(0) += amount;
        Ok(())
    }
}

/// Wallet whose debits always lose, as if a concurrent debit drained the
/// balance between the engine's precheck and its floor-checked write.
pub(crate) struct DrainedWalletStore;

#[async_trait]
impl WalletRepository for DrainedWalletStore {
    async fn balance(&self, _technician_id: TechnicianId) -> AppResult<i64> {
        Ok(1_000)
    }

    async fn debit(&self, _technician_id: TechnicianId, amount: i64) -> AppResult<()> {
        Err(AppError::InsufficientBalance {
            required: amount,
            current: 0,
        })
    }

    async fn credit(&self, _technician_id: TechnicianId, _amount: i64) -> AppResult<()> {
        Ok(())
    }
}

struct FakeTech {
    technician: Technician,
    approved: bool,
    categories: Vec<CategoryId>,
    availability: HashSet<(NaiveDate, String)>,
}

#[derive(Default)]
pub(crate) struct FakeTechnicianDirectory {
    techs: Mutex<Vec<FakeTech>>,
    geo_queried: AtomicBool,
}

impl FakeTechnicianDirectory {
    pub(crate) fn add_approved(
        &self,
        technician_id: TechnicianId,
        location: GeoPoint,
        categories: &[CategoryId],
    ) {
        self.add(technician_id, location, categories, true);
    }

    pub(crate) fn add_unapproved(
        &self,
        technician_id: TechnicianId,
        location: GeoPoint,
        categories: &[CategoryId],
    ) {
        self.add(technician_id, location, categories, false);
    }

    fn add(
        &self,
        technician_id: TechnicianId,
        location: GeoPoint,
        categories: &[CategoryId],
        approved: bool,
    ) {
        self.techs.lock().unwrap().push(FakeTech {
            technician: Technician {
                technician_id,
                technician_name: format!("tech-{technician_id}"),
                location,
            },
            approved,
            categories: categories.to_vec(),
            availability: HashSet::new(),
        });
    }

    pub(crate) fn add_availability(
        &self,
        technician_id: TechnicianId,
        date: NaiveDate,
        slot: TimeSlot,
    ) {
        let mut techs = self.techs.lock().unwrap();
        if let Some(tech) = techs
            .iter_mut()
            .find(|t| t.technician.technician_id == technician_id)
        {
            tech.availability.insert((date, slot.token()));
        }
    }

    pub(crate) fn geo_queried(&self) -> bool {
        self.geo_queried.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TechnicianDirectory for FakeTechnicianDirectory {
    async fn find_ids_by_category(
        &self,
        category_id: CategoryId,
    ) -> AppResult<Vec<TechnicianId>> {
        Ok(self
            .techs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.categories.contains(&category_id))
            .map(|t| t.technician.technician_id)
            .collect())
    }

    async fn find_approved_near(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        candidates: &[TechnicianId],
    ) -> AppResult<Vec<Technician>> {
        self.geo_queried.store(true, Ordering::SeqCst);
        Ok(self
            .techs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.approved
                    && candidates.contains(&t.technician.technician_id)
                    && center.distance_meters(&t.technician.location) <= radius_meters
            })
            .map(|t| t.technician.clone())
            .collect())
    }

    async fn find_available(
        &self,
        candidates: &[TechnicianId],
        date: NaiveDate,
        slot_token: &str,
    ) -> AppResult<Vec<TechnicianId>> {
        let key = (date, slot_token.to_string());
        Ok(self
            .techs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                candidates.contains(&t.technician.technician_id) && t.availability.contains(&key)
            })
            .map(|t| t.technician.technician_id)
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeCustomerDirectory {
    locations: Mutex<HashMap<CustomerId, GeoPoint>>,
}

impl FakeCustomerDirectory {
    pub(crate) fn set_location(&self, customer_id: CustomerId, location: GeoPoint) {
        self.locations.lock().unwrap().insert(customer_id, location);
    }
}

#[async_trait]
impl CustomerDirectory for FakeCustomerDirectory {
    async fn find_location(&self, customer_id: CustomerId) -> AppResult<Option<GeoPoint>> {
        Ok(self.locations.lock().unwrap().get(&customer_id).copied())
    }
}

#[derive(Default)]
pub(crate) struct FakeServiceCatalog {
    sub_services: Mutex<HashMap<SubServiceId, SubService>>,
}

impl FakeServiceCatalog {
    pub(crate) fn add(
        &self,
        sub_service_id: SubServiceId,
        category_id: CategoryId,
        coin_cost: i64,
    ) {
        self.sub_services.lock().unwrap().insert(
            sub_service_id,
            SubService {
                sub_service_id,
                category_id,
                coin_cost,
            },
        );
    }
}

#[async_trait]
impl ServiceCatalog for FakeServiceCatalog {
    async fn find_sub_service(
        &self,
        sub_service_id: SubServiceId,
    ) -> AppResult<Option<SubService>> {
        Ok(self
            .sub_services
            .lock()
            .unwrap()
            .get(&sub_service_id)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<(Recipient, NotifyEvent)>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<(Recipient, NotifyEvent)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn count_of(&self, event: NotifyEvent) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| *e == event)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipient: Recipient,
        event: NotifyEvent,
        _payload: serde_json::Value,
    ) -> AppResult<()> {
        self.sent.lock().unwrap().push((recipient, event));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HookCall {
    Confirmed(BookingId, TechnicianId),
    Cancelled(BookingId, CancelReason),
}

#[derive(Default)]
pub(crate) struct RecordingHooks {
    calls: Mutex<Vec<HookCall>>,
}

impl RecordingHooks {
    pub(crate) fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingHooks for RecordingHooks {
    async fn on_booking_confirmed(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
    ) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HookCall::Confirmed(booking_id, technician_id));
        Ok(())
    }

    async fn on_booking_cancelled(
        &self,
        booking_id: BookingId,
        reason: CancelReason,
    ) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HookCall::Cancelled(booking_id, reason));
        Ok(())
    }
}

pub(crate) struct SchedulerFixture {
    pub(crate) scheduler: AutoCancelScheduler,
    pub(crate) bookings: Arc<InMemoryBookingStore>,
    pub(crate) requests: Arc<InMemoryServiceRequestStore>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) hooks: Arc<RecordingHooks>,
}

pub(crate) fn scheduler_fixture() -> SchedulerFixture {
    let bookings = Arc::new(InMemoryBookingStore::default());
    let requests = Arc::new(InMemoryServiceRequestStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let hooks = Arc::new(RecordingHooks::default());
    let scheduler = AutoCancelScheduler::new(
        bookings.clone(),
        requests.clone(),
        notifier.clone(),
        hooks.clone(),
    );
    SchedulerFixture {
        scheduler,
        bookings,
        requests,
        notifier,
        hooks,
    }
}

pub(crate) fn pending_booking(auto_cancel_at: Option<DateTime<Utc>>) -> Booking {
    Booking {
        booking_id: BookingId::new(),
        customer_id: CustomerId::new(),
        technician_id: None,
        sub_service_id: SubServiceId::new(),
        requested_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        time_slot: TimeSlot::H10,
        status: BookingStatus::Pending,
        created_at: Utc::now(),
        accepted_at: None,
        auto_cancel_at,
        arrival_deadline: None,
    }
}

pub(crate) struct EngineFixture {
    pub(crate) engine: DispatchEngine,
    pub(crate) scheduler: AutoCancelScheduler,
    pub(crate) bookings: Arc<InMemoryBookingStore>,
    pub(crate) requests: Arc<InMemoryServiceRequestStore>,
    pub(crate) wallets: Arc<InMemoryWalletStore>,
    pub(crate) customers: Arc<FakeCustomerDirectory>,
    pub(crate) catalog: Arc<FakeServiceCatalog>,
    pub(crate) directory: Arc<FakeTechnicianDirectory>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) hooks: Arc<RecordingHooks>,
}

pub(crate) fn engine_fixture() -> EngineFixture {
    let wallets = Arc::new(InMemoryWalletStore::default());
    engine_fixture_inner(wallets.clone(), wallets)
}

/// Same wiring, but every debit fails as if drained concurrently.
pub(crate) fn engine_fixture_with_drained_wallet() -> EngineFixture {
    engine_fixture_inner(
        Arc::new(DrainedWalletStore),
        Arc::new(InMemoryWalletStore::default()),
    )
}

fn engine_fixture_inner(
    wallet_port: Arc<dyn WalletRepository>,
    wallets: Arc<InMemoryWalletStore>,
) -> EngineFixture {
    let bookings = Arc::new(InMemoryBookingStore::default());
    let requests = Arc::new(InMemoryServiceRequestStore::default());
    let customers = Arc::new(FakeCustomerDirectory::default());
    let catalog = Arc::new(FakeServiceCatalog::default());
    let directory = Arc::new(FakeTechnicianDirectory::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let hooks = Arc::new(RecordingHooks::default());

    let matcher = EligibilityMatcher::new(directory.clone());
    let scheduler = AutoCancelScheduler::new(
        bookings.clone(),
        requests.clone(),
        notifier.clone(),
        hooks.clone(),
    );
    let engine = DispatchEngine::new(
        bookings.clone(),
        requests.clone(),
        wallet_port,
        customers.clone(),
        catalog.clone(),
        notifier.clone(),
        hooks.clone(),
        matcher,
        scheduler.clone(),
        DispatchConfig::default(),
    );

    EngineFixture {
        engine,
        scheduler,
        bookings,
        requests,
        wallets,
        customers,
        catalog,
        directory,
        notifier,
        hooks,
    }
}
