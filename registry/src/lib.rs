use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::hook::PaymentHooks;
use adapter::kv::RedisClient;
use adapter::notifier::RedisNotifier;
use adapter::repository::{
    booking::BookingRepositoryImpl, catalog::ServiceCatalogImpl, customer::CustomerDirectoryImpl,
    health::HealthCheckRepositoryImpl, service_request::ServiceRequestRepositoryImpl,
    technician::TechnicianDirectoryImpl, wallet::WalletRepositoryImpl,
};
use kernel::dispatch::{matcher::EligibilityMatcher, scheduler::AutoCancelScheduler, DispatchEngine};
use kernel::hook::BookingHooks;
use kernel::notification::Notifier;
use kernel::repository::booking::BookingRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::service_request::ServiceRequestRepository;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    dispatch_engine: Arc<DispatchEngine>,
    scheduler: AutoCancelScheduler,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));

        let booking_repository: Arc<dyn BookingRepository> =
            Arc::new(BookingRepositoryImpl::new(pool.clone()));
        let service_request_repository: Arc<dyn ServiceRequestRepository> =
            Arc::new(ServiceRequestRepositoryImpl::new(pool.clone()));
        let wallet_repository = Arc::new(WalletRepositoryImpl::new(pool.clone()));
        let customer_directory = Arc::new(CustomerDirectoryImpl::new(pool.clone()));
        let service_catalog = Arc::new(ServiceCatalogImpl::new(pool.clone()));
        let technician_directory = Arc::new(TechnicianDirectoryImpl::new(pool.clone()));

        let notifier: Arc<dyn Notifier> = Arc::new(RedisNotifier::new(redis_client));
        let hooks: Arc<dyn BookingHooks> = Arc::new(PaymentHooks::new());

        let matcher = EligibilityMatcher::new(technician_directory);
        let scheduler = AutoCancelScheduler::new(
            booking_repository.clone(),
            service_request_repository.clone(),
            notifier.clone(),
            hooks.clone(),
        );
        let dispatch_engine = Arc::new(DispatchEngine::new(
            booking_repository,
            service_request_repository,
            wallet_repository,
            customer_directory,
            service_catalog,
            notifier,
            hooks,
            matcher,
            scheduler.clone(),
            app_config.dispatch,
        ));

        Self {
            health_check_repository,
            dispatch_engine,
            scheduler,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn dispatch_engine(&self) -> Arc<DispatchEngine> {
        self.dispatch_engine.clone()
    }

    pub fn scheduler(&self) -> AutoCancelScheduler {
        self.scheduler.clone()
    }
}
