use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{dto::SlotsEvent, routes, sse::SseBroadcaster, sse_adapter::SseSlotsEventPublisher};
use crate::config::AppointmentsConfig;
use crate::contract::client::AppointmentsApi;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::repo::AppointmentsRepository;
use crate::domain::service::Service;
use crate::gateways::local::AppointmentsLocalClient;
use crate::infra::memory::InMemoryAppointmentsRepository;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmAppointmentsRepository;

/// Wired appointments module: domain service, live-update feed and REST surface.
#[derive(Clone)]
pub struct Appointments {
    service: Arc<Service>,
    sse: SseBroadcaster<SlotsEvent>,
}

impl Appointments {
    /// Wire the service over any repository and clock.
    pub fn with_repo(
        cfg: &AppointmentsConfig,
        repo: Arc<dyn AppointmentsRepository>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        debug!(
            "Loaded appointments config: opening={}, closing={}, granularity={}",
            cfg.opening_minute, cfg.closing_minute, cfg.slot_granularity_minutes
        );
        let service_config = cfg.to_service_config()?;

        let sse = SseBroadcaster::<SlotsEvent>::new(cfg.events_capacity);
        let publisher = Arc::new(SseSlotsEventPublisher::new(sse.clone()));
        let service = Service::new(repo, publisher, clock, service_config);

        Ok(Self {
            service: Arc::new(service),
            sse,
        })
    }

    /// Run migrations, then wire the SeaORM repository with the host clock.
    pub async fn with_database(
        cfg: &AppointmentsConfig,
        db: DatabaseConnection,
    ) -> anyhow::Result<Self> {
        info!("Initializing appointments module");
        Self::migrate(&db).await?;
        let repo = SeaOrmAppointmentsRepository::new(db);
        Self::with_repo(cfg, Arc::new(repo), Arc::new(SystemClock))
    }

    /// Volatile store; everything is lost on restart.
    pub fn in_memory(cfg: &AppointmentsConfig) -> anyhow::Result<Self> {
        info!("Initializing appointments module with in-memory store");
        Self::with_repo(
            cfg,
            Arc::new(InMemoryAppointmentsRepository::new()),
            Arc::new(SystemClock),
        )
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running appointments database migrations");
        Migrator::up(db, None).await?;
        info!("Appointments database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn events(&self) -> SseBroadcaster<SlotsEvent> {
        self.sse.clone()
    }

    /// Local in-process client for other modules.
    pub fn client(&self) -> Arc<dyn AppointmentsApi> {
        Arc::new(AppointmentsLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering appointments REST routes");
        routes::register_routes(router, self.service.clone(), self.sse.clone())
    }
}
