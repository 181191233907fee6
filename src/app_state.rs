use crate::{
    config::Config,
    services::{
        AvailabilityService, BookingService, BundleService, CatalogService, CreditsService,
        GroupSessionService,
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub booking_service: Arc<BookingService>,
    pub availability_service: Arc<AvailabilityService>,
    pub group_session_service: Arc<GroupSessionService>,
    pub bundle_service: Arc<BundleService>,
    pub credits_service: Arc<CreditsService>,
    pub catalog_service: Arc<CatalogService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Connect to database
        let db = sea_orm::Database::connect(&config.database.url).await?;

        // Initialize services
        let credits_service = Arc::new(CreditsService::new(db.clone()));
        let availability_service = Arc::new(AvailabilityService::new(db.clone()));
        let booking_service = Arc::new(BookingService::new(
            db.clone(),
            credits_service.clone(),
            availability_service.clone(),
            &config.booking,
        ));
        let group_session_service = Arc::new(GroupSessionService::new(
            db.clone(),
            availability_service.clone(),
            &config.booking,
        ));
        let bundle_service = Arc::new(BundleService::new(db.clone()));
        let catalog_service = Arc::new(CatalogService::new(db.clone()));

        Ok(Self {
            db,
            booking_service,
            availability_service,
            group_session_service,
            bundle_service,
            credits_service,
            catalog_service,
            config: Arc::new(config),
        })
    }
}
