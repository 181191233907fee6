// Service modules
pub mod availability_service;
pub mod booking_service;
pub mod bundle_service;
pub mod catalog_service;
pub mod credits_service;
pub mod group_session_service;

pub use availability_service::AvailabilityService;
pub use booking_service::BookingService;
pub use bundle_service::BundleService;
pub use catalog_service::CatalogService;
pub use credits_service::CreditsService;
pub use group_session_service::GroupSessionService;
