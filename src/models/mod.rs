// Request/Response models
pub mod availability;
pub mod bookings;
pub mod bundles;
pub mod catalog;
pub mod common;
pub mod credits;
pub mod group_sessions;
