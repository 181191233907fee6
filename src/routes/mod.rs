// Route modules
pub mod availability;
pub mod bookings;
pub mod bundles;
pub mod catalog;
pub mod credits;
pub mod group_sessions;

use crate::{app_state::AppState, middleware::logging_middleware};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    // Booking engine: the write paths that touch multiple resources
    let booking_routes = Router::new()
        .route(
            "/bookings/individual",
            post(bookings::create_individual_booking),
        )
        .route("/availability/{slot_id}/bookings", post(bookings::book_slot))
        .route("/bookings/{booking_id}/cancel", patch(bookings::cancel_booking))
        .route(
            "/bookings/{booking_id}/cancel-slot",
            patch(bookings::cancel_slot_booking),
        )
        .route(
            "/bookings/students/{student_id}",
            get(bookings::get_student_bookings),
        )
        .route("/bookings/tas/{ta_id}", get(bookings::get_ta_bookings));

    // TA availability slots
    let availability_routes = Router::new()
        .route(
            "/tas/{ta_id}/availability",
            post(availability::create_availability).get(availability::get_ta_availability),
        )
        .route(
            "/tas/{ta_id}/availability/{slot_id}",
            patch(availability::update_availability).delete(availability::delete_availability),
        )
        .route(
            "/courses/{course_id}/availability",
            get(availability::get_course_availability),
        );

    // Group sessions
    let group_session_routes = Router::new()
        .route(
            "/tas/{ta_id}/group-sessions",
            post(group_sessions::create_template),
        )
        .route(
            "/group-sessions/{template_id}/materialize",
            post(group_sessions::materialize),
        )
        .route("/group-sessions/{booking_id}/join", post(group_sessions::join))
        .route(
            "/group-sessions/courses/{course_id}",
            get(group_sessions::get_by_course),
        );

    // Bundles and credits
    let entitlement_routes = Router::new()
        .route("/bundles", post(bundles::purchase_bundle))
        .route(
            "/students/{student_id}/bundles",
            get(bundles::get_student_bundles),
        )
        .route(
            "/students/{student_id}/courses/{course_id}/bundles/active",
            get(bundles::get_active_bundles),
        )
        .route("/students/{student_id}/credits", get(credits::get_balance))
        .route(
            "/students/{student_id}/credits/add",
            post(credits::add_credits),
        )
        .route(
            "/students/{student_id}/credits/use",
            post(credits::use_credits),
        )
        .route(
            "/students/{student_id}/credits/refund",
            post(credits::refund_credits),
        )
        .route(
            "/students/{student_id}/credits/history",
            get(credits::get_history),
        );

    // Catalog read paths
    let catalog_routes = Router::new()
        .route("/courses", get(catalog::list_courses))
        .route("/courses/{course_id}", get(catalog::get_course))
        .route(
            "/courses/{course_id}/support-options",
            get(catalog::get_support_options),
        )
        .route("/tas", get(catalog::list_tas));

    Router::new()
        .merge(booking_routes)
        .merge(availability_routes)
        .merge(group_session_routes)
        .merge(entitlement_routes)
        .merge(catalog_routes)
}
