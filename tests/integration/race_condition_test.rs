//! Race-condition tests for the two shared counters: ad-hoc slot seats and
//! group-session capacity. N concurrent attempts against capacity C must
//! admit exactly C and reject the rest with a capacity error, never a 500.

use crate::{
    booking_service, create_course, create_product, create_student, create_ta,
    group_session_service, link_ta_to_course, setup_test_db,
};
use entity::sea_orm_active_enums::ProductType;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::sync::Arc;
use tokio::task::JoinSet;
use tutorhub::services::group_session_service::NewTemplate;
use tutorhub::services::AvailabilityService;
use tutorhub::ApiError;

fn date_string_days_ahead(days: i64) -> String {
    let date = time::OffsetDateTime::now_utc().date() + time::Duration::days(days);
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_concurrent_slot_bookings_respect_capacity() {
    let db = setup_test_db().await;
    let availability = AvailabilityService::new(db.clone());
    let service = Arc::new(booking_service(&db));

    let ta = create_ta(&db).await;
    let course = create_course(&db).await;
    link_ta_to_course(&db, course.id, ta.id).await;
    create_product(
        &db,
        course.id,
        ProductType::IndividualSession,
        Decimal::new(4000, 2),
    )
    .await;

    let slot = availability
        .create_availability(
            ta.id,
            course.id,
            &date_string_days_ahead(3),
            "10:00",
            "11:00",
            3,
        )
        .await
        .expect("Failed to create slot");

    let mut students = Vec::new();
    for _ in 0..8 {
        students.push(create_student(&db).await);
    }

    // 8 concurrent attempts at 3 seats
    let mut tasks = JoinSet::new();
    for student in students {
        let service_clone = service.clone();
        let slot_id = slot.id;
        tasks.spawn(async move {
            service_clone
                .book_slot(slot_id, student.id, None, false)
                .await
        });
    }

    let mut success_count = 0;
    let mut capacity_count = 0;
    let mut other_error_count = 0;

    while let Some(result) = tasks.join_next().await {
        match result.expect("Task panicked") {
            Ok(_) => success_count += 1,
            Err(ApiError::CapacityExceeded(_)) => capacity_count += 1,
            Err(e) => {
                println!("Unexpected error: {}", e);
                other_error_count += 1;
            }
        }
    }

    assert_eq!(success_count, 3, "Expected exactly capacity bookings");
    assert_eq!(capacity_count, 5, "Expected the rest to hit capacity");
    assert_eq!(other_error_count, 0, "Expected no unexpected errors");

    // The counter ends exactly at capacity
    let reloaded = entity::ta_availability::Entity::find_by_id(slot.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.booked_count, 3);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_concurrent_group_joins_respect_capacity() {
    let db = setup_test_db().await;
    let service = Arc::new(group_session_service(&db));

    let ta = create_ta(&db).await;
    let course = create_course(&db).await;

    let template = service
        .create_template(
            ta.id,
            NewTemplate {
                course_id: course.id,
                day_of_week: 2,
                start_time: "17:00".to_string(),
                end_time: "18:30".to_string(),
                capacity: 4,
                price_per_student: Decimal::new(1800, 2),
            },
        )
        .await
        .unwrap();
    let occurrences = service
        .materialize_occurrences(template.id, Some(1))
        .await
        .unwrap();
    let booking_id = occurrences[0].id;

    let mut students = Vec::new();
    for _ in 0..8 {
        students.push(create_student(&db).await);
    }

    let mut tasks = JoinSet::new();
    for student in students {
        let service_clone = service.clone();
        tasks.spawn(async move {
            service_clone
                .join_group_session(booking_id, student.id)
                .await
        });
    }

    let mut success_count = 0;
    let mut capacity_count = 0;
    let mut other_error_count = 0;

    while let Some(result) = tasks.join_next().await {
        match result.expect("Task panicked") {
            Ok(_) => success_count += 1,
            Err(ApiError::CapacityExceeded(_)) => capacity_count += 1,
            Err(e) => {
                println!("Unexpected error: {}", e);
                other_error_count += 1;
            }
        }
    }

    assert_eq!(success_count, 4, "Expected exactly capacity joins");
    assert_eq!(capacity_count, 4, "Expected the rest to hit capacity");
    assert_eq!(other_error_count, 0, "Expected no unexpected errors");

    // Seat occupation is the join-row count, and it must not exceed capacity
    let seat_count = entity::booking_students::Entity::find()
        .filter(entity::booking_students::Column::BookingId.eq(booking_id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(seat_count, 4);
}
