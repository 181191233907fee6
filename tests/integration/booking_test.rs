use crate::{
    booking_service, create_course, create_product, create_student, create_ta, link_ta_to_course,
    setup_test_db, upcoming_at,
};
use entity::sea_orm_active_enums::{BookingStatus, CoverageType, ProductType};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use tutorhub::services::booking_service::NewIndividualBooking;
use tutorhub::services::bundle_service::NewBundlePurchase;
use tutorhub::services::{BundleService, CreditsService};
use tutorhub::ApiError;

fn request(
    student_id: uuid::Uuid,
    course_id: uuid::Uuid,
    ta_id: uuid::Uuid,
    date: time::OffsetDateTime,
    duration_minutes: i32,
) -> NewIndividualBooking {
    NewIndividualBooking {
        student_id,
        course_id,
        ta_id: Some(ta_id),
        date,
        duration_minutes,
        bundle_purchase_id: None,
        pay_with_credits: false,
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_ta_conflict_boundaries() {
    let db = setup_test_db().await;
    let service = booking_service(&db);

    let student = create_student(&db).await;
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

    // 10:00-11:00 books fine
    let booking = service
        .create_individual_booking(request(
            student.id,
            course.id,
            ta.id,
            upcoming_at(10, 0),
            60,
        ))
        .await
        .expect("First booking should succeed");
    assert_eq!(booking.status, BookingStatus::Booked);
    assert_eq!(booking.price_per_student, Decimal::new(4000, 2));

    // 10:30-11:00 lands inside the existing span
    let conflict = service
        .create_individual_booking(request(
            student.id,
            course.id,
            ta.id,
            upcoming_at(10, 30),
            30,
        ))
        .await;
    assert!(matches!(conflict, Err(ApiError::Conflict(_))));

    // 11:00-11:30 only touches the boundary
    let adjacent = service
        .create_individual_booking(request(
            student.id,
            course.id,
            ta.id,
            upcoming_at(11, 0),
            30,
        ))
        .await;
    assert!(adjacent.is_ok(), "Boundary touch must not conflict");
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_longer_booking_straddling_existing_start_conflicts() {
    let db = setup_test_db().await;
    let service = booking_service(&db);

    let student = create_student(&db).await;
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

    service
        .create_individual_booking(request(
            student.id,
            course.id,
            ta.id,
            upcoming_at(10, 0),
            30,
        ))
        .await
        .unwrap();

    // 09:45-11:15 starts earlier and extends past the existing start
    let conflict = service
        .create_individual_booking(request(
            student.id,
            course.id,
            ta.id,
            upcoming_at(9, 45),
            90,
        ))
        .await;
    assert!(matches!(conflict, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_bundle_booking_round_trip() {
    let db = setup_test_db().await;
    let service = booking_service(&db);
    let bundles = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let ta = create_ta(&db).await;
    let course = create_course(&db).await;
    link_ta_to_course(&db, course.id, ta.id).await;
    let product = create_product(
        &db,
        course.id,
        ProductType::FullSemesterBundle,
        Decimal::new(40000, 2),
    )
    .await;

    let now = time::OffsetDateTime::now_utc();
    let bundle = bundles
        .purchase_bundle(NewBundlePurchase {
            student_id: student.id,
            course_id: course.id,
            product_id: product.id,
            coverage_type: CoverageType::FullSemester,
            total_sessions: 12,
            valid_from: now - time::Duration::days(1),
            valid_to: now + time::Duration::days(120),
        })
        .await
        .expect("Failed to purchase bundle");
    assert_eq!(bundle.remaining_sessions, 12);

    let mut booking_request = request(student.id, course.id, ta.id, upcoming_at(14, 0), 60);
    booking_request.bundle_purchase_id = Some(bundle.id);
    let booking = service
        .create_individual_booking(booking_request)
        .await
        .expect("Bundle booking should succeed");

    // Bundle covers the cost; the session comes off the counter
    assert_eq!(booking.price_per_student, Decimal::ZERO);
    assert_eq!(booking.bundle_purchase_id, Some(bundle.id));
    let reloaded = entity::bundle_purchases::Entity::find_by_id(bundle.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.remaining_sessions, 11);

    // Cancelling refunds exactly one session
    let cancelled = service.cancel_booking(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let reloaded = entity::bundle_purchases::Entity::find_by_id(bundle.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.remaining_sessions, 12);

    // A second cancel must not refund again
    let again = service.cancel_booking(booking.id).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
    let reloaded = entity::bundle_purchases::Entity::find_by_id(bundle.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.remaining_sessions, 12);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_credits_paid_booking_refunds_on_cancel() {
    let db = setup_test_db().await;
    let service = booking_service(&db);
    let credits = CreditsService::new(db.clone());

    let student = create_student(&db).await;
    let ta = create_ta(&db).await;
    let course = create_course(&db).await;
    link_ta_to_course(&db, course.id, ta.id).await;
    // 40.50 rounds up to 41 whole credits
    create_product(
        &db,
        course.id,
        ProductType::IndividualSession,
        Decimal::new(4050, 2),
    )
    .await;

    credits
        .add_credits(student.id, 100, "Initial grant")
        .await
        .unwrap();

    let mut booking_request = request(student.id, course.id, ta.id, upcoming_at(9, 0), 60);
    booking_request.pay_with_credits = true;
    let booking = service
        .create_individual_booking(booking_request)
        .await
        .expect("Credits booking should succeed");

    assert_eq!(booking.price_per_student, Decimal::ZERO);
    assert_eq!(booking.credits_spent, 41);
    let balance = credits.get_balance(student.id).await.unwrap();
    assert_eq!(balance.used_credits, 41);

    service.cancel_booking(booking.id).await.unwrap();
    let balance = credits.get_balance(student.id).await.unwrap();
    assert_eq!(balance.used_credits, 0);
    assert_eq!(balance.available_credits, 100);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_insufficient_credits_leaves_no_partial_booking() {
    let db = setup_test_db().await;
    let service = booking_service(&db);
    let credits = CreditsService::new(db.clone());

    let student = create_student(&db).await;
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

    credits.add_credits(student.id, 10, "Too little").await.unwrap();

    let mut booking_request = request(student.id, course.id, ta.id, upcoming_at(9, 0), 60);
    booking_request.pay_with_credits = true;
    let result = service.create_individual_booking(booking_request).await;
    assert!(matches!(
        result,
        Err(ApiError::InsufficientEntitlement(_))
    ));

    // The whole transaction rolled back: no booking, no deduction
    let bookings = service.get_student_bookings(student.id).await.unwrap();
    assert!(bookings.is_empty());
    let balance = credits.get_balance(student.id).await.unwrap();
    assert_eq!(balance.used_credits, 0);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_ta_auto_pick_and_no_ta_available() {
    let db = setup_test_db().await;
    let service = booking_service(&db);

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    create_product(
        &db,
        course.id,
        ProductType::IndividualSession,
        Decimal::new(4000, 2),
    )
    .await;

    // No TA linked yet
    let result = service
        .create_individual_booking(NewIndividualBooking {
            student_id: student.id,
            course_id: course.id,
            ta_id: None,
            date: upcoming_at(10, 0),
            duration_minutes: 60,
            bundle_purchase_id: None,
            pay_with_credits: false,
        })
        .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));

    // With a linked TA the engine picks one itself
    let ta = create_ta(&db).await;
    link_ta_to_course(&db, course.id, ta.id).await;
    let booking = service
        .create_individual_booking(NewIndividualBooking {
            student_id: student.id,
            course_id: course.id,
            ta_id: None,
            date: upcoming_at(10, 0),
            duration_minutes: 60,
            bundle_purchase_id: None,
            pay_with_credits: false,
        })
        .await
        .expect("Booking with auto-picked TA should succeed");
    assert_eq!(booking.ta_id, ta.id);
}
