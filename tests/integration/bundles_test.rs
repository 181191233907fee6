use crate::{create_course, create_product, create_student, setup_test_db};
use entity::sea_orm_active_enums::{CoverageType, ProductType};
use rust_decimal::Decimal;
use sea_orm::{entity::*, EntityTrait};
use tutorhub::services::bundle_service::NewBundlePurchase;
use tutorhub::services::BundleService;
use tutorhub::ApiError;

fn purchase(
    student_id: uuid::Uuid,
    course_id: uuid::Uuid,
    product_id: uuid::Uuid,
) -> NewBundlePurchase {
    let now = time::OffsetDateTime::now_utc();
    NewBundlePurchase {
        student_id,
        course_id,
        product_id,
        coverage_type: CoverageType::FullSemester,
        total_sessions: 12,
        valid_from: now - time::Duration::days(1),
        valid_to: now + time::Duration::days(120),
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_purchase_initializes_counters() {
    let db = setup_test_db().await;
    let service = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    let product = create_product(
        &db,
        course.id,
        ProductType::FullSemesterBundle,
        Decimal::new(40000, 2),
    )
    .await;

    let bundle = service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await
        .expect("Purchase should succeed");

    assert_eq!(bundle.total_sessions, 12);
    assert_eq!(bundle.remaining_sessions, 12);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_duplicate_purchase_is_rejected() {
    let db = setup_test_db().await;
    let service = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    let product = create_product(
        &db,
        course.id,
        ProductType::FullSemesterBundle,
        Decimal::new(40000, 2),
    )
    .await;

    service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await
        .unwrap();

    let duplicate = service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await;
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_duplicate_rejected_even_when_exhausted_and_expired() {
    let db = setup_test_db().await;
    let service = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    let product = create_product(
        &db,
        course.id,
        ProductType::FullSemesterBundle,
        Decimal::new(40000, 2),
    )
    .await;

    let bundle = service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await
        .unwrap();

    // Exhaust and expire the first purchase
    let now = time::OffsetDateTime::now_utc();
    let mut bundle_active: entity::bundle_purchases::ActiveModel = bundle.into();
    bundle_active.remaining_sessions = Set(0);
    bundle_active.valid_to = Set(now - time::Duration::days(1));
    bundle_active.update(&db).await.unwrap();

    // The tuple is still taken
    let duplicate = service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await;
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_individual_session_product_is_not_a_bundle() {
    let db = setup_test_db().await;
    let service = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    let product = create_product(
        &db,
        course.id,
        ProductType::IndividualSession,
        Decimal::new(4000, 2),
    )
    .await;

    let result = service
        .purchase_bundle(purchase(student.id, course.id, product.id))
        .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_active_bundles_filter_by_validity_window() {
    let db = setup_test_db().await;
    let service = BundleService::new(db.clone());

    let student = create_student(&db).await;
    let course = create_course(&db).await;
    let product_a = create_product(
        &db,
        course.id,
        ProductType::FullSemesterBundle,
        Decimal::new(40000, 2),
    )
    .await;
    let product_b = create_product(
        &db,
        course.id,
        ProductType::MidtermFinalBundle,
        Decimal::new(20000, 2),
    )
    .await;

    let active = service
        .purchase_bundle(purchase(student.id, course.id, product_a.id))
        .await
        .unwrap();

    let expired = service
        .purchase_bundle(purchase(student.id, course.id, product_b.id))
        .await
        .unwrap();
    let now = time::OffsetDateTime::now_utc();
    let mut expired_active: entity::bundle_purchases::ActiveModel = expired.into();
    expired_active.valid_to = Set(now - time::Duration::days(1));
    expired_active.update(&db).await.unwrap();

    let listed = service
        .get_active_bundles(student.id, course.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, active.id);

    // The unfiltered listing still shows both
    let all = service.get_student_bundles(student.id).await.unwrap();
    assert_eq!(all.len(), 2);
}
