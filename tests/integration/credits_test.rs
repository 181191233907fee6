use crate::{create_student, setup_test_db};
use entity::sea_orm_active_enums::CreditTransactionKind;
use tutorhub::services::CreditsService;
use tutorhub::ApiError;

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_ledger_use_then_refund_round_trip() {
    let db = setup_test_db().await;
    let service = CreditsService::new(db.clone());
    let student = create_student(&db).await;

    let balance = service
        .add_credits(student.id, 50, "Initial grant")
        .await
        .expect("Failed to add credits");
    assert_eq!(balance.total_credits, 50);
    assert_eq!(balance.used_credits, 0);
    assert_eq!(balance.available_credits, 50);

    let balance = service
        .use_credits(student.id, 20, "Session booking")
        .await
        .expect("Failed to use credits");
    assert_eq!(balance.used_credits, 20);
    assert_eq!(balance.available_credits, 30);

    let balance = service
        .refund_credits(student.id, 20, "Session cancelled")
        .await
        .expect("Failed to refund credits");
    assert_eq!(balance.used_credits, 0);
    assert_eq!(balance.available_credits, 50);

    // One ADD plus the DEDUCT/REFUND pair, which must cancel out
    let history = service.get_history(student.id).await.unwrap();
    assert_eq!(history.len(), 3);
    let net_on_used: i32 = history
        .iter()
        .filter(|entry| entry.kind != CreditTransactionKind::Add)
        .map(|entry| entry.amount)
        .sum();
    assert_eq!(net_on_used, 0);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_overdraw_is_rejected_without_side_effects() {
    let db = setup_test_db().await;
    let service = CreditsService::new(db.clone());
    let student = create_student(&db).await;

    service
        .add_credits(student.id, 10, "Initial grant")
        .await
        .unwrap();

    let result = service.use_credits(student.id, 11, "Too much").await;
    assert!(matches!(
        result,
        Err(ApiError::InsufficientEntitlement(_))
    ));

    // Neither the counters nor the log moved
    let balance = service.get_balance(student.id).await.unwrap();
    assert_eq!(balance.used_credits, 0);
    assert_eq!(balance.available_credits, 10);

    let history = service.get_history(student.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_refund_floors_used_credits_at_zero() {
    let db = setup_test_db().await;
    let service = CreditsService::new(db.clone());
    let student = create_student(&db).await;

    service
        .add_credits(student.id, 30, "Initial grant")
        .await
        .unwrap();
    service
        .use_credits(student.id, 5, "Session booking")
        .await
        .unwrap();

    let balance = service
        .refund_credits(student.id, 12, "Over-refund")
        .await
        .unwrap();
    assert_eq!(balance.used_credits, 0);
    assert_eq!(balance.total_credits, 30);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_non_positive_amounts_are_rejected() {
    let db = setup_test_db().await;
    let service = CreditsService::new(db.clone());
    let student = create_student(&db).await;

    for amount in [0, -5] {
        let result = service.add_credits(student.id, amount, "Bad amount").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_unknown_student_is_not_found() {
    let db = setup_test_db().await;
    let service = CreditsService::new(db.clone());

    let result = service
        .add_credits(uuid::Uuid::new_v4(), 10, "Nobody home")
        .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
