use crate::error::{ApiError, Result};
use entity::sea_orm_active_enums::CreditTransactionKind;
use sea_orm::{entity::*, query::*, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

/// The ledger. Sole owner of the student credit counters: every mutation
/// locks the student row, re-verifies the invariant under the lock, writes
/// the new counters and appends exactly one transaction-log row, all inside
/// one database transaction.
pub struct CreditsService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct CreditBalance {
    pub student_id: Uuid,
    pub total_credits: i32,
    pub used_credits: i32,
    pub available_credits: i32,
}

impl From<&entity::students::Model> for CreditBalance {
    fn from(student: &entity::students::Model) -> Self {
        Self {
            student_id: student.id,
            total_credits: student.total_credits,
            used_credits: student.used_credits,
            available_credits: student.available_credits(),
        }
    }
}

impl CreditsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Current balance without taking any lock.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, student_id: Uuid) -> Result<CreditBalance> {
        let student = entity::students::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

        Ok(CreditBalance::from(&student))
    }

    /// Grant credits to a student's wallet.
    #[instrument(skip(self))]
    pub async fn add_credits(
        &self,
        student_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<CreditBalance> {
        validate_amount(amount)?;

        let txn = self.db.begin().await?;

        let student = find_and_lock_student(student_id, &txn).await?;

        let mut student_active: entity::students::ActiveModel = student.into();
        let total = *student_active.total_credits.as_ref();
        student_active.total_credits = Set(total + amount);
        let updated = student_active.update(&txn).await?;

        append_transaction(student_id, amount, CreditTransactionKind::Add, reason, &txn).await?;

        txn.commit().await?;

        info!(
            "Added {} credits for student {} (available: {})",
            amount,
            student_id,
            updated.available_credits()
        );

        Ok(CreditBalance::from(&updated))
    }

    /// Consume credits from the wallet. Fails without side effects when the
    /// available balance is smaller than `amount`.
    #[instrument(skip(self))]
    pub async fn use_credits(
        &self,
        student_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<CreditBalance> {
        let txn = self.db.begin().await?;
        let updated = self
            .use_credits_in_txn(student_id, amount, reason, &txn)
            .await?;
        txn.commit().await?;

        Ok(CreditBalance::from(&updated))
    }

    /// Return previously consumed credits. `used_credits` is floored at 0.
    #[instrument(skip(self))]
    pub async fn refund_credits(
        &self,
        student_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<CreditBalance> {
        let txn = self.db.begin().await?;
        let updated = self
            .refund_credits_in_txn(student_id, amount, reason, &txn)
            .await?;
        txn.commit().await?;

        Ok(CreditBalance::from(&updated))
    }

    /// Deduction body for composition into a larger transaction. The booking
    /// engine wraps this together with the booking insert so a failed booking
    /// never leaves a dangling deduction.
    pub async fn use_credits_in_txn(
        &self,
        student_id: Uuid,
        amount: i32,
        reason: &str,
        txn: &DatabaseTransaction,
    ) -> Result<entity::students::Model> {
        validate_amount(amount)?;

        let student = find_and_lock_student(student_id, txn).await?;

        if student.available_credits() < amount {
            return Err(ApiError::InsufficientEntitlement(format!(
                "Insufficient credits: need {}, have {}",
                amount,
                student.available_credits()
            )));
        }

        let mut student_active: entity::students::ActiveModel = student.into();
        let used = *student_active.used_credits.as_ref();
        student_active.used_credits = Set(used + amount);
        let updated = student_active.update(txn).await?;

        append_transaction(
            student_id,
            -amount,
            CreditTransactionKind::Deduct,
            reason,
            txn,
        )
        .await?;

        info!(
            "Deducted {} credits from student {} (available: {})",
            amount,
            student_id,
            updated.available_credits()
        );

        Ok(updated)
    }

    /// Refund body for composition into a larger transaction.
    pub async fn refund_credits_in_txn(
        &self,
        student_id: Uuid,
        amount: i32,
        reason: &str,
        txn: &DatabaseTransaction,
    ) -> Result<entity::students::Model> {
        validate_amount(amount)?;

        let student = find_and_lock_student(student_id, txn).await?;

        let mut student_active: entity::students::ActiveModel = student.into();
        let used = *student_active.used_credits.as_ref();
        student_active.used_credits = Set((used - amount).max(0));
        let updated = student_active.update(txn).await?;

        append_transaction(
            student_id,
            amount,
            CreditTransactionKind::Refund,
            reason,
            txn,
        )
        .await?;

        info!(
            "Refunded {} credits to student {} (available: {})",
            amount,
            student_id,
            updated.available_credits()
        );

        Ok(updated)
    }

    /// Full transaction log for a student, newest first.
    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<entity::credit_transactions::Model>> {
        entity::students::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

        let history = entity::credit_transactions::Entity::find()
            .filter(entity::credit_transactions::Column::StudentId.eq(student_id))
            .order_by_desc(entity::credit_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(history)
    }
}

async fn find_and_lock_student(
    student_id: Uuid,
    txn: &DatabaseTransaction,
) -> Result<entity::students::Model> {
    entity::students::Entity::find_by_id(student_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))
}

async fn append_transaction(
    student_id: Uuid,
    amount: i32,
    kind: CreditTransactionKind,
    reason: &str,
    txn: &DatabaseTransaction,
) -> Result<()> {
    let entry = entity::credit_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        student_id: Set(student_id),
        amount: Set(amount),
        kind: Set(kind),
        reason: Set(reason.to_string()),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };

    entity::credit_transactions::Entity::insert(entry)
        .exec(txn)
        .await?;

    Ok(())
}

fn validate_amount(amount: i32) -> Result<()> {
    if amount <= 0 {
        return Err(ApiError::BadRequest(
            "Credit amount must be positive".to_string(),
        ));
    }
    Ok(())
}
