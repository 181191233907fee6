use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::SuccessResponse;
use crate::services::credits_service::CreditBalance;

/// Request to add, use or refund credits
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreditAmountRequest {
    #[validate(range(min = 1))]
    pub amount: i32,

    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalanceData {
    pub student_id: uuid::Uuid,
    pub total_credits: i32,
    pub used_credits: i32,
    pub available_credits: i32,
}

impl From<CreditBalance> for CreditBalanceData {
    fn from(balance: CreditBalance) -> Self {
        Self {
            student_id: balance.student_id,
            total_credits: balance.total_credits,
            used_credits: balance.used_credits,
            available_credits: balance.available_credits,
        }
    }
}

pub type CreditBalanceResponse = SuccessResponse<CreditBalanceData>;
pub type CreditHistoryResponse = SuccessResponse<Vec<entity::credit_transactions::Model>>;
