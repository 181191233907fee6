use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking. CANCELLED is terminal.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "BOOKED")]
    Booked,
    #[sea_orm(string_value = "FULL")]
    Full,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    #[sea_orm(string_value = "INDIVIDUAL")]
    Individual,
    #[sea_orm(string_value = "GROUP")]
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[sea_orm(string_value = "INDIVIDUAL_SESSION")]
    IndividualSession,
    #[sea_orm(string_value = "FULL_SEMESTER_BUNDLE")]
    FullSemesterBundle,
    #[sea_orm(string_value = "MIDTERM_FINAL_BUNDLE")]
    MidtermFinalBundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "coverage_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageType {
    #[sea_orm(string_value = "FULL_SEMESTER")]
    FullSemester,
    #[sea_orm(string_value = "MIDTERM_FINAL")]
    MidtermFinal,
}

/// Kind of ledger entry. ADD and REFUND carry positive amounts,
/// DEDUCT carries negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_transaction_kind")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionKind {
    #[sea_orm(string_value = "ADD")]
    Add,
    #[sea_orm(string_value = "DEDUCT")]
    Deduct,
    #[sea_orm(string_value = "REFUND")]
    Refund,
}
