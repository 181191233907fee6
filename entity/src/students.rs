use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student account. Credit counters are cumulative: `total_credits` only
/// grows, `used_credits` moves up on deduction and down on refund, and
/// `used_credits <= total_credits` holds at every committed state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub total_credits: i32,
    pub used_credits: i32,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

impl Model {
    pub fn available_credits(&self) -> i32 {
        self.total_credits - self.used_credits
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_students::Entity")]
    BookingStudents,
    #[sea_orm(has_many = "super::bundle_purchases::Entity")]
    BundlePurchases,
    #[sea_orm(has_many = "super::credit_transactions::Entity")]
    CreditTransactions,
}

impl Related<super::booking_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingStudents.def()
    }
}

impl Related<super::bundle_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BundlePurchases.def()
    }
}

impl Related<super::credit_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
