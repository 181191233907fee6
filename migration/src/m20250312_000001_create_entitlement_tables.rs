use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create coverage_type enum
        manager
            .create_type(
                Type::create()
                    .as_enum(CoverageType::Type)
                    .values([CoverageType::FullSemester, CoverageType::MidtermFinal])
                    .to_owned(),
            )
            .await?;

        // Create credit_transaction_kind enum
        manager
            .create_type(
                Type::create()
                    .as_enum(CreditTransactionKind::Type)
                    .values([
                        CreditTransactionKind::Add,
                        CreditTransactionKind::Deduct,
                        CreditTransactionKind::Refund,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create bundle_purchases table
        manager
            .create_table(
                Table::create()
                    .table(BundlePurchases::Table)
                    .if_not_exists()
                    .col(pk_uuid(BundlePurchases::Id))
                    .col(uuid(BundlePurchases::StudentId))
                    .col(uuid(BundlePurchases::CourseId))
                    .col(uuid(BundlePurchases::ProductId))
                    .col(
                        ColumnDef::new(BundlePurchases::CoverageType)
                            .custom(CoverageType::Type)
                            .not_null(),
                    )
                    .col(integer(BundlePurchases::TotalSessions).not_null())
                    .col(integer(BundlePurchases::RemainingSessions).not_null())
                    .col(timestamp_with_time_zone(BundlePurchases::ValidFrom).not_null())
                    .col(timestamp_with_time_zone(BundlePurchases::ValidTo).not_null())
                    .col(
                        timestamp_with_time_zone(BundlePurchases::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(BundlePurchases::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bundle_purchases_student")
                            .from(BundlePurchases::Table, BundlePurchases::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bundle_purchases_course")
                            .from(BundlePurchases::Table, BundlePurchases::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bundle_purchases_product")
                            .from(BundlePurchases::Table, BundlePurchases::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One purchase per (student, course, product) — the duplicate-purchase
        // guard the service relies on with ON CONFLICT DO NOTHING
        manager
            .create_index(
                Index::create()
                    .name("idx_bundle_purchases_student_course_product")
                    .table(BundlePurchases::Table)
                    .col(BundlePurchases::StudentId)
                    .col(BundlePurchases::CourseId)
                    .col(BundlePurchases::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE bundle_purchases
                ADD CONSTRAINT chk_bundle_purchases_sessions
                CHECK (remaining_sessions >= 0 AND remaining_sessions <= total_sessions);
                "#,
            )
            .await?;

        // Create credit_transactions table (append-only ledger)
        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(pk_uuid(CreditTransactions::Id))
                    .col(uuid(CreditTransactions::StudentId))
                    .col(integer(CreditTransactions::Amount).not_null())
                    .col(
                        ColumnDef::new(CreditTransactions::Kind)
                            .custom(CreditTransactionKind::Type)
                            .not_null(),
                    )
                    .col(string(CreditTransactions::Reason))
                    .col(
                        timestamp_with_time_zone(CreditTransactions::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_transactions_student")
                            .from(CreditTransactions::Table, CreditTransactions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credit_transactions_student")
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::StudentId)
                    .col(CreditTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_bundle_purchases_updated_at
                BEFORE UPDATE ON bundle_purchases
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BundlePurchases::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(CreditTransactionKind::Type).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(CoverageType::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum BundlePurchases {
    Table,
    Id,
    StudentId,
    CourseId,
    ProductId,
    CoverageType,
    TotalSessions,
    RemainingSessions,
    ValidFrom,
    ValidTo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CreditTransactions {
    Table,
    Id,
    StudentId,
    Amount,
    Kind,
    Reason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CoverageType {
    #[sea_orm(iden = "coverage_type")]
    Type,
    #[sea_orm(iden = "FULL_SEMESTER")]
    FullSemester,
    #[sea_orm(iden = "MIDTERM_FINAL")]
    MidtermFinal,
}

#[derive(DeriveIden)]
enum CreditTransactionKind {
    #[sea_orm(iden = "credit_transaction_kind")]
    Type,
    #[sea_orm(iden = "ADD")]
    Add,
    #[sea_orm(iden = "DEDUCT")]
    Deduct,
    #[sea_orm(iden = "REFUND")]
    Refund,
}
