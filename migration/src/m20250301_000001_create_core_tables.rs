use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create product_type enum
        manager
            .create_type(
                Type::create()
                    .as_enum(ProductType::Type)
                    .values([
                        ProductType::IndividualSession,
                        ProductType::FullSemesterBundle,
                        ProductType::MidtermFinalBundle,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_uuid(Students::Id))
                    .col(string(Students::Email).unique_key())
                    .col(string(Students::Name))
                    .col(integer(Students::TotalCredits).default(0).not_null())
                    .col(integer(Students::UsedCredits).default(0).not_null())
                    .col(
                        timestamp_with_time_zone(Students::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Students::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Credit counters can never cross
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE students
                ADD CONSTRAINT chk_students_credits
                CHECK (used_credits >= 0 AND used_credits <= total_credits);
                "#,
            )
            .await?;

        // Create tas table
        manager
            .create_table(
                Table::create()
                    .table(Tas::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tas::Id))
                    .col(string(Tas::Email).unique_key())
                    .col(string(Tas::Name))
                    .col(string_null(Tas::Degree))
                    .col(double_null(Tas::Gpa))
                    .col(text_null(Tas::Bio))
                    .col(
                        timestamp_with_time_zone(Tas::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Tas::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_uuid(Courses::Id))
                    .col(string(Courses::Code).unique_key())
                    .col(string(Courses::Name))
                    .col(text_null(Courses::Description))
                    .col(
                        timestamp_with_time_zone(Courses::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Courses::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create course_tas join table (composite PK)
        manager
            .create_table(
                Table::create()
                    .table(CourseTas::Table)
                    .if_not_exists()
                    .col(uuid(CourseTas::CourseId))
                    .col(uuid(CourseTas::TaId))
                    .col(
                        timestamp_with_time_zone(CourseTas::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CourseTas::CourseId)
                            .col(CourseTas::TaId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_tas_course")
                            .from(CourseTas::Table, CourseTas::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_tas_ta")
                            .from(CourseTas::Table, CourseTas::TaId)
                            .to(Tas::Table, Tas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(uuid(Products::CourseId))
                    .col(string(Products::Name))
                    .col(
                        ColumnDef::new(Products::ProductType)
                            .custom(ProductType::Type)
                            .not_null(),
                    )
                    .col(text_null(Products::Description))
                    .col(decimal_len(Products::BasePrice, 10, 2).not_null())
                    .col(boolean(Products::IsActive).default(true).not_null())
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_course")
                            .from(Products::Table, Products::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_course_type")
                    .table(Products::Table)
                    .col(Products::CourseId)
                    .col(Products::ProductType)
                    .to_owned(),
            )
            .await?;

        // Create trigger function for updated_at
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;
                "#,
            )
            .await?;

        for table in ["students", "tas", "courses", "products"] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    r#"
                    CREATE TRIGGER update_{table}_updated_at
                    BEFORE UPDATE ON {table}
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                    "#,
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseTas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ProductType::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    Email,
    Name,
    TotalCredits,
    UsedCredits,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tas {
    Table,
    Id,
    Email,
    Name,
    Degree,
    Gpa,
    Bio,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Code,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CourseTas {
    Table,
    CourseId,
    TaId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    CourseId,
    Name,
    ProductType,
    Description,
    BasePrice,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductType {
    #[sea_orm(iden = "product_type")]
    Type,
    #[sea_orm(iden = "INDIVIDUAL_SESSION")]
    IndividualSession,
    #[sea_orm(iden = "FULL_SEMESTER_BUNDLE")]
    FullSemesterBundle,
    #[sea_orm(iden = "MIDTERM_FINAL_BUNDLE")]
    MidtermFinalBundle,
}
