use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create booking_status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Type)
                    .values([
                        BookingStatus::Available,
                        BookingStatus::Booked,
                        BookingStatus::Full,
                        BookingStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create session_type enum
        manager
            .create_type(
                Type::create()
                    .as_enum(SessionType::Type)
                    .values([SessionType::Individual, SessionType::Group])
                    .to_owned(),
            )
            .await?;

        // Create ta_availability table (ad-hoc capacity slots)
        manager
            .create_table(
                Table::create()
                    .table(TaAvailability::Table)
                    .if_not_exists()
                    .col(pk_uuid(TaAvailability::Id))
                    .col(uuid(TaAvailability::TaId))
                    .col(uuid(TaAvailability::CourseId))
                    .col(date(TaAvailability::Date).not_null())
                    .col(string_len(TaAvailability::StartTime, 5).not_null())
                    .col(string_len(TaAvailability::EndTime, 5).not_null())
                    .col(integer(TaAvailability::Capacity).not_null())
                    .col(integer(TaAvailability::BookedCount).default(0).not_null())
                    .col(boolean(TaAvailability::IsActive).default(true).not_null())
                    .col(
                        timestamp_with_time_zone(TaAvailability::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(TaAvailability::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ta_availability_ta")
                            .from(TaAvailability::Table, TaAvailability::TaId)
                            .to(Tas::Table, Tas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ta_availability_course")
                            .from(TaAvailability::Table, TaAvailability::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE ta_availability
                ADD CONSTRAINT chk_ta_availability_seats
                CHECK (booked_count >= 0 AND booked_count <= capacity);
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ta_availability_ta_date")
                    .table(TaAvailability::Table)
                    .col(TaAvailability::TaId)
                    .col(TaAvailability::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ta_availability_course")
                    .table(TaAvailability::Table)
                    .col(TaAvailability::CourseId)
                    .to_owned(),
            )
            .await?;

        // Create group_session_templates table
        manager
            .create_table(
                Table::create()
                    .table(GroupSessionTemplates::Table)
                    .if_not_exists()
                    .col(pk_uuid(GroupSessionTemplates::Id))
                    .col(uuid(GroupSessionTemplates::TaId))
                    .col(uuid(GroupSessionTemplates::CourseId))
                    .col(small_integer(GroupSessionTemplates::DayOfWeek).not_null())
                    .col(string_len(GroupSessionTemplates::StartTime, 5).not_null())
                    .col(string_len(GroupSessionTemplates::EndTime, 5).not_null())
                    .col(integer(GroupSessionTemplates::Capacity).not_null())
                    .col(decimal_len(GroupSessionTemplates::PricePerStudent, 10, 2).not_null())
                    .col(
                        boolean(GroupSessionTemplates::IsActive)
                            .default(true)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(GroupSessionTemplates::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(GroupSessionTemplates::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_session_templates_ta")
                            .from(GroupSessionTemplates::Table, GroupSessionTemplates::TaId)
                            .to(Tas::Table, Tas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_session_templates_course")
                            .from(
                                GroupSessionTemplates::Table,
                                GroupSessionTemplates::CourseId,
                            )
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create bookings table
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Bookings::Id))
                    .col(uuid(Bookings::CourseId))
                    .col(uuid(Bookings::TaId))
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .custom(BookingStatus::Type)
                            .not_null()
                            .default(SimpleExpr::Custom("'BOOKED'::booking_status".to_string())),
                    )
                    .col(
                        ColumnDef::new(Bookings::SessionType)
                            .custom(SessionType::Type)
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(Bookings::Date).not_null())
                    .col(integer(Bookings::DurationMinutes).not_null())
                    .col(decimal_len(Bookings::PricePerStudent, 10, 2).not_null())
                    .col(integer(Bookings::CreditsSpent).default(0).not_null())
                    .col(uuid_null(Bookings::GroupSessionTemplateId))
                    .col(uuid_null(Bookings::BundlePurchaseId))
                    .col(uuid_null(Bookings::SlotId))
                    .col(
                        timestamp_with_time_zone(Bookings::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Bookings::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_course")
                            .from(Bookings::Table, Bookings::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_ta")
                            .from(Bookings::Table, Bookings::TaId)
                            .to(Tas::Table, Tas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_group_session_template")
                            .from(Bookings::Table, Bookings::GroupSessionTemplateId)
                            .to(GroupSessionTemplates::Table, GroupSessionTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_bundle_purchase")
                            .from(Bookings::Table, Bookings::BundlePurchaseId)
                            .to(BundlePurchases::Table, BundlePurchases::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_slot")
                            .from(Bookings::Table, Bookings::SlotId)
                            .to(TaAvailability::Table, TaAvailability::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict checker scans a TA's calendar by date window
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_ta_date")
                    .table(Bookings::Table)
                    .col(Bookings::TaId)
                    .col(Bookings::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_template_date")
                    .table(Bookings::Table)
                    .col(Bookings::GroupSessionTemplateId)
                    .col(Bookings::Date)
                    .to_owned(),
            )
            .await?;

        // Create booking_students join table (composite PK — the seat grant)
        manager
            .create_table(
                Table::create()
                    .table(BookingStudents::Table)
                    .if_not_exists()
                    .col(uuid(BookingStudents::BookingId))
                    .col(uuid(BookingStudents::StudentId))
                    .col(
                        timestamp_with_time_zone(BookingStudents::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BookingStudents::BookingId)
                            .col(BookingStudents::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_students_booking")
                            .from(BookingStudents::Table, BookingStudents::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_students_student")
                            .from(BookingStudents::Table, BookingStudents::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for table in ["ta_availability", "group_session_templates", "bookings"] {
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
            .drop_table(Table::drop().table(BookingStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupSessionTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaAvailability::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(SessionType::Type).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(BookingStatus::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TaAvailability {
    Table,
    Id,
    TaId,
    CourseId,
    Date,
    StartTime,
    EndTime,
    Capacity,
    BookedCount,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupSessionTemplates {
    Table,
    Id,
    TaId,
    CourseId,
    DayOfWeek,
    StartTime,
    EndTime,
    Capacity,
    PricePerStudent,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    CourseId,
    TaId,
    Status,
    SessionType,
    Date,
    DurationMinutes,
    PricePerStudent,
    CreditsSpent,
    GroupSessionTemplateId,
    BundlePurchaseId,
    SlotId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookingStudents {
    Table,
    BookingId,
    StudentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tas {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum BundlePurchases {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Type,
    #[sea_orm(iden = "AVAILABLE")]
    Available,
    #[sea_orm(iden = "BOOKED")]
    Booked,
    #[sea_orm(iden = "FULL")]
    Full,
    #[sea_orm(iden = "CANCELLED")]
    Cancelled,
}

#[derive(DeriveIden)]
enum SessionType {
    #[sea_orm(iden = "session_type")]
    Type,
    #[sea_orm(iden = "INDIVIDUAL")]
    Individual,
    #[sea_orm(iden = "GROUP")]
    Group,
}
