use crate::config::BookingConfig;
use crate::error::{ApiError, Result};
use crate::services::availability_service::parse_hhmm;
use crate::services::AvailabilityService;
use anyhow::anyhow;
use entity::sea_orm_active_enums::{BookingStatus, SessionType};
use rust_decimal::Decimal;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Recurring group sessions: weekly templates and the concrete GROUP bookings
/// materialized from them. Joining an occurrence is capacity-guarded under a
/// row lock on the booking.
pub struct GroupSessionService {
    db: DatabaseConnection,
    availability: Arc<AvailabilityService>,
    materialize_weeks_ahead: u8,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub course_id: Uuid,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    pub price_per_student: Decimal,
}

#[derive(Debug, Clone)]
pub struct JoinResult {
    pub booking: entity::bookings::Model,
    pub student_count: i64,
}

#[derive(Debug, Clone)]
pub struct GroupSessionOccurrence {
    pub booking: entity::bookings::Model,
    pub student_count: i64,
    /// Fullness derived from the live count, not the persisted latch.
    pub effective_status: BookingStatus,
    pub capacity: i32,
}

#[derive(Debug, Clone)]
pub struct CourseGroupSessions {
    pub template: entity::group_session_templates::Model,
    pub occurrences: Vec<GroupSessionOccurrence>,
}

impl GroupSessionService {
    pub fn new(
        db: DatabaseConnection,
        availability: Arc<AvailabilityService>,
        config: &BookingConfig,
    ) -> Self {
        Self {
            db,
            availability,
            materialize_weeks_ahead: config.materialize_weeks_ahead,
        }
    }

    /// Declare a weekly template. Same linking side effect as publishing
    /// availability: the TA is assigned to the course if not already.
    #[instrument(skip(self))]
    pub async fn create_template(
        &self,
        ta_id: Uuid,
        template: NewTemplate,
    ) -> Result<entity::group_session_templates::Model> {
        entity::tas::Entity::find_by_id(ta_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("TA {} not found", ta_id)))?;

        entity::courses::Entity::find_by_id(template.course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Course {} not found", template.course_id))
            })?;

        if !(0..=6).contains(&template.day_of_week) {
            return Err(ApiError::BadRequest(
                "dayOfWeek must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }

        let start = parse_hhmm(&template.start_time)
            .ok_or_else(|| ApiError::BadRequest("Invalid time format. Use HH:mm".to_string()))?;
        let end = parse_hhmm(&template.end_time)
            .ok_or_else(|| ApiError::BadRequest("Invalid time format. Use HH:mm".to_string()))?;
        if start >= end {
            return Err(ApiError::BadRequest(
                "startTime must be before endTime".to_string(),
            ));
        }

        if template.capacity < 1 {
            return Err(ApiError::BadRequest(
                "Capacity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        self.availability
            .ensure_course_assignment(ta_id, template.course_id, &txn)
            .await?;

        let now = time::OffsetDateTime::now_utc();
        let row = entity::group_session_templates::ActiveModel {
            id: Set(Uuid::new_v4()),
            ta_id: Set(ta_id),
            course_id: Set(template.course_id),
            day_of_week: Set(template.day_of_week),
            start_time: Set(template.start_time),
            end_time: Set(template.end_time),
            capacity: Set(template.capacity),
            price_per_student: Set(template.price_per_student),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = row.insert(&txn).await?;

        txn.commit().await?;

        info!("Created group session template {} for TA {}", created.id, ta_id);

        Ok(created)
    }

    /// Materialize the template's next weekly occurrences as GROUP bookings.
    /// Dates that already have a booking for this template are skipped, so
    /// repeated runs are harmless.
    #[instrument(skip(self))]
    pub async fn materialize_occurrences(
        &self,
        template_id: Uuid,
        weeks_ahead: Option<u8>,
    ) -> Result<Vec<entity::bookings::Model>> {
        let template = entity::group_session_templates::Entity::find_by_id(template_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Group session template {} not found", template_id))
            })?;

        if !template.is_active {
            return Err(ApiError::BadRequest(
                "Group session template is no longer active".to_string(),
            ));
        }

        let start = parse_hhmm(&template.start_time).ok_or_else(|| {
            ApiError::Internal(anyhow!("Template {} has corrupt start time", template.id))
        })?;
        let end = parse_hhmm(&template.end_time).ok_or_else(|| {
            ApiError::Internal(anyhow!("Template {} has corrupt end time", template.id))
        })?;
        let duration_minutes = (end - start).whole_minutes() as i32;

        let weeks = weeks_ahead.unwrap_or(self.materialize_weeks_ahead);
        let today = time::OffsetDateTime::now_utc().date();
        let dates = upcoming_occurrence_dates(today, template.day_of_week, weeks);

        let txn = self.db.begin().await?;

        let existing = entity::bookings::Entity::find()
            .filter(entity::bookings::Column::GroupSessionTemplateId.eq(template.id))
            .all(&txn)
            .await?;

        let mut created = Vec::new();
        for date in dates {
            let occurs_at = time::PrimitiveDateTime::new(date, start).assume_utc();
            if existing.iter().any(|b| b.date == occurs_at) {
                continue;
            }

            let now = time::OffsetDateTime::now_utc();
            let booking = entity::bookings::ActiveModel {
                id: Set(Uuid::new_v4()),
                course_id: Set(template.course_id),
                ta_id: Set(template.ta_id),
                status: Set(BookingStatus::Available),
                session_type: Set(SessionType::Group),
                date: Set(occurs_at),
                duration_minutes: Set(duration_minutes),
                price_per_student: Set(template.price_per_student),
                credits_spent: Set(0),
                group_session_template_id: Set(Some(template.id)),
                bundle_purchase_id: Set(None),
                slot_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            created.push(booking.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(
            "Materialized {} occurrence(s) for template {}",
            created.len(),
            template_id
        );

        Ok(created)
    }

    /// Join a materialized group occurrence. The booking-row lock serializes
    /// concurrent joiners, so the membership and capacity checks hold at
    /// insert time, not just at read time.
    #[instrument(skip(self))]
    pub async fn join_group_session(&self, booking_id: Uuid, student_id: Uuid) -> Result<JoinResult> {
        let txn = self.db.begin().await?;

        entity::students::Entity::find_by_id(student_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

        let booking = entity::bookings::Entity::find_by_id(booking_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.session_type != SessionType::Group {
            return Err(ApiError::BadRequest(
                "This booking is not a group session".to_string(),
            ));
        }

        if booking.status == BookingStatus::Cancelled {
            return Err(ApiError::Conflict(
                "This session has been cancelled".to_string(),
            ));
        }

        let template_id = booking.group_session_template_id.ok_or_else(|| {
            ApiError::BadRequest("Group session template not found".to_string())
        })?;
        let template = entity::group_session_templates::Entity::find_by_id(template_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Group session template {} not found", template_id))
            })?;

        let already_joined = entity::booking_students::Entity::find_by_id((booking_id, student_id))
            .one(&txn)
            .await?
            .is_some();
        if already_joined {
            return Err(ApiError::Conflict(
                "Student already joined this session".to_string(),
            ));
        }

        let current_count = entity::booking_students::Entity::find()
            .filter(entity::booking_students::Column::BookingId.eq(booking_id))
            .count(&txn)
            .await? as i64;

        if current_count >= template.capacity as i64 {
            return Err(ApiError::CapacityExceeded(
                "Group session is at full capacity".to_string(),
            ));
        }

        let membership = entity::booking_students::ActiveModel {
            booking_id: Set(booking_id),
            student_id: Set(student_id),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };
        entity::booking_students::Entity::insert(membership)
            .exec(&txn)
            .await?;

        let new_count = current_count + 1;
        let booking = if new_count >= template.capacity as i64 {
            let mut booking_active: entity::bookings::ActiveModel = booking.into();
            booking_active.status = Set(BookingStatus::Full);
            booking_active.updated_at = Set(time::OffsetDateTime::now_utc());
            booking_active.update(&txn).await?
        } else {
            booking
        };

        txn.commit().await?;

        info!(
            "Student {} joined group session {} ({}/{})",
            student_id, booking_id, new_count, template.capacity
        );

        Ok(JoinResult {
            booking,
            student_count: new_count,
        })
    }

    /// Templates for a course with their materialized occurrences and live
    /// counts.
    #[instrument(skip(self))]
    pub async fn get_group_sessions_by_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<CourseGroupSessions>> {
        entity::courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

        let templates = entity::group_session_templates::Entity::find()
            .filter(entity::group_session_templates::Column::CourseId.eq(course_id))
            .filter(entity::group_session_templates::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;

        let mut sessions = Vec::with_capacity(templates.len());
        for template in templates {
            let bookings = entity::bookings::Entity::find()
                .filter(entity::bookings::Column::GroupSessionTemplateId.eq(template.id))
                .filter(entity::bookings::Column::SessionType.eq(SessionType::Group))
                .order_by_asc(entity::bookings::Column::Date)
                .all(&self.db)
                .await?;

            let mut occurrences = Vec::with_capacity(bookings.len());
            for booking in bookings {
                let student_count = entity::booking_students::Entity::find()
                    .filter(entity::booking_students::Column::BookingId.eq(booking.id))
                    .count(&self.db)
                    .await? as i64;

                let effective_status =
                    derive_status(booking.status.clone(), student_count, template.capacity);

                occurrences.push(GroupSessionOccurrence {
                    booking,
                    student_count,
                    effective_status,
                    capacity: template.capacity,
                });
            }

            sessions.push(CourseGroupSessions {
                template,
                occurrences,
            });
        }

        Ok(sessions)
    }
}

/// Effective occurrence status from the live seat count. The persisted FULL
/// flag is a one-way latch; a stale latch (count dropped back under capacity)
/// reads as AVAILABLE again.
fn derive_status(persisted: BookingStatus, student_count: i64, capacity: i32) -> BookingStatus {
    match persisted {
        BookingStatus::Cancelled => BookingStatus::Cancelled,
        _ if student_count >= capacity as i64 => BookingStatus::Full,
        BookingStatus::Full => BookingStatus::Available,
        other => other,
    }
}

/// Next `weeks` dates falling on `day_of_week` (0 = Sunday), starting today.
fn upcoming_occurrence_dates(today: time::Date, day_of_week: i16, weeks: u8) -> Vec<time::Date> {
    let today_dow = today.weekday().number_days_from_sunday() as i16;
    let offset = (day_of_week - today_dow).rem_euclid(7) as i64;
    let first = today + time::Duration::days(offset);

    (0..weeks as i64)
        .map(|week| first + time::Duration::weeks(week))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn occurrence_dates_start_on_the_requested_weekday() {
        // 2025-09-01 is a Monday
        let dates = upcoming_occurrence_dates(date!(2025 - 09 - 01), 3, 4);
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], date!(2025 - 09 - 03)); // first Wednesday
        assert_eq!(dates[1], date!(2025 - 09 - 10));
        assert!(dates
            .iter()
            .all(|d| d.weekday().number_days_from_sunday() == 3));
    }

    #[test]
    fn occurrence_dates_include_today_when_weekday_matches() {
        let dates = upcoming_occurrence_dates(date!(2025 - 09 - 01), 1, 2);
        assert_eq!(dates[0], date!(2025 - 09 - 01));
        assert_eq!(dates[1], date!(2025 - 09 - 08));
    }

    #[test]
    fn derived_status_latches_full_at_capacity() {
        assert_eq!(
            derive_status(BookingStatus::Available, 5, 5),
            BookingStatus::Full
        );
        assert_eq!(
            derive_status(BookingStatus::Available, 4, 5),
            BookingStatus::Available
        );
    }

    #[test]
    fn derived_status_ignores_stale_full_latch() {
        assert_eq!(
            derive_status(BookingStatus::Full, 4, 5),
            BookingStatus::Available
        );
    }

    #[test]
    fn derived_status_keeps_cancelled_terminal() {
        assert_eq!(
            derive_status(BookingStatus::Cancelled, 5, 5),
            BookingStatus::Cancelled
        );
    }
}
