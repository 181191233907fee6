use crate::error::{ApiError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use time::macros::format_description;
use tracing::{info, instrument};
use uuid::Uuid;

/// Ad-hoc availability slots: TA-declared open windows with a seat capacity.
/// Seat accounting (`booked_count`) is only ever touched under a row lock via
/// the `*_in_txn` methods so the booking engine can fold it into its own
/// transaction.
pub struct AvailabilityService {
    db: DatabaseConnection,
}

/// Outcome of removing a slot: slots with seats already booked against them
/// are disabled instead of deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRemoval {
    Deleted,
    Disabled,
}

#[derive(Debug, Clone, Default)]
pub struct SlotChanges {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

impl AvailabilityService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Publish a new slot. Linking side effect: a TA publishing availability
    /// for a course they are not yet assigned to becomes assigned to it.
    #[instrument(skip(self))]
    pub async fn create_availability(
        &self,
        ta_id: Uuid,
        course_id: Uuid,
        date: &str,
        start_time: &str,
        end_time: &str,
        capacity: i32,
    ) -> Result<entity::ta_availability::Model> {
        entity::tas::Entity::find_by_id(ta_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("TA {} not found", ta_id)))?;

        entity::courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

        let start = parse_hhmm(start_time).ok_or_else(invalid_time_format)?;
        let end = parse_hhmm(end_time).ok_or_else(invalid_time_format)?;
        if start >= end {
            return Err(ApiError::BadRequest(
                "startTime must be before endTime".to_string(),
            ));
        }

        if capacity < 1 {
            return Err(ApiError::BadRequest(
                "Capacity must be at least 1".to_string(),
            ));
        }

        let slot_date = parse_date(date)?;
        let today = time::OffsetDateTime::now_utc().date();
        if slot_date < today {
            return Err(ApiError::BadRequest(
                "Cannot create availability for past dates".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        self.ensure_course_assignment(ta_id, course_id, &txn).await?;

        let now = time::OffsetDateTime::now_utc();
        let slot = entity::ta_availability::ActiveModel {
            id: Set(Uuid::new_v4()),
            ta_id: Set(ta_id),
            course_id: Set(course_id),
            date: Set(slot_date),
            start_time: Set(start_time.to_string()),
            end_time: Set(end_time.to_string()),
            capacity: Set(capacity),
            booked_count: Set(0),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let slot = slot.insert(&txn).await?;
        txn.commit().await?;

        info!(
            "Created availability slot {} for TA {} on {} {}-{}",
            slot.id, ta_id, slot.date, slot.start_time, slot.end_time
        );

        Ok(slot)
    }

    /// First-availability-implies-assignment: link the TA to the course if no
    /// link exists yet. Named step so tests can call and assert on it directly.
    pub async fn ensure_course_assignment(
        &self,
        ta_id: Uuid,
        course_id: Uuid,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let link = entity::course_tas::ActiveModel {
            course_id: Set(course_id),
            ta_id: Set(ta_id),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        entity::course_tas::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    entity::course_tas::Column::CourseId,
                    entity::course_tas::Column::TaId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(txn)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_availability_by_ta(
        &self,
        ta_id: Uuid,
    ) -> Result<Vec<entity::ta_availability::Model>> {
        entity::tas::Entity::find_by_id(ta_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("TA {} not found", ta_id)))?;

        let slots = entity::ta_availability::Entity::find()
            .filter(entity::ta_availability::Column::TaId.eq(ta_id))
            .filter(entity::ta_availability::Column::IsActive.eq(true))
            .order_by_asc(entity::ta_availability::Column::Date)
            .order_by_asc(entity::ta_availability::Column::StartTime)
            .all(&self.db)
            .await?;

        Ok(slots)
    }

    #[instrument(skip(self))]
    pub async fn get_availability_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<entity::ta_availability::Model>> {
        entity::courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

        let slots = entity::ta_availability::Entity::find()
            .filter(entity::ta_availability::Column::CourseId.eq(course_id))
            .filter(entity::ta_availability::Column::IsActive.eq(true))
            .order_by_asc(entity::ta_availability::Column::Date)
            .order_by_asc(entity::ta_availability::Column::StartTime)
            .all(&self.db)
            .await?;

        Ok(slots)
    }

    #[instrument(skip(self))]
    pub async fn update_availability(
        &self,
        ta_id: Uuid,
        slot_id: Uuid,
        changes: SlotChanges,
    ) -> Result<entity::ta_availability::Model> {
        let slot = self.find_owned_slot(ta_id, slot_id).await?;

        if let Some(ref start_time) = changes.start_time {
            parse_hhmm(start_time).ok_or_else(invalid_time_format)?;
        }
        if let Some(ref end_time) = changes.end_time {
            parse_hhmm(end_time).ok_or_else(invalid_time_format)?;
        }
        if let Some(capacity) = changes.capacity {
            if capacity < slot.booked_count {
                return Err(ApiError::BadRequest(format!(
                    "Capacity cannot drop below the {} seats already booked",
                    slot.booked_count
                )));
            }
        }

        let mut slot_active: entity::ta_availability::ActiveModel = slot.into();
        if let Some(start_time) = changes.start_time {
            slot_active.start_time = Set(start_time);
        }
        if let Some(end_time) = changes.end_time {
            slot_active.end_time = Set(end_time);
        }
        if let Some(capacity) = changes.capacity {
            slot_active.capacity = Set(capacity);
        }
        if let Some(is_active) = changes.is_active {
            slot_active.is_active = Set(is_active);
        }
        slot_active.updated_at = Set(time::OffsetDateTime::now_utc());

        Ok(slot_active.update(&self.db).await?)
    }

    /// Remove a slot. Hard deletion is only safe while no seats are booked;
    /// otherwise the slot is soft-disabled and kept for the bookings that
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_availability(&self, ta_id: Uuid, slot_id: Uuid) -> Result<SlotRemoval> {
        let slot = self.find_owned_slot(ta_id, slot_id).await?;

        if slot.booked_count > 0 {
            let mut slot_active: entity::ta_availability::ActiveModel = slot.into();
            slot_active.is_active = Set(false);
            slot_active.updated_at = Set(time::OffsetDateTime::now_utc());
            slot_active.update(&self.db).await?;

            info!("Disabled availability slot {} (seats still booked)", slot_id);
            return Ok(SlotRemoval::Disabled);
        }

        slot.delete(&self.db).await?;
        info!("Deleted availability slot {}", slot_id);

        Ok(SlotRemoval::Deleted)
    }

    /// Take one seat on a slot. Caller owns the surrounding transaction; the
    /// row lock serializes concurrent reservations so the capacity check and
    /// the increment act as one unit.
    pub async fn reserve_seat_in_txn(
        &self,
        slot_id: Uuid,
        txn: &DatabaseTransaction,
    ) -> Result<entity::ta_availability::Model> {
        let slot = entity::ta_availability::Entity::find_by_id(slot_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Availability slot {} not found", slot_id)))?;

        if !slot.is_active {
            return Err(ApiError::BadRequest(
                "Availability slot is no longer active".to_string(),
            ));
        }

        if slot.available_seats() <= 0 {
            return Err(ApiError::CapacityExceeded(format!(
                "No seats left on availability slot {}",
                slot_id
            )));
        }

        let mut slot_active: entity::ta_availability::ActiveModel = slot.into();
        let booked = *slot_active.booked_count.as_ref();
        slot_active.booked_count = Set(booked + 1);
        slot_active.updated_at = Set(time::OffsetDateTime::now_utc());

        Ok(slot_active.update(txn).await?)
    }

    /// Give a seat back, floored at 0.
    pub async fn release_seat_in_txn(
        &self,
        slot_id: Uuid,
        txn: &DatabaseTransaction,
    ) -> Result<entity::ta_availability::Model> {
        let slot = entity::ta_availability::Entity::find_by_id(slot_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Availability slot {} not found", slot_id)))?;

        let mut slot_active: entity::ta_availability::ActiveModel = slot.into();
        let booked = *slot_active.booked_count.as_ref();
        slot_active.booked_count = Set((booked - 1).max(0));
        slot_active.updated_at = Set(time::OffsetDateTime::now_utc());

        Ok(slot_active.update(txn).await?)
    }

    async fn find_owned_slot(
        &self,
        ta_id: Uuid,
        slot_id: Uuid,
    ) -> Result<entity::ta_availability::Model> {
        let slot = entity::ta_availability::Entity::find_by_id(slot_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Availability slot {} not found", slot_id)))?;

        if slot.ta_id != ta_id {
            return Err(ApiError::BadRequest(
                "Availability slot belongs to another TA".to_string(),
            ));
        }

        Ok(slot)
    }
}

fn invalid_time_format() -> ApiError {
    ApiError::BadRequest("Invalid time format. Use HH:mm".to_string())
}

/// Strict 24-hour `HH:mm` parse.
pub(crate) fn parse_hhmm(value: &str) -> Option<time::Time> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u8 = hours.parse().ok()?;
    let minute: u8 = minutes.parse().ok()?;
    time::Time::from_hms(hour, minute, 0).ok()
}

fn parse_date(value: &str) -> Result<time::Date> {
    let format = format_description!("[year]-[month]-[day]");
    time::Date::parse(value, &format)
        .map_err(|_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_hhmm("00:00"), time::Time::from_hms(0, 0, 0).ok());
        assert_eq!(parse_hhmm("09:30"), time::Time::from_hms(9, 30, 0).ok());
        assert_eq!(parse_hhmm("23:59"), time::Time::from_hms(23, 59, 0).ok());
    }

    #[test]
    fn rejects_malformed_times() {
        for input in ["24:00", "12:60", "9:30", "09:3", "0930", "ab:cd", "", "12:30:00"] {
            assert!(parse_hhmm(input).is_none(), "accepted {:?}", input);
        }
    }

    #[test]
    fn parses_calendar_dates() {
        assert!(parse_date("2025-09-01").is_ok());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2025/09/01").is_err());
    }
}
