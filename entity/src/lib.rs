pub mod prelude;

pub mod booking_students;
pub mod bookings;
pub mod bundle_purchases;
pub mod course_tas;
pub mod courses;
pub mod credit_transactions;
pub mod group_session_templates;
pub mod products;
pub mod sea_orm_active_enums;
pub mod students;
pub mod ta_availability;
pub mod tas;
