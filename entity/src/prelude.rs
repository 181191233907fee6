pub use super::booking_students::Entity as BookingStudents;
pub use super::bookings::Entity as Bookings;
pub use super::bundle_purchases::Entity as BundlePurchases;
pub use super::course_tas::Entity as CourseTas;
pub use super::courses::Entity as Courses;
pub use super::credit_transactions::Entity as CreditTransactions;
pub use super::group_session_templates::Entity as GroupSessionTemplates;
pub use super::products::Entity as Products;
pub use super::students::Entity as Students;
pub use super::ta_availability::Entity as TaAvailability;
pub use super::tas::Entity as Tas;
