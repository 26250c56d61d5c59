pub mod activity;
pub mod register;
pub mod reviews;
pub mod schools;
pub mod students;
