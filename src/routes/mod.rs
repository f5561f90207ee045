pub mod auth;
pub mod exams;
pub mod health;
pub mod public;
pub mod reports;
pub mod responses;
