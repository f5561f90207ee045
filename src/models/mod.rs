pub mod answer;
pub mod exam;
pub mod question;
pub mod response;
pub mod user;
