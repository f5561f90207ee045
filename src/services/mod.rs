pub mod auth_service;
pub mod exam_service;
pub mod google_service;
pub mod grading_service;
pub mod report_service;
pub mod response_service;
