pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    auth_service::AuthService, exam_service::ExamService, google_service::GoogleService,
    report_service::ReportService, response_service::ResponseService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub exam_service: ExamService,
    pub response_service: ResponseService,
    pub report_service: ReportService,
    pub google_service: GoogleService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let auth_service = AuthService::new(pool.clone());
        let exam_service = ExamService::new(pool.clone());
        let response_service = ResponseService::new(pool.clone());
        let report_service = ReportService::new(pool.clone());
        let google_service = GoogleService::new(http_client, config.google_client_id.clone());

        Self {
            pool,
            auth_service,
            exam_service,
            response_service,
            report_service,
            google_service,
        }
    }
}
