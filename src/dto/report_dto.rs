use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatsSummary {
    pub exam_id: Uuid,
    pub title: String,
    pub response_count: i64,
    pub average_percentage: f64,
    pub highest_percentage: i32,
    pub lowest_percentage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBucket {
    pub range: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatsResponse {
    pub exam_id: Uuid,
    pub title: String,
    pub response_count: i64,
    pub average_percentage: f64,
    pub highest_percentage: i32,
    pub lowest_percentage: i32,
    pub distribution: Vec<ScoreBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub items: Vec<ExamStatsSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_email: String,
    pub student_name: Option<String>,
    pub response_count: i64,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReportResponse {
    pub items: Vec<StudentReport>,
}
