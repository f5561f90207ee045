use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Response {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub score: Option<i32>,
    pub total_points: i32,
    pub submitted_at: DateTime<Utc>,
}
