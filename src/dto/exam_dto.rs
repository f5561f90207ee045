use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::exam::Exam;
use crate::models::question::{Question, QuestionType};
use crate::services::exam_service::{ExamList, ExamListItem};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionPayload {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1, message = "Question prompt cannot be empty"))]
    pub prompt: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    #[validate(range(min = 1, message = "Points must be at least 1"))]
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamPayload {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: String,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    pub time_limit_minutes: Option<i32>,
    #[validate(length(min = 1, message = "An exam needs at least one question"), nested)]
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamPayload {
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    pub time_limit_minutes: Option<i32>,
    pub is_active: Option<bool>,
    #[validate(length(min = 1, message = "An exam needs at least one question"), nested)]
    pub questions: Option<Vec<CreateQuestionPayload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: uuid::Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub points: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResponse {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub share_token: String,
    pub is_active: bool,
    pub questions: Vec<QuestionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub share_token: String,
    pub is_active: bool,
    pub response_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamListResponse {
    pub items: Vec<ExamSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl From<Question> for QuestionResponse {
    fn from(value: Question) -> Self {
        let options = value
            .options
            .and_then(|raw| serde_json::from_value(raw).ok());
        Self {
            id: value.id,
            question_type: value.question_type,
            prompt: value.prompt,
            options,
            correct_answer: value.correct_answer,
            points: value.points,
            position: value.position,
        }
    }
}

impl ExamResponse {
    pub fn from_parts(exam: Exam, questions: Vec<Question>) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            description: exam.description,
            time_limit_minutes: exam.time_limit_minutes,
            share_token: exam.share_token,
            is_active: exam.is_active,
            questions: questions.into_iter().map(Into::into).collect(),
            created_at: exam.created_at,
            updated_at: exam.updated_at,
        }
    }
}

impl From<ExamListItem> for ExamSummary {
    fn from(value: ExamListItem) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            time_limit_minutes: value.time_limit_minutes,
            share_token: value.share_token,
            is_active: value.is_active,
            response_count: value.response_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<ExamList> for ExamListResponse {
    fn from(value: ExamList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}
