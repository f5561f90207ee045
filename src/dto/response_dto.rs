use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::exam_dto::QuestionResponse;
use crate::models::response::Response;
use crate::services::grading_service;
use crate::services::response_service::AnswerWithQuestion;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetScorePayload {
    #[validate(range(min = 0, message = "Score cannot be negative"))]
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub score: Option<i32>,
    pub total_points: i32,
    pub percentage: i32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub question_id: Uuid,
    pub answer_text: String,
    pub is_correct: bool,
    pub question: QuestionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetail {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub score: Option<i32>,
    pub total_points: i32,
    pub percentage: i32,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseListResponse {
    pub items: Vec<ResponseSummary>,
}

impl From<Response> for ResponseSummary {
    fn from(value: Response) -> Self {
        let percentage =
            grading_service::percentage(value.score.unwrap_or(0), value.total_points);
        Self {
            id: value.id,
            exam_id: value.exam_id,
            student_name: value.student_name,
            student_email: value.student_email,
            score: value.score,
            total_points: value.total_points,
            percentage,
            submitted_at: value.submitted_at,
        }
    }
}

impl From<AnswerWithQuestion> for AnswerDetail {
    fn from(value: AnswerWithQuestion) -> Self {
        let options = value
            .options
            .and_then(|raw| serde_json::from_value(raw).ok());
        Self {
            question_id: value.question_id,
            answer_text: value.answer_text,
            is_correct: value.is_correct,
            question: QuestionResponse {
                id: value.question_id,
                question_type: value.question_type,
                prompt: value.prompt,
                options,
                correct_answer: value.correct_answer,
                points: value.points,
                position: value.position,
            },
        }
    }
}

impl ResponseDetail {
    pub fn from_parts(response: Response, answers: Vec<AnswerWithQuestion>) -> Self {
        let percentage =
            grading_service::percentage(response.score.unwrap_or(0), response.total_points);
        Self {
            id: response.id,
            exam_id: response.exam_id,
            student_name: response.student_name,
            student_email: response.student_email,
            score: response.score,
            total_points: response.total_points,
            percentage,
            submitted_at: response.submitted_at,
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}
