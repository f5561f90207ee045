use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::Answer;
use crate::models::exam::Exam;
use crate::models::question::{Question, QuestionType};
use crate::models::response::Response;
use crate::services::grading_service;

/// Student-facing view of a question. The correct answer is never exposed
/// through the share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Option<Vec<String>>,
    pub points: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExamResponse {
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerPayload {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponsePayload {
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub student_name: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    #[validate(email(message = "Invalid email format"))]
    pub student_email: Option<String>,
    #[validate(length(min = 1, message = "At least one answer is required"), nested)]
    pub answers: Vec<SubmitAnswerPayload>,
}

/// One persisted answer echoed back to the student, carrying the public
/// view of its question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswerView {
    pub question_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
    pub question: PublicQuestion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponseView {
    pub id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub score: Option<i32>,
    pub total_points: i32,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<SubmittedAnswerView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultResponse {
    pub response: SubmittedResponseView,
    pub score: i32,
    pub total_points: i32,
    pub percentage: i32,
}

impl From<Question> for PublicQuestion {
    fn from(value: Question) -> Self {
        let options = value
            .options
            .and_then(|raw| serde_json::from_value(raw).ok());
        Self {
            id: value.id,
            question_type: value.question_type,
            prompt: value.prompt,
            options,
            points: value.points,
            position: value.position,
        }
    }
}

impl PublicExamResponse {
    pub fn from_parts(exam: Exam, questions: Vec<Question>) -> Self {
        Self {
            title: exam.title,
            description: exam.description,
            time_limit_minutes: exam.time_limit_minutes,
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl SubmitResultResponse {
    pub fn from_parts(response: Response, answers: Vec<Answer>, questions: &[Question]) -> Self {
        let score = response.score.unwrap_or(0);
        let total_points = response.total_points;

        let answer_views = answers
            .into_iter()
            .filter_map(|answer| {
                questions
                    .iter()
                    .find(|q| q.id == answer.question_id)
                    .map(|q| SubmittedAnswerView {
                        question_id: answer.question_id,
                        answer: answer.answer_text,
                        is_correct: answer.is_correct,
                        question: PublicQuestion::from(q.clone()),
                    })
            })
            .collect();

        Self {
            response: SubmittedResponseView {
                id: response.id,
                student_name: response.student_name,
                student_email: response.student_email,
                score: response.score,
                total_points,
                submitted_at: response.submitted_at,
                answers: answer_views,
            },
            score,
            total_points,
            percentage: grading_service::percentage(score, total_points),
        }
    }
}
