use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::public_dto::SubmitResponsePayload;
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::question::{Question, QuestionType};
use crate::models::response::Response;
use crate::services::grading_service::{GradingService, SubmittedAnswer};

/// Answer row joined with the question it was given for, ordered by the
/// question's position within the exam.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnswerWithQuestion {
    pub question_id: Uuid,
    pub answer_text: String,
    pub is_correct: bool,
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Option<JsonValue>,
    pub correct_answer: Option<String>,
    pub points: i32,
    pub position: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ResponseWithAuthor {
    id: Uuid,
    exam_id: Uuid,
    student_name: Option<String>,
    student_email: Option<String>,
    score: Option<i32>,
    total_points: i32,
    submitted_at: DateTime<Utc>,
    author_id: Uuid,
}

#[derive(Clone)]
pub struct ResponseService {
    pool: PgPool,
}

impl ResponseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grades the submission and persists the response together with its
    /// graded answers in one transaction.
    pub async fn create_response(
        &self,
        exam_id: Uuid,
        questions: &[Question],
        payload: &SubmitResponsePayload,
    ) -> Result<(Response, Vec<Answer>)> {
        let submitted: Vec<SubmittedAnswer> = payload
            .answers
            .iter()
            .map(|a| SubmittedAnswer {
                question_id: a.question_id,
                answer: a.answer.clone(),
            })
            .collect();

        let outcome = GradingService::grade(questions, &submitted);

        let mut tx = self.pool.begin().await?;

        let response = sqlx::query_as::<_, Response>(
            r#"
            INSERT INTO responses (exam_id, student_name, student_email, score, total_points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(exam_id)
        .bind(&payload.student_name)
        .bind(&payload.student_email)
        .bind(outcome.score)
        .bind(outcome.total_points)
        .fetch_one(&mut *tx)
        .await?;

        let mut answers = Vec::with_capacity(outcome.answers.len());
        for graded in &outcome.answers {
            let answer = sqlx::query_as::<_, Answer>(
                r#"
                INSERT INTO answers (response_id, question_id, answer_text, is_correct)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(response.id)
            .bind(graded.question_id)
            .bind(&graded.answer)
            .bind(graded.is_correct)
            .fetch_one(&mut *tx)
            .await?;
            answers.push(answer);
        }

        tx.commit().await?;

        Ok((response, answers))
    }

    pub async fn list_for_exam(&self, exam_id: Uuid) -> Result<Vec<Response>> {
        let responses = sqlx::query_as::<_, Response>(
            r#"SELECT * FROM responses WHERE exam_id = $1 ORDER BY submitted_at DESC"#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }

    /// Fetches a response together with the owning exam's author, used to
    /// authorize tutor access to other people's submissions.
    pub async fn find_with_author(&self, response_id: Uuid) -> Result<(Response, Uuid)> {
        let row = sqlx::query_as::<_, ResponseWithAuthor>(
            r#"
            SELECT r.id, r.exam_id, r.student_name, r.student_email, r.score,
                   r.total_points, r.submitted_at, e.author_id
            FROM responses r
            JOIN exams e ON e.id = r.exam_id
            WHERE r.id = $1
            "#,
        )
        .bind(response_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Response not found".to_string()))?;

        let response = Response {
            id: row.id,
            exam_id: row.exam_id,
            student_name: row.student_name,
            student_email: row.student_email,
            score: row.score,
            total_points: row.total_points,
            submitted_at: row.submitted_at,
        };

        Ok((response, row.author_id))
    }

    pub async fn load_answers(&self, response_id: Uuid) -> Result<Vec<AnswerWithQuestion>> {
        let answers = sqlx::query_as::<_, AnswerWithQuestion>(
            r#"
            SELECT a.question_id, a.answer_text, a.is_correct,
                   q.question_type, q.prompt, q.options, q.correct_answer, q.points, q.position
            FROM answers a
            JOIN questions q ON q.id = a.question_id
            WHERE a.response_id = $1
            ORDER BY q.position
            "#,
        )
        .bind(response_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    /// Manual score override. There is deliberately no upper bound: tutors
    /// may award more than the exam's total, e.g. bonus points.
    pub async fn set_score(
        &self,
        response_id: Uuid,
        new_score: i32,
        acting_user_id: Uuid,
    ) -> Result<Response> {
        let (_, author_id) = self.find_with_author(response_id).await?;
        if author_id != acting_user_id {
            return Err(Error::Forbidden(
                "Only the exam author can set a score".to_string(),
            ));
        }

        let response = sqlx::query_as::<_, Response>(
            r#"UPDATE responses SET score = $1 WHERE id = $2 RETURNING *"#,
        )
        .bind(new_score)
        .bind(response_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(response)
    }
}
