use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::exam_dto::{CreateExamPayload, CreateQuestionPayload, UpdateExamPayload};
use crate::error::{Error, Result};
use crate::models::exam::Exam;
use crate::models::question::{Question, QuestionType};
use crate::utils::token::generate_share_token;

const SHARE_TOKEN_LENGTH: usize = 32;

#[derive(Debug)]
pub struct ExamList {
    pub items: Vec<ExamListItem>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExamListItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub share_token: String,
    pub is_active: bool,
    pub response_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ExamFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct ExamService {
    pool: PgPool,
}

impl ExamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_exam(
        &self,
        payload: CreateExamPayload,
        author_id: Uuid,
    ) -> Result<(Exam, Vec<Question>)> {
        validate_question_set(&payload.questions)?;

        let share_token = generate_share_token(SHARE_TOKEN_LENGTH);

        let mut tx = self.pool.begin().await?;

        let exam = sqlx::query_as::<_, Exam>(
            r#"
            INSERT INTO exams (author_id, title, description, time_limit_minutes, share_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, title, description, time_limit_minutes, share_token,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.time_limit_minutes)
        .bind(&share_token)
        .fetch_one(&mut *tx)
        .await?;

        let questions = insert_questions(&mut tx, exam.id, &payload.questions).await?;

        tx.commit().await?;

        Ok((exam, questions))
    }

    /// Looks the exam up by id scoped to its author, so a foreign exam is
    /// indistinguishable from a missing one.
    pub async fn find_owned(&self, exam_id: Uuid, author_id: Uuid) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, author_id, title, description, time_limit_minutes, share_token,
                   is_active, created_at, updated_at
            FROM exams
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(exam_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;

        Ok(exam)
    }

    pub async fn get_exam(&self, exam_id: Uuid, author_id: Uuid) -> Result<(Exam, Vec<Question>)> {
        let exam = self.find_owned(exam_id, author_id).await?;
        let questions = self.load_questions(exam.id).await?;
        Ok((exam, questions))
    }

    pub async fn load_questions(&self, exam_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, exam_id, question_type, prompt, options, correct_answer, points, position
            FROM questions
            WHERE exam_id = $1
            ORDER BY position
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    pub async fn update_exam(
        &self,
        exam_id: Uuid,
        author_id: Uuid,
        payload: UpdateExamPayload,
    ) -> Result<(Exam, Vec<Question>)> {
        self.find_owned(exam_id, author_id).await?;

        if let Some(questions) = &payload.questions {
            validate_question_set(questions)?;
        }

        let mut tx = self.pool.begin().await?;

        let exam = sqlx::query_as::<_, Exam>(
            r#"
            UPDATE exams
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                time_limit_minutes = COALESCE($3, time_limit_minutes),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, author_id, title, description, time_limit_minutes, share_token,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.time_limit_minutes)
        .bind(payload.is_active)
        .bind(exam_id)
        .fetch_one(&mut *tx)
        .await?;

        let questions = match payload.questions {
            Some(replacement) => {
                sqlx::query("DELETE FROM questions WHERE exam_id = $1")
                    .bind(exam_id)
                    .execute(&mut *tx)
                    .await?;
                insert_questions(&mut tx, exam_id, &replacement).await?
            }
            None => {
                sqlx::query_as::<_, Question>(
                    r#"
                    SELECT id, exam_id, question_type, prompt, options, correct_answer, points, position
                    FROM questions
                    WHERE exam_id = $1
                    ORDER BY position
                    "#,
                )
                .bind(exam_id)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok((exam, questions))
    }

    pub async fn delete_exam(&self, exam_id: Uuid, author_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM exams WHERE id = $1 AND author_id = $2")
            .bind(exam_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Exam not found".to_string()));
        }

        Ok(())
    }

    pub async fn list_exams(
        &self,
        author_id: Uuid,
        page: i64,
        per_page: i64,
        filter: ExamFilter,
    ) -> Result<ExamList> {
        let offset = (page - 1) * per_page;
        let search_param: Option<String> = filter.search.map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM exams
            WHERE author_id = $1
              AND ($2::bool IS NULL OR is_active = $2)
              AND ($3::text IS NULL OR (title ILIKE $3 OR description ILIKE $3))
            "#,
        )
        .bind(author_id)
        .bind(filter.is_active)
        .bind(&search_param)
        .fetch_one(&self.pool)
        .await?;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        let items = sqlx::query_as::<_, ExamListItem>(
            r#"
            SELECT e.id, e.author_id, e.title, e.description, e.time_limit_minutes,
                   e.share_token, e.is_active,
                   (SELECT COUNT(*) FROM responses r WHERE r.exam_id = e.id) AS response_count,
                   e.created_at, e.updated_at
            FROM exams e
            WHERE e.author_id = $1
              AND ($2::bool IS NULL OR e.is_active = $2)
              AND ($3::text IS NULL OR (e.title ILIKE $3 OR e.description ILIKE $3))
            ORDER BY e.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(author_id)
        .bind(filter.is_active)
        .bind(&search_param)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ExamList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Public lookup for the share link. Inactive exams are treated as
    /// missing so a closed link stops resolving.
    pub async fn find_active_by_token(&self, share_token: &str) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, author_id, title, description, time_limit_minutes, share_token,
                   is_active, created_at, updated_at
            FROM exams
            WHERE share_token = $1 AND is_active = TRUE
            "#,
        )
        .bind(share_token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;

        Ok(exam)
    }
}

async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    exam_id: Uuid,
    payload: &[CreateQuestionPayload],
) -> Result<Vec<Question>> {
    let mut questions = Vec::with_capacity(payload.len());

    for (idx, item) in payload.iter().enumerate() {
        let options_json = item.options.as_ref().map(|opts| serde_json::json!(opts));

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (exam_id, question_type, prompt, options, correct_answer, points, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, exam_id, question_type, prompt, options, correct_answer, points, position
            "#,
        )
        .bind(exam_id)
        .bind(item.question_type)
        .bind(&item.prompt)
        .bind(options_json)
        .bind(&item.correct_answer)
        .bind(item.points)
        .bind((idx as i32) + 1)
        .fetch_one(&mut **tx)
        .await?;

        questions.push(question);
    }

    Ok(questions)
}

/// Structural checks that go beyond per-field validation: option lists are
/// required for multiple-choice questions and rejected everywhere else.
fn validate_question_set(questions: &[CreateQuestionPayload]) -> Result<()> {
    for (idx, question) in questions.iter().enumerate() {
        let number = idx + 1;
        match question.question_type {
            QuestionType::MultipleChoice => {
                let option_count = question.options.as_ref().map(|o| o.len()).unwrap_or(0);
                if option_count < 2 {
                    return Err(Error::BadRequest(format!(
                        "Question {}: multiple choice questions need at least two options",
                        number
                    )));
                }
            }
            _ => {
                if question.options.as_ref().is_some_and(|o| !o.is_empty()) {
                    return Err(Error::BadRequest(format!(
                        "Question {}: only multiple choice questions can have options",
                        number
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(options: Option<Vec<&str>>) -> CreateQuestionPayload {
        CreateQuestionPayload {
            question_type: QuestionType::MultipleChoice,
            prompt: "Pick one".to_string(),
            options: options.map(|o| o.into_iter().map(str::to_string).collect()),
            correct_answer: Some("A".to_string()),
            points: 1,
        }
    }

    fn essay() -> CreateQuestionPayload {
        CreateQuestionPayload {
            question_type: QuestionType::Essay,
            prompt: "Explain".to_string(),
            options: None,
            correct_answer: None,
            points: 5,
        }
    }

    #[test]
    fn multiple_choice_requires_at_least_two_options() {
        assert!(validate_question_set(&[mcq(Some(vec!["A", "B"]))]).is_ok());
        assert!(validate_question_set(&[mcq(Some(vec!["A"]))]).is_err());
        assert!(validate_question_set(&[mcq(None)]).is_err());
    }

    #[test]
    fn options_are_rejected_on_non_choice_questions() {
        let mut bad = essay();
        bad.options = Some(vec!["A".to_string(), "B".to_string()]);
        assert!(validate_question_set(&[bad]).is_err());
        assert!(validate_question_set(&[essay()]).is_ok());
    }

    #[test]
    fn error_messages_name_the_offending_question() {
        let err = validate_question_set(&[essay(), mcq(None)]).unwrap_err();
        match err {
            Error::BadRequest(msg) => assert!(msg.starts_with("Question 2:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
