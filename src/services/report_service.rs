use std::collections::{BTreeMap, HashMap};

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::report_dto::{ExamStatsResponse, ExamStatsSummary, ScoreBucket, StudentReport};
use crate::error::Result;
use crate::models::exam::Exam;
use crate::services::grading_service::percentage;

// Distribution buckets, highest first. The top bucket also absorbs manually
// overridden scores above 100%.
const BUCKETS: [(&str, i32); 4] = [("90-100", 90), ("80-89", 80), ("70-79", 70), ("60-69", 60)];
const BOTTOM_BUCKET: &str = "0-59";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub average: f64,
    pub highest: i32,
    pub lowest: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ScoredResponseRow {
    exam_id: Uuid,
    score: Option<i32>,
    total_points: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StudentResponseRow {
    pub(crate) student_email: String,
    pub(crate) student_name: Option<String>,
    pub(crate) score: Option<i32>,
    pub(crate) total_points: i32,
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Per-exam score summaries across every exam the tutor owns, newest
    /// exam first. Exams without responses are included with zeroed stats.
    pub async fn overview(&self, author_id: Uuid) -> Result<Vec<ExamStatsSummary>> {
        let exams: Vec<(Uuid, String)> = sqlx::query_as(
            r#"SELECT id, title FROM exams WHERE author_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ScoredResponseRow>(
            r#"
            SELECT r.exam_id, r.score, r.total_points
            FROM responses r
            JOIN exams e ON e.id = r.exam_id
            WHERE e.author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        let mut per_exam: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for row in rows {
            per_exam
                .entry(row.exam_id)
                .or_default()
                .push(percentage(row.score.unwrap_or(0), row.total_points));
        }

        let summaries = exams
            .into_iter()
            .map(|(exam_id, title)| {
                let percentages = per_exam.remove(&exam_id).unwrap_or_default();
                let summary = summarize(&percentages);
                ExamStatsSummary {
                    exam_id,
                    title,
                    response_count: percentages.len() as i64,
                    average_percentage: summary.average,
                    highest_percentage: summary.highest,
                    lowest_percentage: summary.lowest,
                }
            })
            .collect();

        Ok(summaries)
    }

    pub async fn exam_stats(&self, exam: &Exam) -> Result<ExamStatsResponse> {
        let rows: Vec<(Option<i32>, i32)> = sqlx::query_as(
            r#"SELECT score, total_points FROM responses WHERE exam_id = $1"#,
        )
        .bind(exam.id)
        .fetch_all(&self.pool)
        .await?;

        let percentages: Vec<i32> = rows
            .into_iter()
            .map(|(score, total_points)| percentage(score.unwrap_or(0), total_points))
            .collect();

        let summary = summarize(&percentages);

        Ok(ExamStatsResponse {
            exam_id: exam.id,
            title: exam.title.clone(),
            response_count: percentages.len() as i64,
            average_percentage: summary.average,
            highest_percentage: summary.highest,
            lowest_percentage: summary.lowest,
            distribution: distribution(&percentages),
        })
    }

    /// Per-student averages across all of the tutor's exams. Submissions
    /// without an email are anonymous and excluded.
    pub async fn student_reports(&self, author_id: Uuid) -> Result<Vec<StudentReport>> {
        let rows = sqlx::query_as::<_, StudentResponseRow>(
            r#"
            SELECT r.student_email, r.student_name, r.score, r.total_points
            FROM responses r
            JOIN exams e ON e.id = r.exam_id
            WHERE e.author_id = $1 AND r.student_email IS NOT NULL
            ORDER BY r.submitted_at
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fold_student_reports(rows))
    }
}

pub(crate) fn summarize(percentages: &[i32]) -> ScoreSummary {
    if percentages.is_empty() {
        return ScoreSummary {
            average: 0.0,
            highest: 0,
            lowest: 0,
        };
    }

    let sum: i64 = percentages.iter().map(|&p| p as i64).sum();
    let average = (sum as f64 / percentages.len() as f64 * 10.0).round() / 10.0;

    ScoreSummary {
        average,
        highest: *percentages.iter().max().unwrap_or(&0),
        lowest: *percentages.iter().min().unwrap_or(&0),
    }
}

pub(crate) fn distribution(percentages: &[i32]) -> Vec<ScoreBucket> {
    let mut buckets: Vec<ScoreBucket> = BUCKETS
        .iter()
        .map(|(range, _)| ScoreBucket {
            range: range.to_string(),
            count: 0,
        })
        .collect();
    buckets.push(ScoreBucket {
        range: BOTTOM_BUCKET.to_string(),
        count: 0,
    });

    for &pct in percentages {
        let slot = BUCKETS
            .iter()
            .position(|&(_, floor)| pct >= floor)
            .unwrap_or(BUCKETS.len());
        buckets[slot].count += 1;
    }

    buckets
}

/// Rows must arrive in submission order: the report keeps the name a
/// student gave most recently.
pub(crate) fn fold_student_reports(rows: Vec<StudentResponseRow>) -> Vec<StudentReport> {
    let mut per_student: BTreeMap<String, (Option<String>, Vec<i32>)> = BTreeMap::new();

    for row in rows {
        let entry = per_student
            .entry(row.student_email)
            .or_insert_with(|| (None, Vec::new()));
        if row.student_name.is_some() {
            entry.0 = row.student_name;
        }
        entry
            .1
            .push(percentage(row.score.unwrap_or(0), row.total_points));
    }

    per_student
        .into_iter()
        .map(|(email, (name, percentages))| {
            let summary = summarize(&percentages);
            StudentReport {
                student_email: email,
                student_name: name,
                response_count: percentages.len() as i64,
                average_percentage: summary.average,
            }
        })
        .collect()
}
