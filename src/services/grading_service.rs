use uuid::Uuid;

use crate::models::question::Question;

#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub answers: Vec<GradedAnswer>,
    pub score: i32,
    pub total_points: i32,
}

pub struct GradingService;

impl GradingService {
    /// Grades a submission against the exam's questions.
    ///
    /// Every question counts towards the total, answered or not. Objective
    /// questions with a stored correct answer are compared by exact,
    /// case-sensitive string equality; subjective ones are recorded as
    /// incorrect and earn nothing until a tutor overrides the score.
    /// Submitted answers that do not match any question are dropped.
    pub fn grade(questions: &[Question], submitted: &[SubmittedAnswer]) -> GradeOutcome {
        let mut score: i32 = 0;
        let mut total_points: i32 = 0;
        let mut answers: Vec<GradedAnswer> = Vec::new();

        for question in questions {
            total_points += question.points;

            let Some(given) = submitted.iter().find(|a| a.question_id == question.id) else {
                continue;
            };

            let is_correct = question.question_type.is_objective()
                && question
                    .correct_answer
                    .as_deref()
                    .map(|correct| correct == given.answer)
                    .unwrap_or(false);

            if is_correct {
                score += question.points;
            }

            answers.push(GradedAnswer {
                question_id: question.id,
                answer: given.answer.clone(),
                is_correct,
            });
        }

        GradeOutcome {
            answers,
            score,
            total_points,
        }
    }
}

/// Integer percentage of `score` out of `total_points`, rounded half-up,
/// or 0 when the exam carries no points at all.
pub fn percentage(score: i32, total_points: i32) -> i32 {
    if total_points > 0 {
        ((score as f64 / total_points as f64) * 100.0).round() as i32
    } else {
        0
    }
}
