use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::lesson;
use crate::utils::now_utc;

/// A multiple-choice question. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i64,
    pub lesson_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizQuestion {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
}

/// One student's scored submission of answers, keyed by question id.
/// Repeat submissions append new attempts; nothing is updated in place.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub lesson_id: i64,
    pub student_id: i64,
    pub score: i64,
    pub answers: BTreeMap<i64, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    id: i64,
    lesson_id: i64,
    student_id: i64,
    score: i64,
    answers: String,
    submitted_at: OffsetDateTime,
}

impl AttemptRow {
    fn into_attempt(self) -> Result<QuizAttempt> {
        let answers = serde_json::from_str(&self.answers)
            .map_err(|e| anyhow::anyhow!("invalid stored answers: {e}"))?;
        Ok(QuizAttempt {
            id: self.id,
            lesson_id: self.lesson_id,
            student_id: self.student_id,
            score: self.score,
            answers,
            submitted_at: self.submitted_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score: i64,
    pub attempt: QuizAttempt,
}

/// Attempt listing denormalized with lesson and student display fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptListing {
    pub id: i64,
    pub lesson_id: i64,
    pub lesson_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub score: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

pub async fn get_questions(database: &SqlitePool, lesson_id: i64) -> Result<Vec<QuizQuestion>> {
    let questions = sqlx::query_as::<_, QuizQuestion>(
        "SELECT id, lesson_id, question_text, option_a, option_b, option_c, option_d, correct_option \
         FROM quiz_question WHERE lesson_id = ? ORDER BY id",
    )
    .bind(lesson_id)
    .fetch_all(database)
    .await?;
    Ok(questions)
}

pub async fn create_question(
    database: &SqlitePool,
    lesson_id: i64,
    input: CreateQuizQuestion,
) -> Result<QuizQuestion> {
    let question = sqlx::query_as::<_, QuizQuestion>(
        "INSERT INTO quiz_question \
         (lesson_id, question_text, option_a, option_b, option_c, option_d, correct_option) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING id, lesson_id, question_text, option_a, option_b, option_c, option_d, correct_option",
    )
    .bind(lesson_id)
    .bind(&input.question_text)
    .bind(&input.option_a)
    .bind(&input.option_b)
    .bind(&input.option_c)
    .bind(&input.option_d)
    .bind(&input.correct_option)
    .fetch_one(database)
    .await?;
    Ok(question)
}

/// Score a quiz submission and persist it as a new attempt.
///
/// The score is the share of questions whose submitted answer equals the
/// correct option, rounded to an integer percentage.
pub async fn submit_quiz_attempt(
    database: &SqlitePool,
    lesson_id: i64,
    student_id: i64,
    answers: BTreeMap<i64, String>,
) -> Result<QuizResult> {
    if lesson::fetch_lesson(database, lesson_id).await?.is_none() {
        return Err(Error::NotFound("Lesson not found".to_string()));
    }
    let questions = get_questions(database, lesson_id).await?;
    if questions.is_empty() {
        return Err(Error::BadRequest(
            "Lesson has no quiz questions".to_string(),
        ));
    }

    let total_questions = questions.len() as i64;
    let correct_answers = questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
        .count() as i64;
    let score = ((correct_answers as f64 / total_questions as f64) * 100.0).round() as i64;

    let answers_json =
        serde_json::to_string(&answers).map_err(|e| anyhow::anyhow!("encode answers: {e}"))?;
    let attempt = sqlx::query_as::<_, AttemptRow>(
        "INSERT INTO quiz_attempt (lesson_id, student_id, score, answers, submitted_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, lesson_id, student_id, score, answers, submitted_at",
    )
    .bind(lesson_id)
    .bind(student_id)
    .bind(score)
    .bind(answers_json)
    .bind(now_utc())
    .fetch_one(database)
    .await?
    .into_attempt()?;

    Ok(QuizResult {
        total_questions,
        correct_answers,
        score,
        attempt,
    })
}

const ATTEMPT_LISTING: &str = "SELECT qa.id, qa.lesson_id, l.title AS lesson_title, \
     qa.student_id, s.name AS student_name, qa.score, qa.submitted_at \
     FROM quiz_attempt qa \
     JOIN lesson l ON l.id = qa.lesson_id \
     JOIN student s ON s.id = qa.student_id";

pub async fn get_quiz_attempts_for_student(
    database: &SqlitePool,
    lesson_id: i64,
    student_id: i64,
) -> Result<Vec<AttemptListing>> {
    let attempts = sqlx::query_as::<_, AttemptListing>(&format!(
        "{ATTEMPT_LISTING} WHERE qa.lesson_id = ? AND qa.student_id = ? \
         ORDER BY qa.submitted_at DESC, qa.id DESC"
    ))
    .bind(lesson_id)
    .bind(student_id)
    .fetch_all(database)
    .await?;
    Ok(attempts)
}

pub async fn get_quiz_attempts_by_student(
    database: &SqlitePool,
    student_id: i64,
) -> Result<Vec<AttemptListing>> {
    let attempts = sqlx::query_as::<_, AttemptListing>(&format!(
        "{ATTEMPT_LISTING} WHERE qa.student_id = ? ORDER BY qa.submitted_at DESC, qa.id DESC"
    ))
    .bind(student_id)
    .fetch_all(database)
    .await?;
    Ok(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{memory_pool, seed_lesson, seed_question, seed_student, seed_teacher};

    #[tokio::test]
    async fn score_is_rounded_share_of_correct_answers() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Alice Johnson").await;
        let student_id = seed_student(&pool, "Student A").await;
        let lesson = seed_lesson(&pool, teacher_id, "Limits & Continuity").await;
        let mut question_ids = Vec::new();
        for correct in ["A", "B", "C", "D", "A"] {
            question_ids.push(seed_question(&pool, lesson.id, correct).await);
        }

        let answers: BTreeMap<i64, String> = [
            (question_ids[0], "A"),
            (question_ids[1], "B"),
            (question_ids[2], "X"),
            (question_ids[3], "D"),
            (question_ids[4], "Z"),
        ]
        .into_iter()
        .map(|(id, option)| (id, option.to_string()))
        .collect();

        let result = submit_quiz_attempt(&pool, lesson.id, student_id, answers.clone())
            .await
            .unwrap();
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.score, 60);
        assert_eq!(result.attempt.score, 60);
        assert_eq!(result.attempt.answers, answers);
    }

    #[tokio::test]
    async fn one_of_three_rounds_to_33() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Bob Williams").await;
        let student_id = seed_student(&pool, "Student B").await;
        let lesson = seed_lesson(&pool, teacher_id, "Kinematics").await;
        let mut question_ids = Vec::new();
        for correct in ["A", "B", "C"] {
            question_ids.push(seed_question(&pool, lesson.id, correct).await);
        }
        let answers = BTreeMap::from([(question_ids[0], "A".to_string())]);
        let result = submit_quiz_attempt(&pool, lesson.id, student_id, answers)
            .await
            .unwrap();
        assert_eq!(result.score, 33);
    }

    #[tokio::test]
    async fn quiz_without_questions_is_rejected() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Charlie Evans").await;
        let student_id = seed_student(&pool, "Student C").await;
        let lesson = seed_lesson(&pool, teacher_id, "Photosynthesis").await;

        let err = submit_quiz_attempt(&pool, lesson.id, student_id, BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn quiz_for_missing_lesson_is_not_found() {
        let pool = memory_pool().await;
        seed_student(&pool, "Student D").await;
        let err = submit_quiz_attempt(&pool, 404, 1, BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn repeat_submissions_append_attempts_newest_first() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Diana Carter").await;
        let student_id = seed_student(&pool, "Student E").await;
        let lesson = seed_lesson(&pool, teacher_id, "Atomic Structure").await;
        let question_id = seed_question(&pool, lesson.id, "A").await;

        let first = submit_quiz_attempt(
            &pool,
            lesson.id,
            student_id,
            BTreeMap::from([(question_id, "B".to_string())]),
        )
        .await
        .unwrap();
        let second = submit_quiz_attempt(
            &pool,
            lesson.id,
            student_id,
            BTreeMap::from([(question_id, "A".to_string())]),
        )
        .await
        .unwrap();
        assert_eq!(first.score, 0);
        assert_eq!(second.score, 100);

        let listing = get_quiz_attempts_for_student(&pool, lesson.id, student_id)
            .await
            .unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, second.attempt.id);
        assert_eq!(listing[0].lesson_title, "Atomic Structure");
        assert_eq!(listing[0].student_name, "Student E");

        let all = get_quiz_attempts_by_student(&pool, student_id).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
