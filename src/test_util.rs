//! Shared fixtures for the module tests: an in-memory database with the
//! schema applied, plus small row factories.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::lesson::{self, CreateLesson, Lesson};
use crate::quiz::{self, CreateQuizQuestion};
use crate::{student, task, teacher};

/// In-memory pool pinned to a single connection so every query sees the same
/// database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    crate::MIGRATOR.run(&pool).await.unwrap();
    pool
}

fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}

pub async fn seed_teacher(pool: &SqlitePool, name: &str) -> i64 {
    teacher::create_teacher(pool, name, &email_for(name)).await.unwrap()
}

pub async fn seed_student(pool: &SqlitePool, name: &str) -> i64 {
    student::create_student(pool, name, &email_for(name)).await.unwrap()
}

pub async fn seed_lesson(pool: &SqlitePool, teacher_id: i64, title: &str) -> Lesson {
    lesson::create_lesson(
        pool,
        CreateLesson {
            title: title.to_string(),
            description: format!("This lesson covers important concepts about {title}."),
            video_url: "https://www.youtube.com/embed/WUvTyaaNkzM".to_string(),
            teacher_id,
            published_at: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_question(pool: &SqlitePool, lesson_id: i64, correct: &str) -> i64 {
    quiz::create_question(
        pool,
        lesson_id,
        CreateQuizQuestion {
            question_text: "Which statement is true?".to_string(),
            option_a: "Option 1".to_string(),
            option_b: "Option 2".to_string(),
            option_c: "Option 3".to_string(),
            option_d: "Option 4".to_string(),
            correct_option: correct.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_task(pool: &SqlitePool, lesson_id: i64) -> i64 {
    task::create_lesson_task(pool, lesson_id, "Write a short summary of the topic.")
        .await
        .unwrap()
        .id
}
