//! Seeds the database with demo teachers, students, lessons, quizzes and
//! tasks for local development.

use std::path::PathBuf;

use clap::Parser;
use lesson_server::lesson::CreateLesson;
use lesson_server::quiz::CreateQuizQuestion;
use lesson_server::utils::{init_log, now_utc};
use lesson_server::{MIGRATOR, lesson, quiz, student, task, teacher};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to database file
    #[arg(short, long, default_value = "./database/lessons.db")]
    database: PathBuf,
}

const TOPICS: [&str; 20] = [
    "Introduction to Calculus",
    "Limits & Continuity",
    "Derivatives",
    "Integrals",
    "Probability Basics",
    "Newton's Laws",
    "Electric Circuits",
    "Organic Chemistry",
    "Cell Biology",
    "Kinematics",
    "Geometry Basics",
    "Fractions Fundamentals",
    "Human Digestive System",
    "Solar System Overview",
    "Photosynthesis",
    "Algebra Essentials",
    "States of Matter",
    "Water Cycle",
    "Atomic Structure",
    "Chemical Reactions",
];

const VIDEO_URL: &str = "https://www.youtube.com/embed/WUvTyaaNkzM";

async fn clear(database: &SqlitePool) -> anyhow::Result<()> {
    for table in [
        "lesson_view",
        "task_submission",
        "quiz_attempt",
        "quiz_question",
        "lesson_task",
        "lesson",
        "teacher",
        "student",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(database)
            .await?;
    }
    Ok(())
}

fn questions_for(topic: &str) -> Vec<CreateQuizQuestion> {
    let specs = [
        (format!("What is the key idea behind {topic}?"), "Concept", "A"),
        (format!("Which statement about {topic} is true?"), "Option", "B"),
        (
            format!("How does {topic} relate to real-world applications?"),
            "Method",
            "C",
        ),
        (format!("Identify the correct concept in {topic}."), "Type", "D"),
        (format!("Which example demonstrates {topic}?"), "Example", "A"),
    ];
    specs
        .into_iter()
        .map(|(question_text, stem, correct_option)| CreateQuizQuestion {
            question_text,
            option_a: format!("{stem} A"),
            option_b: format!("{stem} B"),
            option_c: format!("{stem} C"),
            option_d: format!("{stem} D"),
            correct_option: correct_option.to_string(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_log(None);
    let args = Cli::parse();

    let options = SqliteConnectOptions::new()
        .filename(&args.database)
        .create_if_missing(true)
        .foreign_keys(true);
    let database = SqlitePoolOptions::new().connect_with(options).await?;
    MIGRATOR.run(&database).await?;

    info!("clearing old data");
    clear(&database).await?;

    info!("seeding teachers");
    let mut teacher_ids = Vec::new();
    for (name, email) in [
        ("Alice Johnson", "alice@lmsc.org"),
        ("Bob Williams", "bob@lmsc.org"),
        ("Charlie Evans", "charlie@lmsc.org"),
        ("Diana Carter", "diana@lmsc.org"),
        ("Edward Smith", "edward@lmsc.org"),
    ] {
        teacher_ids.push(teacher::create_teacher(&database, name, email).await?);
    }

    info!("seeding students");
    for (name, email) in [
        ("Student A", "studentA@example.com"),
        ("Student B", "studentB@example.com"),
        ("Student C", "studentC@example.com"),
        ("Student D", "studentD@example.com"),
        ("Student E", "studentE@example.com"),
    ] {
        student::create_student(&database, name, email).await?;
    }

    info!("seeding lessons, quizzes and tasks");
    let mut lesson_count = 0usize;
    for teacher_id in teacher_ids {
        for _ in 0..10 {
            let topic = TOPICS[lesson_count % TOPICS.len()];
            let created = lesson::create_lesson(
                &database,
                CreateLesson {
                    title: topic.to_string(),
                    description: format!(
                        "This lesson covers important concepts about {topic}."
                    ),
                    video_url: VIDEO_URL.to_string(),
                    teacher_id,
                    published_at: Some(now_utc()),
                },
            )
            .await?;
            for question in questions_for(topic) {
                quiz::create_question(&database, created.id, question).await?;
            }
            task::create_lesson_task(
                &database,
                created.id,
                &format!("Write a short summary explaining the topic: {topic}."),
            )
            .await?;
            lesson_count += 1;
        }
    }

    info!("seeding completed: {lesson_count} lessons");
    Ok(())
}
