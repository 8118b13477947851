use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
}

pub async fn get_student_list(database: &SqlitePool) -> Result<Vec<StudentInfo>> {
    let students =
        sqlx::query_as::<_, StudentInfo>("SELECT id, name, email FROM student ORDER BY id")
            .fetch_all(database)
            .await?;
    Ok(students)
}

pub async fn get_student(database: &SqlitePool, id: i64) -> Result<Option<StudentInfo>> {
    let student =
        sqlx::query_as::<_, StudentInfo>("SELECT id, name, email FROM student WHERE id = ?")
            .bind(id)
            .fetch_optional(database)
            .await?;
    Ok(student)
}

pub async fn create_student(database: &SqlitePool, name: &str, email: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO student (name, email) VALUES (?, ?)")
        .bind(name)
        .bind(email)
        .execute(database)
        .await?;
    Ok(result.last_insert_rowid())
}
