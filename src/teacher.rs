use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
}

pub async fn get_teacher_list(database: &SqlitePool) -> Result<Vec<TeacherInfo>> {
    let teachers =
        sqlx::query_as::<_, TeacherInfo>("SELECT id, name, email FROM teacher ORDER BY id")
            .fetch_all(database)
            .await?;
    Ok(teachers)
}

pub async fn get_teacher(database: &SqlitePool, id: i64) -> Result<Option<TeacherInfo>> {
    let teacher =
        sqlx::query_as::<_, TeacherInfo>("SELECT id, name, email FROM teacher WHERE id = ?")
            .bind(id)
            .fetch_optional(database)
            .await?;
    Ok(teacher)
}

pub async fn create_teacher(database: &SqlitePool, name: &str, email: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO teacher (name, email) VALUES (?, ?)")
        .bind(name)
        .bind(email)
        .execute(database)
        .await?;
    Ok(result.last_insert_rowid())
}
