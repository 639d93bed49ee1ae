use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::course::LessonInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson{
    pub id: Uuid,
    pub module_id: Uuid,
    pub name: String,
    pub content: String,
    pub video_url: Option<String>,
    pub is_free_preview: bool,
    pub position: i32,
}

pub async fn list_lessons(pool:&Pool<Postgres>, module_id:Uuid) -> Result<Vec<Lesson>, sqlx::Error>{
    sqlx::query_as::<_, Lesson>(
        r#"
            SELECT id, module_id, name, content, video_url, is_free_preview, position
            FROM lesson_table
            WHERE module_id = $1
            ORDER BY position, id
        "#,
    )
    .bind(module_id)
    .fetch_all(pool)
    .await
}

/// Insert or update keyed by `id`. Returns `None` when the id already belongs to another module.
pub async fn upsert_lesson(pool:&Pool<Postgres>, module_id:Uuid, id:Uuid, input:&LessonInput) -> Result<Option<Lesson>, sqlx::Error>{
    sqlx::query_as::<_, Lesson>(
        r#"
            INSERT INTO lesson_table (id, module_id, name, content, video_url, is_free_preview, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                content = EXCLUDED.content,
                video_url = EXCLUDED.video_url,
                is_free_preview = EXCLUDED.is_free_preview,
                position = EXCLUDED.position
            WHERE lesson_table.module_id = EXCLUDED.module_id
            RETURNING id, module_id, name, content, video_url, is_free_preview, position
        "#,
    )
    .bind(id)
    .bind(module_id)
    .bind(input.name.trim())
    .bind(&input.content)
    .bind(&input.video_url)
    .bind(input.is_free_preview)
    .bind(input.position)
    .fetch_optional(pool)
    .await
}

pub async fn delete_lesson(pool:&Pool<Postgres>, module_id:Uuid, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM lesson_table WHERE id = $1 AND module_id = $2")
        .bind(id)
        .bind(module_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
