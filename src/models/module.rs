use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::course::ModuleInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Module{
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

pub async fn list_modules(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<Module>, sqlx::Error>{
    sqlx::query_as::<_, Module>(
        r#"
            SELECT id, course_id, title, position FROM module_table
            WHERE course_id = $1
            ORDER BY position, id
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub async fn get_module_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Module>, sqlx::Error>{
    sqlx::query_as::<_, Module>("SELECT id, course_id, title, position FROM module_table WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert or update keyed by `id`. Returns `None` when the id already belongs to another course.
pub async fn upsert_module(pool:&Pool<Postgres>, course_id:Uuid, id:Uuid, input:&ModuleInput) -> Result<Option<Module>, sqlx::Error>{
    sqlx::query_as::<_, Module>(
        r#"
            INSERT INTO module_table (id, course_id, title, position)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, position = EXCLUDED.position
            WHERE module_table.course_id = EXCLUDED.course_id
            RETURNING id, course_id, title, position
        "#,
    )
    .bind(id)
    .bind(course_id)
    .bind(input.title.trim())
    .bind(input.position)
    .fetch_optional(pool)
    .await
}

pub async fn delete_module(pool:&Pool<Postgres>, course_id:Uuid, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM module_table WHERE id = $1 AND course_id = $2")
        .bind(id)
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
