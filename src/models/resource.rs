use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::course::ResourceInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resource{
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub file_url: String,
    pub position: i32,
}

pub async fn list_resources(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<Resource>, sqlx::Error>{
    sqlx::query_as::<_, Resource>(
        r#"
            SELECT id, course_id, name, file_url, position FROM resource_table
            WHERE course_id = $1
            ORDER BY position, id
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub async fn upsert_resource(pool:&Pool<Postgres>, course_id:Uuid, id:Uuid, input:&ResourceInput) -> Result<Option<Resource>, sqlx::Error>{
    sqlx::query_as::<_, Resource>(
        r#"
            INSERT INTO resource_table (id, course_id, name, file_url, position)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, file_url = EXCLUDED.file_url, position = EXCLUDED.position
            WHERE resource_table.course_id = EXCLUDED.course_id
            RETURNING id, course_id, name, file_url, position
        "#,
    )
    .bind(id)
    .bind(course_id)
    .bind(input.name.trim())
    .bind(input.file_url.trim())
    .bind(input.position)
    .fetch_optional(pool)
    .await
}

pub async fn delete_resource(pool:&Pool<Postgres>, course_id:Uuid, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM resource_table WHERE id = $1 AND course_id = $2")
        .bind(id)
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
