use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::people::InstructorInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Instructor{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn list_instructors(pool:&Pool<Postgres>) -> Result<Vec<Instructor>, sqlx::Error>{
    sqlx::query_as::<_, Instructor>("SELECT id, name, email, bio, avatar_url FROM instructor_table ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn get_instructor_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Instructor>, sqlx::Error>{
    sqlx::query_as::<_, Instructor>("SELECT id, name, email, bio, avatar_url FROM instructor_table WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_instructor(pool:&Pool<Postgres>, id:Uuid, input:&InstructorInput) -> Result<Instructor, sqlx::Error>{
    sqlx::query_as::<_, Instructor>(
        r#"
            INSERT INTO instructor_table (id, name, email, bio, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, bio, avatar_url
        "#,
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(&input.bio)
    .bind(&input.avatar_url)
    .fetch_one(pool)
    .await
}

pub async fn update_instructor(pool:&Pool<Postgres>, id:Uuid, input:&InstructorInput) -> Result<Option<Instructor>, sqlx::Error>{
    sqlx::query_as::<_, Instructor>(
        r#"
            UPDATE instructor_table
            SET name = $2, email = $3, bio = $4, avatar_url = $5
            WHERE id = $1
            RETURNING id, name, email, bio, avatar_url
        "#,
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(&input.bio)
    .bind(&input.avatar_url)
    .fetch_optional(pool)
    .await
}

pub async fn delete_instructor(pool:&Pool<Postgres>, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM instructor_table WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
