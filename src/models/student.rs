use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::people::StudentInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

pub async fn list_students(pool:&Pool<Postgres>) -> Result<Vec<Student>, sqlx::Error>{
    sqlx::query_as::<_, Student>("SELECT id, name, email, avatar_url FROM student_table ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn get_student_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Student>, sqlx::Error>{
    sqlx::query_as::<_, Student>("SELECT id, name, email, avatar_url FROM student_table WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_student(pool:&Pool<Postgres>, id:Uuid, input:&StudentInput) -> Result<Student, sqlx::Error>{
    sqlx::query_as::<_, Student>(
        r#"
            INSERT INTO student_table (id, name, email, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, avatar_url
        "#,
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(&input.avatar_url)
    .fetch_one(pool)
    .await
}

pub async fn update_student(pool:&Pool<Postgres>, id:Uuid, input:&StudentInput) -> Result<Option<Student>, sqlx::Error>{
    sqlx::query_as::<_, Student>(
        r#"
            UPDATE student_table
            SET name = $2, email = $3, avatar_url = $4
            WHERE id = $1
            RETURNING id, name, email, avatar_url
        "#,
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(&input.avatar_url)
    .fetch_optional(pool)
    .await
}

pub async fn delete_student(pool:&Pool<Postgres>, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM student_table WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
