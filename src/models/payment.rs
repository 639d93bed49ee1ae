use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::payment::PaymentFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[display("pending")]
    Pending,
    #[display("completed")]
    Completed,
    #[display("failed")]
    Failed,
    #[display("refunded")]
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment{
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub amount: i32,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

pub async fn list_payments(pool:&Pool<Postgres>, filter:&PaymentFilter) -> Result<Vec<Payment>, sqlx::Error>{
    sqlx::query_as::<_, Payment>(
        r#"
            SELECT id, student_id, course_id, amount, status, created_at
            FROM payment_table
            WHERE ($1::payment_status IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR course_id = $2)
              AND ($3::UUID IS NULL OR student_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.status)
    .bind(filter.course_id)
    .bind(filter.student_id)
    .bind(filter.limit())
    .bind(filter.offset())
    .fetch_all(pool)
    .await
}

pub async fn get_payment_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Payment>, sqlx::Error>{
    sqlx::query_as::<_, Payment>(
        "SELECT id, student_id, course_id, amount, status, created_at FROM payment_table WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_payment(pool:&Pool<Postgres>, id:Uuid, student_id:Uuid, course_id:Uuid, amount:i32, status:PaymentStatus) -> Result<Payment, sqlx::Error>{
    sqlx::query_as::<_, Payment>(
        r#"
            INSERT INTO payment_table (id, student_id, course_id, amount, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, course_id, amount, status, created_at
        "#,
    )
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(amount)
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn update_payment_status(pool:&Pool<Postgres>, id:Uuid, status:PaymentStatus) -> Result<Option<Payment>, sqlx::Error>{
    sqlx::query_as::<_, Payment>(
        r#"
            UPDATE payment_table SET status = $2
            WHERE id = $1
            RETURNING id, student_id, course_id, amount, status, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}

pub async fn delete_payment(pool:&Pool<Postgres>, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM payment_table WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
