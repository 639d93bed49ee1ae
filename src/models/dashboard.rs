use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Postgres};

use crate::models::payment::{Payment, PaymentStatus};

pub const RECENT_PAYMENTS: i64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DashboardCounts{
    pub courses: i64,
    pub published_courses: i64,
    pub students: i64,
    pub instructors: i64,
    /// Sum of completed payments, in cents.
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats{
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub recent_payments: Vec<Payment>,
}

pub async fn fetch_dashboard_stats(pool:&Pool<Postgres>) -> Result<DashboardStats, sqlx::Error>{
    let counts = sqlx::query_as::<_, DashboardCounts>(
        r#"
            SELECT
                (SELECT COUNT(*) FROM course_table) AS courses,
                (SELECT COUNT(*) FROM course_table WHERE published) AS published_courses,
                (SELECT COUNT(*) FROM student_table) AS students,
                (SELECT COUNT(*) FROM instructor_table) AS instructors,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payment_table WHERE status = $1) AS revenue
        "#,
    )
    .bind(PaymentStatus::Completed)
    .fetch_one(pool)
    .await?;

    let recent_payments = sqlx::query_as::<_, Payment>(
        r#"
            SELECT id, student_id, course_id, amount, status, created_at
            FROM payment_table
            ORDER BY created_at DESC
            LIMIT $1
        "#,
    )
    .bind(RECENT_PAYMENTS)
    .fetch_all(pool)
    .await?;

    Ok(DashboardStats { counts, recent_payments })
}
