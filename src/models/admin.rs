use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::admin::CreateAdmin;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// `admin_meta.password` must already be hashed.
pub async fn create_admin(pool:&Pool<Postgres>, id:Uuid, admin_meta:&CreateAdmin) -> Result<Admin, sqlx::Error>{
    sqlx::query_as::<_, Admin>(
        r#"
            INSERT INTO admin_table (id, name, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password
        "#,
    )
    .bind(id)
    .bind(&admin_meta.name)
    .bind(&admin_meta.email)
    .bind(&admin_meta.password)
    .fetch_one(pool)
    .await
}

pub async fn find_admin_by_email(pool:&Pool<Postgres>, email:&str) -> Result<Option<Admin>, sqlx::Error>{
    sqlx::query_as::<_, Admin>(
        r#"
            SELECT id, name, email, password FROM admin_table
            WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}
