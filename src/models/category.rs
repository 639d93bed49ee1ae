use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category{
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

pub async fn list_categories(pool:&Pool<Postgres>) -> Result<Vec<Category>, sqlx::Error>{
    sqlx::query_as::<_, Category>("SELECT id, name, slug, description FROM category_table ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn get_category_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Category>, sqlx::Error>{
    sqlx::query_as::<_, Category>("SELECT id, name, slug, description FROM category_table WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_category(pool:&Pool<Postgres>, category:&Category) -> Result<Category, sqlx::Error>{
    sqlx::query_as::<_, Category>(
        r#"
            INSERT INTO category_table (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, description
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .fetch_one(pool)
    .await
}

pub async fn update_category(pool:&Pool<Postgres>, category:&Category) -> Result<Option<Category>, sqlx::Error>{
    sqlx::query_as::<_, Category>(
        r#"
            UPDATE category_table
            SET name = $2, slug = $3, description = $4
            WHERE id = $1
            RETURNING id, name, slug, description
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .fetch_optional(pool)
    .await
}

pub async fn delete_category(pool:&Pool<Postgres>, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM category_table WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
