use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::course::CourseFilter;

const COURSE_COLUMNS: &str = "id, title, description, category_id, price, instructor_id, thumbnail_url, published, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course{
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<i32>,
    pub instructor_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every writable column of a course. Creates and updates both write the full set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFields{
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<i32>,
    pub instructor_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
}

impl CourseFields {
    /// Fields that must be present before the course may be published.
    pub fn missing_for_publish(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            missing.push("description");
        }
        if self.category_id.is_none() {
            missing.push("category");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.instructor_id.is_none() {
            missing.push("instructor");
        }
        missing
    }
}

impl From<&Course> for CourseFields {
    fn from(course: &Course) -> Self {
        CourseFields {
            title: course.title.clone(),
            description: course.description.clone(),
            category_id: course.category_id,
            price: course.price,
            instructor_id: course.instructor_id,
            thumbnail_url: course.thumbnail_url.clone(),
            published: course.published,
        }
    }
}

pub async fn create_course(pool:&Pool<Postgres>, id:Uuid, fields:&CourseFields) -> Result<Course, sqlx::Error>{
    let query = format!(
        "INSERT INTO course_table (id, title, description, category_id, price, instructor_id, thumbnail_url, published) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {COURSE_COLUMNS}"
    );
    sqlx::query_as::<_, Course>(&query)
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.instructor_id)
        .bind(&fields.thumbnail_url)
        .bind(fields.published)
        .fetch_one(pool)
        .await
}

pub async fn get_course_by_id(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Course>, sqlx::Error>{
    let query = format!("SELECT {COURSE_COLUMNS} FROM course_table WHERE id = $1");
    sqlx::query_as::<_, Course>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_course(pool:&Pool<Postgres>, id:Uuid, fields:&CourseFields) -> Result<Option<Course>, sqlx::Error>{
    let query = format!(
        "UPDATE course_table \
         SET title = $2, description = $3, category_id = $4, price = $5, instructor_id = $6, \
             thumbnail_url = $7, published = $8, updated_at = now() \
         WHERE id = $1 \
         RETURNING {COURSE_COLUMNS}"
    );
    sqlx::query_as::<_, Course>(&query)
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.instructor_id)
        .bind(&fields.thumbnail_url)
        .bind(fields.published)
        .fetch_optional(pool)
        .await
}

pub async fn list_courses(pool:&Pool<Postgres>, filter:&CourseFilter) -> Result<Vec<Course>, sqlx::Error>{
    let query = format!(
        "SELECT {COURSE_COLUMNS} FROM course_table \
         WHERE ($1::BOOLEAN IS NULL OR published = $1) \
           AND ($2::UUID IS NULL OR category_id = $2) \
         ORDER BY created_at DESC"
    );
    sqlx::query_as::<_, Course>(&query)
        .bind(filter.published)
        .bind(filter.category_id)
        .fetch_all(pool)
        .await
}

pub async fn delete_course(pool:&Pool<Postgres>, id:Uuid) -> Result<u64, sqlx::Error>{
    let result = sqlx::query("DELETE FROM course_table WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_needs_every_required_field() {
        let fields = CourseFields { title: "Intro".to_string(), ..Default::default() };
        assert_eq!(
            fields.missing_for_publish(),
            vec!["description", "category", "price", "instructor"]
        );

        let complete = CourseFields {
            title: "Intro".to_string(),
            description: Some("A short tour of the language.".to_string()),
            category_id: Some(Uuid::new_v4()),
            price: Some(0),
            instructor_id: Some(Uuid::new_v4()),
            thumbnail_url: None,
            published: false,
        };
        assert!(complete.missing_for_publish().is_empty());
    }
}
