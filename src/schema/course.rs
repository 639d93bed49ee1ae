use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{models::{course::Course, lesson::Lesson, module::Module, resource::Resource}, schema::rules::{lesson_content, not_blank}};

/// Course details as edited in the first wizard step and replaced by `PUT /api/courses/{id}`.
/// Every field a published course needs is mandatory here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CourseDetails {
    #[validate(length(min = 3, max = 120), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 10, max = 5000))]
    pub description: String,
    #[validate(required)]
    pub category_id: Option<Uuid>,
    #[validate(required, range(min = 0))]
    pub price: Option<i32>,
    #[validate(required)]
    pub instructor_id: Option<Uuid>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

/// Body of `POST /api/courses`. Only the title is required; a course created this
/// way stays unpublished until the rest is filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 3, max = 120), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 10, max = 5000))]
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub price: Option<i32>,
    pub instructor_id: Option<Uuid>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

impl From<&CourseDetails> for CreateCourse {
    fn from(details: &CourseDetails) -> Self {
        CreateCourse {
            title: details.title.clone(),
            description: Some(details.description.clone()),
            category_id: details.category_id,
            price: details.price,
            instructor_id: details.instructor_id,
            thumbnail_url: details.thumbnail_url.clone(),
        }
    }
}

/// Body of `PATCH /api/courses/{id}`; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CoursePatch {
    #[validate(length(min = 3, max = 120), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 5000))]
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub price: Option<i32>,
    pub instructor_id: Option<Uuid>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseFilter {
    pub published: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// A module upsert. Without an id the server creates the module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModuleInput {
    pub id: Option<Uuid>,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct LessonInput {
    pub id: Option<Uuid>,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "lesson_content"))]
    pub content: String,
    #[validate(url)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_free_preview: bool,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ResourceInput {
    pub id: Option<Uuid>,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(url)]
    pub file_url: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

/// A course with its ordered curriculum and resources, as returned by `GET /api/courses/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithLessons>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}
