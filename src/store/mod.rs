//! Persistence boundary. Handlers and the in-process authoring client only see [`Store`];
//! [`PgStore`] backs production and [`MemoryStore`] backs tests and `STORE=memory` runs.

use async_trait::async_trait;
use sqlx::types::Uuid;

use crate::{
    models::{
        admin::Admin,
        category::Category,
        course::{Course, CourseFields},
        dashboard::DashboardStats,
        instructor::Instructor,
        lesson::Lesson,
        module::Module,
        payment::{Payment, PaymentStatus},
        resource::Resource,
        student::Student,
    },
    schema::{
        admin::CreateAdmin,
        course::{CourseFilter, LessonInput, ModuleInput, ResourceInput},
        payment::{PaymentFilter, PaymentInput},
        people::{InstructorInput, StudentInput},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_admin(&self, admin: &CreateAdmin) -> StoreResult<Admin>;
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> StoreResult<Category>;
    async fn create_category(&self, category: &Category) -> StoreResult<Category>;
    async fn update_category(&self, category: &Category) -> StoreResult<Category>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;

    async fn list_instructors(&self) -> StoreResult<Vec<Instructor>>;
    async fn get_instructor(&self, id: Uuid) -> StoreResult<Instructor>;
    async fn create_instructor(&self, input: &InstructorInput) -> StoreResult<Instructor>;
    async fn update_instructor(&self, id: Uuid, input: &InstructorInput) -> StoreResult<Instructor>;
    async fn delete_instructor(&self, id: Uuid) -> StoreResult<()>;

    async fn list_students(&self) -> StoreResult<Vec<Student>>;
    async fn get_student(&self, id: Uuid) -> StoreResult<Student>;
    async fn create_student(&self, input: &StudentInput) -> StoreResult<Student>;
    async fn update_student(&self, id: Uuid, input: &StudentInput) -> StoreResult<Student>;
    async fn delete_student(&self, id: Uuid) -> StoreResult<()>;

    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>>;
    async fn get_course(&self, id: Uuid) -> StoreResult<Course>;
    async fn create_course(&self, fields: &CourseFields) -> StoreResult<Course>;
    async fn update_course(&self, id: Uuid, fields: &CourseFields) -> StoreResult<Course>;
    /// Also removes the course's modules, lessons, resources and payments.
    async fn delete_course(&self, id: Uuid) -> StoreResult<()>;

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>>;
    async fn get_module(&self, id: Uuid) -> StoreResult<Module>;
    /// Updates the module named by `input.id`, or creates one (generating an id when absent).
    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> StoreResult<Module>;
    async fn delete_module(&self, course_id: Uuid, id: Uuid) -> StoreResult<()>;

    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>>;
    async fn upsert_lesson(&self, module_id: Uuid, input: &LessonInput) -> StoreResult<Lesson>;
    async fn delete_lesson(&self, module_id: Uuid, id: Uuid) -> StoreResult<()>;

    async fn list_resources(&self, course_id: Uuid) -> StoreResult<Vec<Resource>>;
    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> StoreResult<Resource>;
    async fn delete_resource(&self, course_id: Uuid, id: Uuid) -> StoreResult<()>;

    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>>;
    async fn get_payment(&self, id: Uuid) -> StoreResult<Payment>;
    async fn create_payment(&self, input: &PaymentInput) -> StoreResult<Payment>;
    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Payment>;
    async fn delete_payment(&self, id: Uuid) -> StoreResult<()>;

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats>;
}

/// Message used for unique violations, shared by both backends so clients see the same text.
pub(crate) fn duplicate_message(entity: &str, field: Option<&str>) -> String {
    match field {
        Some(field) => format!("{entity} with this {field} already exists"),
        None => format!("{entity} already exists"),
    }
}
