use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Uuid, Pool, Postgres};

use super::{duplicate_message, Store, StoreError, StoreResult};
use crate::{
    models::{
        admin::{self, Admin},
        category::{self, Category},
        course::{self, Course, CourseFields},
        dashboard::{self, DashboardStats},
        instructor::{self, Instructor},
        lesson::{self, Lesson},
        module::{self, Module},
        payment::{self, Payment, PaymentStatus},
        resource::{self, Resource},
        student::{self, Student},
    },
    schema::{
        admin::CreateAdmin,
        course::{CourseFilter, LessonInput, ModuleInput, ResourceInput},
        payment::{PaymentFilter, PaymentInput},
        people::{InstructorInput, StudentInput},
    },
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

/// Maps driver errors onto store errors: unique violations (23505) become
/// `Duplicate`, foreign key violations (23503) become `NotFound`.
fn classify(entity: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::RowNotFound = err {
        return StoreError::NotFound(entity);
    }

    let db_err = err.as_database_error();
    let code = db_err.and_then(|e| e.code()).map(|c| c.into_owned());
    let constraint = db_err.and_then(|e| e.constraint()).map(str::to_owned);

    match code.as_deref() {
        Some("23505") => {
            let field = constraint.as_deref().and_then(|c| {
                if c.contains("slug") {
                    Some("slug")
                } else if c.contains("email") {
                    Some("email")
                } else {
                    None
                }
            });
            StoreError::Duplicate(duplicate_message(entity, field))
        }
        Some("23503") => StoreError::NotFound("referenced record"),
        _ => StoreError::Database(err),
    }
}

fn expect_deleted(entity: &'static str, rows: u64) -> StoreResult<()> {
    if rows == 0 {
        return Err(StoreError::NotFound(entity));
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn create_admin(&self, admin_meta: &CreateAdmin) -> StoreResult<Admin> {
        admin::create_admin(&self.pool, Uuid::new_v4(), admin_meta)
            .await
            .map_err(|e| classify("admin", e))
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        admin::find_admin_by_email(&self.pool, email)
            .await
            .map_err(|e| classify("admin", e))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        category::list_categories(&self.pool)
            .await
            .map_err(|e| classify("category", e))
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Category> {
        category::get_category_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("category", e))?
            .ok_or(StoreError::NotFound("category"))
    }

    async fn create_category(&self, new_category: &Category) -> StoreResult<Category> {
        category::create_category(&self.pool, new_category)
            .await
            .map_err(|e| classify("category", e))
    }

    async fn update_category(&self, updated: &Category) -> StoreResult<Category> {
        category::update_category(&self.pool, updated)
            .await
            .map_err(|e| classify("category", e))?
            .ok_or(StoreError::NotFound("category"))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let rows = category::delete_category(&self.pool, id)
            .await
            .map_err(|e| classify("category", e))?;
        expect_deleted("category", rows)
    }

    async fn list_instructors(&self) -> StoreResult<Vec<Instructor>> {
        instructor::list_instructors(&self.pool)
            .await
            .map_err(|e| classify("instructor", e))
    }

    async fn get_instructor(&self, id: Uuid) -> StoreResult<Instructor> {
        instructor::get_instructor_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("instructor", e))?
            .ok_or(StoreError::NotFound("instructor"))
    }

    async fn create_instructor(&self, input: &InstructorInput) -> StoreResult<Instructor> {
        instructor::create_instructor(&self.pool, Uuid::new_v4(), input)
            .await
            .map_err(|e| classify("instructor", e))
    }

    async fn update_instructor(&self, id: Uuid, input: &InstructorInput) -> StoreResult<Instructor> {
        instructor::update_instructor(&self.pool, id, input)
            .await
            .map_err(|e| classify("instructor", e))?
            .ok_or(StoreError::NotFound("instructor"))
    }

    async fn delete_instructor(&self, id: Uuid) -> StoreResult<()> {
        let rows = instructor::delete_instructor(&self.pool, id)
            .await
            .map_err(|e| classify("instructor", e))?;
        expect_deleted("instructor", rows)
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        student::list_students(&self.pool)
            .await
            .map_err(|e| classify("student", e))
    }

    async fn get_student(&self, id: Uuid) -> StoreResult<Student> {
        student::get_student_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("student", e))?
            .ok_or(StoreError::NotFound("student"))
    }

    async fn create_student(&self, input: &StudentInput) -> StoreResult<Student> {
        student::create_student(&self.pool, Uuid::new_v4(), input)
            .await
            .map_err(|e| classify("student", e))
    }

    async fn update_student(&self, id: Uuid, input: &StudentInput) -> StoreResult<Student> {
        student::update_student(&self.pool, id, input)
            .await
            .map_err(|e| classify("student", e))?
            .ok_or(StoreError::NotFound("student"))
    }

    async fn delete_student(&self, id: Uuid) -> StoreResult<()> {
        let rows = student::delete_student(&self.pool, id)
            .await
            .map_err(|e| classify("student", e))?;
        expect_deleted("student", rows)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        course::list_courses(&self.pool, filter)
            .await
            .map_err(|e| classify("course", e))
    }

    async fn get_course(&self, id: Uuid) -> StoreResult<Course> {
        course::get_course_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("course", e))?
            .ok_or(StoreError::NotFound("course"))
    }

    async fn create_course(&self, fields: &CourseFields) -> StoreResult<Course> {
        course::create_course(&self.pool, Uuid::new_v4(), fields)
            .await
            .map_err(|e| classify("course", e))
    }

    async fn update_course(&self, id: Uuid, fields: &CourseFields) -> StoreResult<Course> {
        course::update_course(&self.pool, id, fields)
            .await
            .map_err(|e| classify("course", e))?
            .ok_or(StoreError::NotFound("course"))
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<()> {
        let rows = course::delete_course(&self.pool, id)
            .await
            .map_err(|e| classify("course", e))?;
        expect_deleted("course", rows)
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        module::list_modules(&self.pool, course_id)
            .await
            .map_err(|e| classify("module", e))
    }

    async fn get_module(&self, id: Uuid) -> StoreResult<Module> {
        module::get_module_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("module", e))?
            .ok_or(StoreError::NotFound("module"))
    }

    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> StoreResult<Module> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        module::upsert_module(&self.pool, course_id, id, input)
            .await
            .map_err(|e| classify("module", e))?
            .ok_or(StoreError::NotFound("module"))
    }

    async fn delete_module(&self, course_id: Uuid, id: Uuid) -> StoreResult<()> {
        let rows = module::delete_module(&self.pool, course_id, id)
            .await
            .map_err(|e| classify("module", e))?;
        expect_deleted("module", rows)
    }

    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>> {
        lesson::list_lessons(&self.pool, module_id)
            .await
            .map_err(|e| classify("lesson", e))
    }

    async fn upsert_lesson(&self, module_id: Uuid, input: &LessonInput) -> StoreResult<Lesson> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        lesson::upsert_lesson(&self.pool, module_id, id, input)
            .await
            .map_err(|e| classify("lesson", e))?
            .ok_or(StoreError::NotFound("lesson"))
    }

    async fn delete_lesson(&self, module_id: Uuid, id: Uuid) -> StoreResult<()> {
        let rows = lesson::delete_lesson(&self.pool, module_id, id)
            .await
            .map_err(|e| classify("lesson", e))?;
        expect_deleted("lesson", rows)
    }

    async fn list_resources(&self, course_id: Uuid) -> StoreResult<Vec<Resource>> {
        resource::list_resources(&self.pool, course_id)
            .await
            .map_err(|e| classify("resource", e))
    }

    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> StoreResult<Resource> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        resource::upsert_resource(&self.pool, course_id, id, input)
            .await
            .map_err(|e| classify("resource", e))?
            .ok_or(StoreError::NotFound("resource"))
    }

    async fn delete_resource(&self, course_id: Uuid, id: Uuid) -> StoreResult<()> {
        let rows = resource::delete_resource(&self.pool, course_id, id)
            .await
            .map_err(|e| classify("resource", e))?;
        expect_deleted("resource", rows)
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        payment::list_payments(&self.pool, filter)
            .await
            .map_err(|e| classify("payment", e))
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Payment> {
        payment::get_payment_by_id(&self.pool, id)
            .await
            .map_err(|e| classify("payment", e))?
            .ok_or(StoreError::NotFound("payment"))
    }

    async fn create_payment(&self, input: &PaymentInput) -> StoreResult<Payment> {
        let status = input.status.unwrap_or(PaymentStatus::Pending);
        payment::create_payment(&self.pool, Uuid::new_v4(), input.student_id, input.course_id, input.amount, status)
            .await
            .map_err(|e| classify("payment", e))
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Payment> {
        payment::update_payment_status(&self.pool, id, status)
            .await
            .map_err(|e| classify("payment", e))?
            .ok_or(StoreError::NotFound("payment"))
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        let rows = payment::delete_payment(&self.pool, id)
            .await
            .map_err(|e| classify("payment", e))?;
        expect_deleted("payment", rows)
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        dashboard::fetch_dashboard_stats(&self.pool)
            .await
            .map_err(|e| classify("dashboard", e))
    }
}

/// These run against the database in `DATABASE_URL` and are skipped when it is unset.
/// Every record is keyed by fresh uuids so runs can share one database.
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> Option<PgStore> {
        dotenv::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL is not set, skipping Postgres store test");
            return None;
        };
        let store = PgStore::connect(&url, 2).await.expect("connect to DATABASE_URL");
        store.migrate().await.expect("run migrations");
        Some(store)
    }

    async fn course(store: &PgStore, title: &str) -> Course {
        let fields = CourseFields { title: title.to_string(), ..Default::default() };
        store.create_course(&fields).await.unwrap()
    }

    fn lesson(id: Option<Uuid>, name: &str) -> LessonInput {
        LessonInput {
            id,
            name: name.to_string(),
            content: "<p>Lifetimes tie borrows to their owners.</p>".to_string(),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn upsert_with_id_updates_the_row() {
        let Some(store) = test_store().await else { return };
        let course = course(&store, "Upserts").await;

        let created = store
            .upsert_module(course.id, &ModuleInput { id: None, title: "Basics".into(), position: 0 })
            .await
            .unwrap();
        let updated = store
            .upsert_module(course.id, &ModuleInput { id: Some(created.id), title: "Fundamentals".into(), position: 3 })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);

        let modules = store.list_modules(course.id).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Fundamentals");
        assert_eq!(modules[0].position, 3);

        let first = store.upsert_lesson(created.id, &lesson(None, "Ownership")).await.unwrap();
        store.upsert_lesson(created.id, &lesson(Some(first.id), "Ownership and moves")).await.unwrap();
        let lessons = store.list_lessons(created.id).await.unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].name, "Ownership and moves");

        store.delete_course(course.id).await.unwrap();
    }

    #[actix_web::test]
    async fn id_owned_by_another_parent_is_not_found() {
        let Some(store) = test_store().await else { return };
        let owner = course(&store, "Owner").await;
        let other = course(&store, "Other").await;

        let module = store
            .upsert_module(owner.id, &ModuleInput { id: None, title: "Mine".into(), position: 0 })
            .await
            .unwrap();
        let err = store
            .upsert_module(other.id, &ModuleInput { id: Some(module.id), title: "Taken".into(), position: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("module")), "{err:?}");
        assert_eq!(store.get_module(module.id).await.unwrap().title, "Mine");

        let err = store
            .upsert_module(Uuid::new_v4(), &ModuleInput { id: None, title: "Orphan".into(), position: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "{err:?}");

        store.delete_course(owner.id).await.unwrap();
        store.delete_course(other.id).await.unwrap();
    }

    #[actix_web::test]
    async fn duplicate_slug_is_reported() {
        let Some(store) = test_store().await else { return };
        let slug = format!("systems-{}", Uuid::new_v4());
        let first = Category { id: Uuid::new_v4(), name: "Systems".into(), slug: slug.clone(), description: None };
        store.create_category(&first).await.unwrap();

        let second = Category { id: Uuid::new_v4(), name: "Systems again".into(), slug, description: None };
        match store.create_category(&second).await {
            Err(StoreError::Duplicate(message)) => assert_eq!(message, "category with this slug already exists"),
            other => panic!("expected a duplicate error, got {other:?}"),
        }

        store.delete_category(first.id).await.unwrap();
    }

    #[actix_web::test]
    async fn deleting_a_course_cascades() {
        let Some(store) = test_store().await else { return };
        let course = course(&store, "Cascade").await;
        let module = store
            .upsert_module(course.id, &ModuleInput { id: None, title: "Basics".into(), position: 0 })
            .await
            .unwrap();
        let lesson = store.upsert_lesson(module.id, &lesson(None, "Ownership")).await.unwrap();
        store
            .upsert_resource(
                course.id,
                &ResourceInput { id: None, name: "Slides".into(), file_url: "https://cdn.example.com/s.pdf".into(), position: 0 },
            )
            .await
            .unwrap();

        store.delete_course(course.id).await.unwrap();

        assert!(matches!(store.get_course(course.id).await, Err(StoreError::NotFound("course"))));
        assert!(matches!(store.get_module(module.id).await, Err(StoreError::NotFound("module"))));
        assert!(store.list_lessons(module.id).await.unwrap().iter().all(|l| l.id != lesson.id));
        assert!(store.list_resources(course.id).await.unwrap().is_empty());
        assert!(store
            .list_courses(&CourseFilter::default())
            .await
            .unwrap()
            .iter()
            .all(|c| c.id != course.id));
    }

    #[actix_web::test]
    async fn payment_status_round_trips() {
        let Some(store) = test_store().await else { return };
        let course = course(&store, "Payments").await;
        let student = store
            .create_student(&StudentInput {
                name: "Ada".into(),
                email: format!("ada-{}@example.com", Uuid::new_v4()),
                avatar_url: None,
            })
            .await
            .unwrap();

        let payment = store
            .create_payment(&PaymentInput { student_id: student.id, course_id: course.id, amount: 4900, status: None })
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let refunded = store.update_payment_status(payment.id, PaymentStatus::Refunded).await.unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert_eq!(store.get_payment(payment.id).await.unwrap().status, PaymentStatus::Refunded);

        store.delete_course(course.id).await.unwrap();
        assert!(matches!(store.get_payment(payment.id).await, Err(StoreError::NotFound("payment"))));
        store.delete_student(student.id).await.unwrap();
    }
}
