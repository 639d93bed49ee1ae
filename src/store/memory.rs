use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Uuid;

use super::{duplicate_message, Store, StoreError, StoreResult};
use crate::{
    models::{
        admin::Admin,
        category::Category,
        course::{Course, CourseFields},
        dashboard::{DashboardCounts, DashboardStats, RECENT_PAYMENTS},
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

#[derive(Default)]
struct Tables {
    admins: Vec<Admin>,
    categories: Vec<Category>,
    instructors: Vec<Instructor>,
    students: Vec<Student>,
    courses: Vec<Course>,
    modules: Vec<Module>,
    lessons: Vec<Lesson>,
    resources: Vec<Resource>,
    payments: Vec<Payment>,
}

impl Tables {
    fn course_exists(&self, id: Uuid) -> bool {
        self.courses.iter().any(|c| c.id == id)
    }

    fn remove_module_cascade(&mut self, module_id: Uuid) {
        self.modules.retain(|m| m.id != module_id);
        self.lessons.retain(|l| l.module_id != module_id);
    }
}

/// In-process store with the same observable behaviour as [`super::PgStore`]:
/// unique keys, upsert ownership checks and delete cascades.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn by_position<T>(items: &mut [T], key: impl Fn(&T) -> (i32, Uuid)) {
    items.sort_by_key(|item| key(item));
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_admin(&self, admin: &CreateAdmin) -> StoreResult<Admin> {
        let mut tables = self.tables();
        if tables.admins.iter().any(|a| a.email == admin.email) {
            return Err(StoreError::Duplicate(duplicate_message("admin", Some("email"))));
        }
        let created = Admin {
            id: Uuid::new_v4(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
        };
        tables.admins.push(created.clone());
        Ok(created)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(self.tables().admins.iter().find(|a| a.email == email).cloned())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut categories = self.tables().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Category> {
        self.tables()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("category"))
    }

    async fn create_category(&self, category: &Category) -> StoreResult<Category> {
        let mut tables = self.tables();
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StoreError::Duplicate(duplicate_message("category", Some("slug"))));
        }
        tables.categories.push(category.clone());
        Ok(category.clone())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<Category> {
        let mut tables = self.tables();
        if tables
            .categories
            .iter()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Err(StoreError::Duplicate(duplicate_message("category", Some("slug"))));
        }
        let existing = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(StoreError::NotFound("category"))?;
        *existing = category.clone();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(StoreError::NotFound("category"));
        }
        for course in tables.courses.iter_mut().filter(|c| c.category_id == Some(id)) {
            course.category_id = None;
        }
        Ok(())
    }

    async fn list_instructors(&self) -> StoreResult<Vec<Instructor>> {
        let mut instructors = self.tables().instructors.clone();
        instructors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instructors)
    }

    async fn get_instructor(&self, id: Uuid) -> StoreResult<Instructor> {
        self.tables()
            .instructors
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("instructor"))
    }

    async fn create_instructor(&self, input: &InstructorInput) -> StoreResult<Instructor> {
        let mut tables = self.tables();
        let email = input.email.trim();
        if tables.instructors.iter().any(|i| i.email == email) {
            return Err(StoreError::Duplicate(duplicate_message("instructor", Some("email"))));
        }
        let created = Instructor {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: email.to_string(),
            bio: input.bio.clone(),
            avatar_url: input.avatar_url.clone(),
        };
        tables.instructors.push(created.clone());
        Ok(created)
    }

    async fn update_instructor(&self, id: Uuid, input: &InstructorInput) -> StoreResult<Instructor> {
        let mut tables = self.tables();
        let email = input.email.trim();
        if tables.instructors.iter().any(|i| i.email == email && i.id != id) {
            return Err(StoreError::Duplicate(duplicate_message("instructor", Some("email"))));
        }
        let existing = tables
            .instructors
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound("instructor"))?;
        existing.name = input.name.trim().to_string();
        existing.email = email.to_string();
        existing.bio = input.bio.clone();
        existing.avatar_url = input.avatar_url.clone();
        Ok(existing.clone())
    }

    async fn delete_instructor(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.instructors.len();
        tables.instructors.retain(|i| i.id != id);
        if tables.instructors.len() == before {
            return Err(StoreError::NotFound("instructor"));
        }
        for course in tables.courses.iter_mut().filter(|c| c.instructor_id == Some(id)) {
            course.instructor_id = None;
        }
        Ok(())
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let mut students = self.tables().students.clone();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn get_student(&self, id: Uuid) -> StoreResult<Student> {
        self.tables()
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("student"))
    }

    async fn create_student(&self, input: &StudentInput) -> StoreResult<Student> {
        let mut tables = self.tables();
        let email = input.email.trim();
        if tables.students.iter().any(|s| s.email == email) {
            return Err(StoreError::Duplicate(duplicate_message("student", Some("email"))));
        }
        let created = Student {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: email.to_string(),
            avatar_url: input.avatar_url.clone(),
        };
        tables.students.push(created.clone());
        Ok(created)
    }

    async fn update_student(&self, id: Uuid, input: &StudentInput) -> StoreResult<Student> {
        let mut tables = self.tables();
        let email = input.email.trim();
        if tables.students.iter().any(|s| s.email == email && s.id != id) {
            return Err(StoreError::Duplicate(duplicate_message("student", Some("email"))));
        }
        let existing = tables
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound("student"))?;
        existing.name = input.name.trim().to_string();
        existing.email = email.to_string();
        existing.avatar_url = input.avatar_url.clone();
        Ok(existing.clone())
    }

    async fn delete_student(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        if tables.students.len() == before {
            return Err(StoreError::NotFound("student"));
        }
        tables.payments.retain(|p| p.student_id != id);
        Ok(())
    }

    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .tables()
            .courses
            .iter()
            .filter(|c| filter.published.map_or(true, |p| c.published == p))
            .filter(|c| filter.category_id.map_or(true, |id| c.category_id == Some(id)))
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> StoreResult<Course> {
        self.tables()
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("course"))
    }

    async fn create_course(&self, fields: &CourseFields) -> StoreResult<Course> {
        let now = Utc::now();
        let created = Course {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            category_id: fields.category_id,
            price: fields.price,
            instructor_id: fields.instructor_id,
            thumbnail_url: fields.thumbnail_url.clone(),
            published: fields.published,
            created_at: now,
            updated_at: now,
        };
        self.tables().courses.push(created.clone());
        Ok(created)
    }

    async fn update_course(&self, id: Uuid, fields: &CourseFields) -> StoreResult<Course> {
        let mut tables = self.tables();
        let existing = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound("course"))?;
        existing.title = fields.title.clone();
        existing.description = fields.description.clone();
        existing.category_id = fields.category_id;
        existing.price = fields.price;
        existing.instructor_id = fields.instructor_id;
        existing.thumbnail_url = fields.thumbnail_url.clone();
        existing.published = fields.published;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        if !tables.course_exists(id) {
            return Err(StoreError::NotFound("course"));
        }
        tables.courses.retain(|c| c.id != id);
        let module_ids: Vec<Uuid> = tables
            .modules
            .iter()
            .filter(|m| m.course_id == id)
            .map(|m| m.id)
            .collect();
        for module_id in module_ids {
            tables.remove_module_cascade(module_id);
        }
        tables.resources.retain(|r| r.course_id != id);
        tables.payments.retain(|p| p.course_id != id);
        Ok(())
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        let mut modules: Vec<Module> = self
            .tables()
            .modules
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect();
        by_position(&mut modules, |m| (m.position, m.id));
        Ok(modules)
    }

    async fn get_module(&self, id: Uuid) -> StoreResult<Module> {
        self.tables()
            .modules
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("module"))
    }

    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> StoreResult<Module> {
        let mut tables = self.tables();
        let id = input.id.unwrap_or_else(Uuid::new_v4);

        if let Some(existing) = tables.modules.iter_mut().find(|m| m.id == id) {
            if existing.course_id != course_id {
                return Err(StoreError::NotFound("module"));
            }
            existing.title = input.title.trim().to_string();
            existing.position = input.position;
            return Ok(existing.clone());
        }

        if !tables.course_exists(course_id) {
            return Err(StoreError::NotFound("course"));
        }
        let created = Module {
            id,
            course_id,
            title: input.title.trim().to_string(),
            position: input.position,
        };
        tables.modules.push(created.clone());
        Ok(created)
    }

    async fn delete_module(&self, course_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        if !tables.modules.iter().any(|m| m.id == id && m.course_id == course_id) {
            return Err(StoreError::NotFound("module"));
        }
        tables.remove_module_cascade(id);
        Ok(())
    }

    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .tables()
            .lessons
            .iter()
            .filter(|l| l.module_id == module_id)
            .cloned()
            .collect();
        by_position(&mut lessons, |l| (l.position, l.id));
        Ok(lessons)
    }

    async fn upsert_lesson(&self, module_id: Uuid, input: &LessonInput) -> StoreResult<Lesson> {
        let mut tables = self.tables();
        let id = input.id.unwrap_or_else(Uuid::new_v4);

        if let Some(existing) = tables.lessons.iter_mut().find(|l| l.id == id) {
            if existing.module_id != module_id {
                return Err(StoreError::NotFound("lesson"));
            }
            existing.name = input.name.trim().to_string();
            existing.content = input.content.clone();
            existing.video_url = input.video_url.clone();
            existing.is_free_preview = input.is_free_preview;
            existing.position = input.position;
            return Ok(existing.clone());
        }

        if !tables.modules.iter().any(|m| m.id == module_id) {
            return Err(StoreError::NotFound("module"));
        }
        let created = Lesson {
            id,
            module_id,
            name: input.name.trim().to_string(),
            content: input.content.clone(),
            video_url: input.video_url.clone(),
            is_free_preview: input.is_free_preview,
            position: input.position,
        };
        tables.lessons.push(created.clone());
        Ok(created)
    }

    async fn delete_lesson(&self, module_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.lessons.len();
        tables.lessons.retain(|l| !(l.id == id && l.module_id == module_id));
        if tables.lessons.len() == before {
            return Err(StoreError::NotFound("lesson"));
        }
        Ok(())
    }

    async fn list_resources(&self, course_id: Uuid) -> StoreResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .tables()
            .resources
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect();
        by_position(&mut resources, |r| (r.position, r.id));
        Ok(resources)
    }

    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> StoreResult<Resource> {
        let mut tables = self.tables();
        let id = input.id.unwrap_or_else(Uuid::new_v4);

        if let Some(existing) = tables.resources.iter_mut().find(|r| r.id == id) {
            if existing.course_id != course_id {
                return Err(StoreError::NotFound("resource"));
            }
            existing.name = input.name.trim().to_string();
            existing.file_url = input.file_url.trim().to_string();
            existing.position = input.position;
            return Ok(existing.clone());
        }

        if !tables.course_exists(course_id) {
            return Err(StoreError::NotFound("course"));
        }
        let created = Resource {
            id,
            course_id,
            name: input.name.trim().to_string(),
            file_url: input.file_url.trim().to_string(),
            position: input.position,
        };
        tables.resources.push(created.clone());
        Ok(created)
    }

    async fn delete_resource(&self, course_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.resources.len();
        tables.resources.retain(|r| !(r.id == id && r.course_id == course_id));
        if tables.resources.len() == before {
            return Err(StoreError::NotFound("resource"));
        }
        Ok(())
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .tables()
            .payments
            .iter()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.course_id.map_or(true, |id| p.course_id == id))
            .filter(|p| filter.student_id.map_or(true, |id| p.student_id == id))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Payment> {
        self.tables()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("payment"))
    }

    async fn create_payment(&self, input: &PaymentInput) -> StoreResult<Payment> {
        let mut tables = self.tables();
        if !tables.students.iter().any(|s| s.id == input.student_id) {
            return Err(StoreError::NotFound("student"));
        }
        if !tables.course_exists(input.course_id) {
            return Err(StoreError::NotFound("course"));
        }
        let created = Payment {
            id: Uuid::new_v4(),
            student_id: input.student_id,
            course_id: input.course_id,
            amount: input.amount,
            status: input.status.unwrap_or(PaymentStatus::Pending),
            created_at: Utc::now(),
        };
        tables.payments.push(created.clone());
        Ok(created)
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Payment> {
        let mut tables = self.tables();
        let existing = tables
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("payment"))?;
        existing.status = status;
        Ok(existing.clone())
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables();
        let before = tables.payments.len();
        tables.payments.retain(|p| p.id != id);
        if tables.payments.len() == before {
            return Err(StoreError::NotFound("payment"));
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let tables = self.tables();
        let counts = DashboardCounts {
            courses: tables.courses.len() as i64,
            published_courses: tables.courses.iter().filter(|c| c.published).count() as i64,
            students: tables.students.len() as i64,
            instructors: tables.instructors.len() as i64,
            revenue: tables
                .payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Completed)
                .map(|p| i64::from(p.amount))
                .sum(),
        };
        let mut recent_payments = tables.payments.clone();
        recent_payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_payments.truncate(RECENT_PAYMENTS as usize);
        Ok(DashboardStats { counts, recent_payments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn course(store: &MemoryStore) -> Course {
        store
            .create_course(&CourseFields { title: "Async Rust".to_string(), ..Default::default() })
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn upsert_with_id_updates_in_place() {
        let store = MemoryStore::new();
        let course = course(&store).await;

        let created = store
            .upsert_module(course.id, &ModuleInput { id: None, title: "Basics".to_string(), position: 0 })
            .await
            .unwrap();
        let updated = store
            .upsert_module(course.id, &ModuleInput { id: Some(created.id), title: "Foundations".to_string(), position: 2 })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        let modules = store.list_modules(course.id).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Foundations");
        assert_eq!(modules[0].position, 2);
    }

    #[actix_web::test]
    async fn upsert_rejects_id_owned_by_other_course() {
        let store = MemoryStore::new();
        let first = course(&store).await;
        let second = course(&store).await;

        let module = store
            .upsert_module(first.id, &ModuleInput { id: None, title: "Basics".to_string(), position: 0 })
            .await
            .unwrap();
        let err = store
            .upsert_module(second.id, &ModuleInput { id: Some(module.id), title: "Hijack".to_string(), position: 0 })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound("module")));
        assert_eq!(store.list_modules(first.id).await.unwrap()[0].title, "Basics");
    }

    #[actix_web::test]
    async fn deleting_course_cascades() {
        let store = MemoryStore::new();
        let course = course(&store).await;
        let module = store
            .upsert_module(course.id, &ModuleInput { id: None, title: "Basics".to_string(), position: 0 })
            .await
            .unwrap();
        store
            .upsert_lesson(
                module.id,
                &LessonInput {
                    name: "Hello".to_string(),
                    content: "<p>Printing to the terminal.</p>".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store.delete_course(course.id).await.unwrap();

        assert!(store.list_modules(course.id).await.unwrap().is_empty());
        assert!(store.list_lessons(module.id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        let category = Category {
            id: Uuid::new_v4(),
            name: "Web".to_string(),
            slug: "web".to_string(),
            description: None,
        };
        store.create_category(&category).await.unwrap();

        let again = Category { id: Uuid::new_v4(), ..category };
        let err = store.create_category(&again).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref msg) if msg == "category with this slug already exists"));
    }
}
