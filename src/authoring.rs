//! Course-authoring operations behind the `/api/courses` routes. Kept apart from the
//! handlers so the in-process wizard client runs exactly the same rules.

use sqlx::types::Uuid;
use validator::Validate;

use crate::{
    errors::AppError,
    models::{
        course::{Course, CourseFields},
        lesson::Lesson,
        module::Module,
        resource::Resource,
    },
    schema::course::{
        CourseDetails, CourseOutline, CoursePatch, CreateCourse, LessonInput, ModuleInput,
        ModuleWithLessons, ResourceInput,
    },
    store::Store,
};

async fn ensure_references(store: &dyn Store, category_id: Option<Uuid>, instructor_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(id) = category_id {
        store.get_category(id).await?;
    }
    if let Some(id) = instructor_id {
        store.get_instructor(id).await?;
    }
    Ok(())
}

fn ensure_publishable(fields: &CourseFields) -> Result<(), AppError> {
    if !fields.published {
        return Ok(());
    }
    let missing = fields.missing_for_publish();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "course cannot be published without: {}",
        missing.join(", ")
    )))
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn create_course(store: &dyn Store, input: &CreateCourse) -> Result<Course, AppError> {
    input.validate()?;
    ensure_references(store, input.category_id, input.instructor_id).await?;

    let fields = CourseFields {
        title: input.title.trim().to_string(),
        description: trimmed(input.description.as_ref()),
        category_id: input.category_id,
        price: input.price,
        instructor_id: input.instructor_id,
        thumbnail_url: trimmed(input.thumbnail_url.as_ref()),
        published: false,
    };

    let course = store.create_course(&fields).await?;
    tracing::info!(course_id = %course.id, "course created");
    Ok(course)
}

/// Replaces the editable details of a course, keeping its published flag.
pub async fn replace_course(store: &dyn Store, id: Uuid, details: &CourseDetails) -> Result<Course, AppError> {
    details.validate()?;
    let existing = store.get_course(id).await?;
    ensure_references(store, details.category_id, details.instructor_id).await?;

    let fields = CourseFields {
        title: details.title.trim().to_string(),
        description: trimmed(Some(&details.description)),
        category_id: details.category_id,
        price: details.price,
        instructor_id: details.instructor_id,
        thumbnail_url: trimmed(details.thumbnail_url.as_ref()),
        published: existing.published,
    };
    ensure_publishable(&fields)?;

    Ok(store.update_course(id, &fields).await?)
}

/// Applies the fields present in `patch`; publishing checks the merged record.
pub async fn patch_course(store: &dyn Store, id: Uuid, patch: &CoursePatch) -> Result<Course, AppError> {
    patch.validate()?;
    let existing = store.get_course(id).await?;
    ensure_references(store, patch.category_id, patch.instructor_id).await?;

    let mut fields = CourseFields::from(&existing);
    if let Some(title) = &patch.title {
        fields.title = title.trim().to_string();
    }
    if patch.description.is_some() {
        fields.description = trimmed(patch.description.as_ref());
    }
    if patch.category_id.is_some() {
        fields.category_id = patch.category_id;
    }
    if patch.price.is_some() {
        fields.price = patch.price;
    }
    if patch.instructor_id.is_some() {
        fields.instructor_id = patch.instructor_id;
    }
    if patch.thumbnail_url.is_some() {
        fields.thumbnail_url = trimmed(patch.thumbnail_url.as_ref());
    }
    if let Some(published) = patch.published {
        fields.published = published;
    }
    ensure_publishable(&fields)?;

    let course = store.update_course(id, &fields).await?;
    if course.published != existing.published {
        tracing::info!(course_id = %id, published = course.published, "course publish state changed");
    }
    Ok(course)
}

pub async fn course_outline(store: &dyn Store, id: Uuid) -> Result<CourseOutline, AppError> {
    let course = store.get_course(id).await?;

    let mut modules = Vec::new();
    for module in store.list_modules(id).await? {
        let lessons = store.list_lessons(module.id).await?;
        modules.push(ModuleWithLessons { module, lessons });
    }
    let resources = store.list_resources(id).await?;

    Ok(CourseOutline { course, modules, resources })
}

async fn module_in_course(store: &dyn Store, course_id: Uuid, module_id: Uuid) -> Result<Module, AppError> {
    let module = store.get_module(module_id).await?;
    if module.course_id != course_id {
        return Err(AppError::NotFound("module"));
    }
    Ok(module)
}

pub async fn upsert_module(store: &dyn Store, course_id: Uuid, input: &ModuleInput) -> Result<Module, AppError> {
    input.validate()?;
    store.get_course(course_id).await?;
    let module = store.upsert_module(course_id, input).await?;
    tracing::debug!(course_id = %course_id, module_id = %module.id, created = input.id.is_none(), "module saved");
    Ok(module)
}

pub async fn delete_module(store: &dyn Store, course_id: Uuid, module_id: Uuid) -> Result<(), AppError> {
    store.delete_module(course_id, module_id).await?;
    tracing::debug!(course_id = %course_id, module_id = %module_id, "module deleted");
    Ok(())
}

pub async fn upsert_lesson(store: &dyn Store, course_id: Uuid, module_id: Uuid, input: &LessonInput) -> Result<Lesson, AppError> {
    input.validate()?;
    module_in_course(store, course_id, module_id).await?;
    let lesson = store.upsert_lesson(module_id, input).await?;
    tracing::debug!(module_id = %module_id, lesson_id = %lesson.id, created = input.id.is_none(), "lesson saved");
    Ok(lesson)
}

pub async fn delete_lesson(store: &dyn Store, course_id: Uuid, module_id: Uuid, lesson_id: Uuid) -> Result<(), AppError> {
    module_in_course(store, course_id, module_id).await?;
    store.delete_lesson(module_id, lesson_id).await?;
    Ok(())
}

pub async fn upsert_resource(store: &dyn Store, course_id: Uuid, input: &ResourceInput) -> Result<Resource, AppError> {
    input.validate()?;
    store.get_course(course_id).await?;
    Ok(store.upsert_resource(course_id, input).await?)
}

pub async fn delete_resource(store: &dyn Store, course_id: Uuid, resource_id: Uuid) -> Result<(), AppError> {
    store.delete_resource(course_id, resource_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::category::Category, schema::people::InstructorInput, store::MemoryStore};

    async fn references(store: &MemoryStore) -> (Uuid, Uuid) {
        let category = store
            .create_category(&Category {
                id: Uuid::new_v4(),
                name: "Systems".to_string(),
                slug: "systems".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let instructor = store
            .create_instructor(&InstructorInput {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                bio: None,
                avatar_url: None,
            })
            .await
            .unwrap();
        (category.id, instructor.id)
    }

    #[actix_web::test]
    async fn publishing_requires_complete_course() {
        let store = MemoryStore::new();
        let course = create_course(&store, &CreateCourse { title: "Embedded Rust".to_string(), ..Default::default() })
            .await
            .unwrap();

        let err = patch_course(&store, course.id, &CoursePatch { published: Some(true), ..Default::default() })
            .await
            .unwrap_err();
        match err {
            AppError::Validation(message) => {
                assert_eq!(message, "course cannot be published without: description, category, price, instructor")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let (category_id, instructor_id) = references(&store).await;
        let published = patch_course(
            &store,
            course.id,
            &CoursePatch {
                description: Some("Blinking LEDs without a runtime.".to_string()),
                category_id: Some(category_id),
                price: Some(2500),
                instructor_id: Some(instructor_id),
                published: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(published.published);
    }

    #[actix_web::test]
    async fn unknown_references_are_not_found() {
        let store = MemoryStore::new();
        let err = create_course(
            &store,
            &CreateCourse { title: "Networking".to_string(), category_id: Some(Uuid::new_v4()), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("category")));
    }

    #[actix_web::test]
    async fn lesson_module_must_belong_to_course() {
        let store = MemoryStore::new();
        let first = create_course(&store, &CreateCourse { title: "First".to_string(), ..Default::default() }).await.unwrap();
        let second = create_course(&store, &CreateCourse { title: "Second".to_string(), ..Default::default() }).await.unwrap();
        let module = upsert_module(&store, first.id, &ModuleInput { title: "Setup".to_string(), ..Default::default() })
            .await
            .unwrap();

        let lesson = LessonInput {
            name: "Install".to_string(),
            content: "<p>Install the toolchain with rustup.</p>".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            upsert_lesson(&store, second.id, module.id, &lesson).await,
            Err(AppError::NotFound("module"))
        ));
        assert!(upsert_lesson(&store, first.id, module.id, &lesson).await.is_ok());
    }

    #[actix_web::test]
    async fn outline_orders_curriculum() {
        let store = MemoryStore::new();
        let course = create_course(&store, &CreateCourse { title: "Ordering".to_string(), ..Default::default() }).await.unwrap();
        let later = upsert_module(&store, course.id, &ModuleInput { title: "Later".to_string(), position: 1, ..Default::default() })
            .await
            .unwrap();
        let sooner = upsert_module(&store, course.id, &ModuleInput { title: "Sooner".to_string(), position: 0, ..Default::default() })
            .await
            .unwrap();

        let outline = course_outline(&store, course.id).await.unwrap();
        let ids: Vec<Uuid> = outline.modules.iter().map(|m| m.module.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }
}
