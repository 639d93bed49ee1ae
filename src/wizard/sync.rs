//! Pushes step contents to the server: sequential, best-effort upserts that
//! write server ids back into the local items.

use uuid::Uuid;
use validator::Validate;

use crate::{
    schema::{course::{LessonInput, ResourceInput}, rules::FieldErrors},
    wizard::{
        api::{ApiError, CourseApi},
        editor::{ItemList, ModuleDraft, Removal, ServerId},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing message about a save or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub saved: usize,
    pub failed: usize,
    pub notices: Vec<Notice>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(%message, "sync failure");
        self.failed += 1;
        self.notices.push(Notice::error(message));
    }

    fn summarize(&mut self, what: &str) {
        if self.saved > 0 {
            self.notices.push(Notice::success(format!("Saved {} {what}", self.saved)));
        }
    }
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Saves every module, then each of its lessons under the module's id. A
/// module whose title is blank is reported and skipped together with its
/// lessons, without a request.
pub async fn sync_curriculum<A>(api: &A, course_id: Uuid, modules: &mut ItemList<ModuleDraft>) -> SyncReport
where
    A: CourseApi + ?Sized,
{
    let mut report = SyncReport::default();

    for (i, module) in modules.iter_mut().enumerate() {
        let input = module.to_input(i);
        if let Err(errors) = input.validate() {
            report.fail(format!("Module {}: {}", i + 1, FieldErrors::from(&errors)));
            continue;
        }

        let module_id = match api.upsert_module(course_id, &input).await {
            Ok(saved) => {
                module.set_server_id(saved.id);
                report.saved += 1;
                saved.id
            }
            Err(e) => {
                report.fail(format!("Module \"{}\" was not saved: {e}", input.title));
                continue;
            }
        };

        for (j, lesson) in module.lessons.iter_mut().enumerate() {
            let payload = LessonInput { position: position(j), ..lesson.clone() };
            match api.upsert_lesson(course_id, module_id, &payload).await {
                Ok(saved) => {
                    lesson.position = payload.position;
                    lesson.set_server_id(saved.id);
                    report.saved += 1;
                }
                Err(e) => report.fail(format!("Lesson \"{}\" was not saved: {e}", payload.name.trim())),
            }
        }
    }

    report.summarize("curriculum items");
    report
}

pub async fn sync_resources<A>(api: &A, course_id: Uuid, resources: &mut ItemList<ResourceInput>) -> SyncReport
where
    A: CourseApi + ?Sized,
{
    let mut report = SyncReport::default();

    for (i, resource) in resources.iter_mut().enumerate() {
        let payload = ResourceInput { position: position(i), ..resource.clone() };
        match api.upsert_resource(course_id, &payload).await {
            Ok(saved) => {
                resource.position = payload.position;
                resource.set_server_id(saved.id);
                report.saved += 1;
            }
            Err(e) => report.fail(format!("Resource \"{}\" was not saved: {e}", payload.name.trim())),
        }
    }

    report.summarize("resources");
    report
}

fn unsaved_course() -> ApiError {
    ApiError::Rejected("the course has not been saved yet".to_string())
}

/// Removes a module, deleting the server copy first when it has one. The
/// local item stays in place if the delete fails.
pub async fn remove_module<A>(
    api: &A,
    course_id: Option<Uuid>,
    modules: &mut ItemList<ModuleDraft>,
    index: usize,
) -> Result<Option<ModuleDraft>, ApiError>
where
    A: CourseApi + ?Sized,
{
    match modules.removal(index) {
        None => return Ok(None),
        Some(Removal::LocalOnly) => {}
        Some(Removal::Remote(id)) => {
            let course_id = course_id.ok_or_else(unsaved_course)?;
            api.delete_module(course_id, id).await?;
        }
    }
    Ok(modules.remove(index))
}

pub async fn remove_lesson<A>(
    api: &A,
    course_id: Option<Uuid>,
    modules: &mut ItemList<ModuleDraft>,
    module_index: usize,
    lesson_index: usize,
) -> Result<Option<LessonInput>, ApiError>
where
    A: CourseApi + ?Sized,
{
    let Some(module) = modules.get_mut(module_index) else {
        return Ok(None);
    };
    match module.lessons.removal(lesson_index) {
        None => return Ok(None),
        Some(Removal::LocalOnly) => {}
        Some(Removal::Remote(id)) => {
            let course_id = course_id.ok_or_else(unsaved_course)?;
            let module_id = module
                .id
                .ok_or_else(|| ApiError::Rejected("the module has not been saved yet".to_string()))?;
            api.delete_lesson(course_id, module_id, id).await?;
        }
    }
    Ok(module.lessons.remove(lesson_index))
}

pub async fn remove_resource<A>(
    api: &A,
    course_id: Option<Uuid>,
    resources: &mut ItemList<ResourceInput>,
    index: usize,
) -> Result<Option<ResourceInput>, ApiError>
where
    A: CourseApi + ?Sized,
{
    match resources.removal(index) {
        None => return Ok(None),
        Some(Removal::LocalOnly) => {}
        Some(Removal::Remote(id)) => {
            let course_id = course_id.ok_or_else(unsaved_course)?;
            api.delete_resource(course_id, id).await?;
        }
    }
    Ok(resources.remove(index))
}
