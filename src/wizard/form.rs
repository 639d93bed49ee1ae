//! Per-step form state: current values, flattened validation errors and the
//! pending-draft debounce.

use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::{
    schema::{
        course::{CourseDetails, LessonInput, ResourceInput},
        rules::FieldErrors,
    },
    wizard::{
        draft::Debounce,
        editor::{ItemList, ModuleDraft},
    },
};

/// A step's values: how they validate and how they look once cleaned for a draft.
pub trait StepSchema: Clone + Serialize + DeserializeOwned {
    fn check(&self) -> FieldErrors;

    /// Strings trimmed, empty optionals cleared. Serializing the result leaves
    /// out view-only state.
    fn sanitized(&self) -> Self;
}

fn clean(value: &str) -> String {
    value.trim().to_string()
}

fn clean_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl StepSchema for CourseDetails {
    fn check(&self) -> FieldErrors {
        FieldErrors::check(self.validate())
    }

    fn sanitized(&self) -> Self {
        CourseDetails {
            title: clean(&self.title),
            description: clean(&self.description),
            thumbnail_url: clean_opt(&self.thumbnail_url),
            ..self.clone()
        }
    }
}

fn sanitize_lesson(lesson: &LessonInput) -> LessonInput {
    LessonInput {
        name: clean(&lesson.name),
        content: clean(&lesson.content),
        video_url: clean_opt(&lesson.video_url),
        ..lesson.clone()
    }
}

fn sanitize_resource(resource: &ResourceInput) -> ResourceInput {
    ResourceInput {
        name: clean(&resource.name),
        file_url: clean(&resource.file_url),
        ..resource.clone()
    }
}

/// Second step: modules, each with its lessons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumForm {
    pub modules: ItemList<ModuleDraft>,
}

impl StepSchema for CurriculumForm {
    fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.modules.is_empty() {
            errors.add("modules", "add at least one module");
        }

        for (i, module) in self.modules.iter().enumerate() {
            let prefix = format!("modules[{i}]");
            errors.merge_prefixed(&prefix, FieldErrors::check(module.to_input(i).validate()));
            for (j, lesson) in module.lessons.iter().enumerate() {
                errors.merge_prefixed(&format!("{prefix}.lessons[{j}]"), FieldErrors::check(lesson.validate()));
            }
        }
        errors
    }

    fn sanitized(&self) -> Self {
        let modules: Vec<ModuleDraft> = self
            .modules
            .iter()
            .map(|module| {
                let mut draft = ModuleDraft::titled(clean(&module.title));
                draft.id = module.id;
                draft.lessons = module.lessons.iter().map(sanitize_lesson).collect::<Vec<_>>().into();
                draft
            })
            .collect();
        CurriculumForm { modules: modules.into() }
    }
}

/// Third step: downloadable resources. An empty list is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcesForm {
    pub resources: ItemList<ResourceInput>,
}

impl StepSchema for ResourcesForm {
    fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (i, resource) in self.resources.iter().enumerate() {
            errors.merge_prefixed(&format!("resources[{i}]"), FieldErrors::check(resource.validate()));
        }
        errors
    }

    fn sanitized(&self) -> Self {
        let resources: Vec<ResourceInput> = self.resources.iter().map(sanitize_resource).collect();
        ResourcesForm { resources: resources.into() }
    }
}

#[derive(Debug, Clone)]
pub struct StepForm<T> {
    values: T,
    errors: FieldErrors,
    draft: Debounce,
}

impl<T: StepSchema> StepForm<T> {
    /// Validates immediately, so a freshly mounted step already knows whether it can proceed.
    pub fn new(values: T, debounce: Duration) -> Self {
        let errors = values.check();
        StepForm { values, errors, draft: Debounce::new(debounce) }
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn can_proceed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Applies a user edit, revalidates and restarts the draft window.
    pub fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.values);
        self.errors = self.values.check();
        self.draft.touch(now);
        out
    }

    /// Swaps in hydrated values without scheduling a draft write.
    pub fn replace(&mut self, values: T) {
        self.values = values;
        self.errors = self.values.check();
    }

    /// Mutable access for writing server ids back; call `revalidate` afterwards.
    pub(crate) fn values_mut(&mut self) -> &mut T {
        &mut self.values
    }

    pub(crate) fn revalidate(&mut self) {
        self.errors = self.values.check();
    }

    pub fn has_pending_draft(&self) -> bool {
        self.draft.is_pending()
    }

    /// Sanitized values when the debounce window has elapsed.
    pub fn due_draft(&mut self, now: Instant) -> Option<T> {
        self.draft.fire(now).then(|| self.values.sanitized())
    }

    /// Drops a scheduled draft write without producing it.
    pub fn discard_pending(&mut self) {
        self.draft.cancel();
    }

    /// Sanitized values regardless of the window, cancelling any pending write.
    pub fn draft_now(&mut self) -> T {
        self.draft.cancel();
        self.values.sanitized()
    }
}
