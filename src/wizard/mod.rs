//! Client-side course authoring: a three-step wizard over step forms, local
//! drafts and the course API.

pub mod api;
pub mod draft;
pub mod editor;
pub mod form;
pub mod sync;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{course::CourseDetails, rules::FieldErrors};

use self::{
    api::CourseApi,
    draft::{DraftStore, DEFAULT_DEBOUNCE},
    form::{CurriculumForm, ResourcesForm, StepForm, StepSchema},
    sync::{Notice, SyncReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
pub enum WizardStep {
    #[display("1")]
    Details,
    #[display("2")]
    Curriculum,
    #[display("3")]
    Resources,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::Details, WizardStep::Curriculum, WizardStep::Resources];

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => Some(WizardStep::Curriculum),
            WizardStep::Curriculum => Some(WizardStep::Resources),
            WizardStep::Resources => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => None,
            WizardStep::Curriculum => Some(WizardStep::Details),
            WizardStep::Resources => Some(WizardStep::Curriculum),
        }
    }

    /// Draft key of this step's values, e.g. `course-wizard:2`.
    pub fn draft_key(self) -> String {
        draft::draft_key(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WizardOptions {
    pub debounce: Duration,
    /// Publish the course when the last step is submitted.
    pub publish_on_finish: bool,
}

impl Default for WizardOptions {
    fn default() -> Self {
        WizardOptions { debounce: DEFAULT_DEBOUNCE, publish_on_finish: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step is invalid; nothing was sent.
    Blocked(FieldErrors),
    /// Something was not saved; the step is unchanged and notices say what.
    Failed,
    Advanced(WizardStep),
    Completed(Uuid),
}

/// Which course is being authored and where the author left off.
#[derive(Debug, Serialize, Deserialize)]
struct Session {
    course_id: Option<Uuid>,
    step: WizardStep,
}

fn session_key() -> String {
    draft::draft_key("session")
}

pub struct CourseWizard<A, D> {
    api: A,
    drafts: D,
    options: WizardOptions,
    step: WizardStep,
    course_id: Option<Uuid>,
    details: StepForm<CourseDetails>,
    curriculum: StepForm<CurriculumForm>,
    resources: StepForm<ResourcesForm>,
    notices: Vec<Notice>,
}

impl<A: CourseApi, D: DraftStore> CourseWizard<A, D> {
    /// Mounts the wizard. Stored drafts replace the empty defaults.
    pub fn new(api: A, drafts: D, options: WizardOptions) -> Self {
        let mut wizard = CourseWizard {
            api,
            drafts,
            options,
            step: WizardStep::Details,
            course_id: None,
            details: StepForm::new(CourseDetails::default(), options.debounce),
            curriculum: StepForm::new(CurriculumForm::default(), options.debounce),
            resources: StepForm::new(ResourcesForm::default(), options.debounce),
            notices: Vec::new(),
        };
        wizard.hydrate();
        wizard
    }

    fn hydrate(&mut self) {
        if let Some(session) = draft::load::<Session>(&self.drafts, &session_key()) {
            self.course_id = session.course_id;
            self.step = session.step;
        }
        if let Some(values) = draft::load(&self.drafts, &WizardStep::Details.draft_key()) {
            self.details.replace(values);
        }
        if let Some(values) = draft::load(&self.drafts, &WizardStep::Curriculum.draft_key()) {
            self.curriculum.replace(values);
        }
        if let Some(values) = draft::load(&self.drafts, &WizardStep::Resources.draft_key()) {
            self.resources.replace(values);
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn course_id(&self) -> Option<Uuid> {
        self.course_id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn drafts(&self) -> &D {
        &self.drafts
    }

    pub fn details(&self) -> &StepForm<CourseDetails> {
        &self.details
    }

    pub fn curriculum(&self) -> &StepForm<CurriculumForm> {
        &self.curriculum
    }

    pub fn resources(&self) -> &StepForm<ResourcesForm> {
        &self.resources
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn edit_details<R>(&mut self, now: Instant, f: impl FnOnce(&mut CourseDetails) -> R) -> R {
        self.details.edit(now, f)
    }

    pub fn edit_curriculum<R>(&mut self, now: Instant, f: impl FnOnce(&mut CurriculumForm) -> R) -> R {
        self.curriculum.edit(now, f)
    }

    pub fn edit_resources<R>(&mut self, now: Instant, f: impl FnOnce(&mut ResourcesForm) -> R) -> R {
        self.resources.edit(now, f)
    }

    pub fn can_proceed(&self) -> bool {
        self.current_errors().is_empty()
    }

    pub fn current_errors(&self) -> &FieldErrors {
        match self.step {
            WizardStep::Details => self.details.errors(),
            WizardStep::Curriculum => self.curriculum.errors(),
            WizardStep::Resources => self.resources.errors(),
        }
    }

    /// Writes every step whose debounce window has elapsed by `now`.
    pub fn tick(&mut self, now: Instant) {
        if let Some(values) = self.details.due_draft(now) {
            self.write_draft(WizardStep::Details, &values);
        }
        if let Some(values) = self.curriculum.due_draft(now) {
            self.write_draft(WizardStep::Curriculum, &values);
        }
        if let Some(values) = self.resources.due_draft(now) {
            self.write_draft(WizardStep::Resources, &values);
        }
    }

    /// Writes all pending drafts immediately, e.g. before the wizard is dropped.
    pub fn flush(&mut self) {
        if self.details.has_pending_draft() {
            let values = self.details.draft_now();
            self.write_draft(WizardStep::Details, &values);
        }
        if self.curriculum.has_pending_draft() {
            let values = self.curriculum.draft_now();
            self.write_draft(WizardStep::Curriculum, &values);
        }
        if self.resources.has_pending_draft() {
            let values = self.resources.draft_now();
            self.write_draft(WizardStep::Resources, &values);
        }
    }

    fn write_draft<T: StepSchema>(&self, step: WizardStep, values: &T) {
        if let Err(e) = draft::save(&self.drafts, &step.draft_key(), values) {
            tracing::warn!(%step, error = %e, "could not save draft");
        }
    }

    fn write_session(&self) {
        let session = Session { course_id: self.course_id, step: self.step };
        if let Err(e) = draft::save(&self.drafts, &session_key(), &session) {
            tracing::warn!(error = %e, "could not save wizard session");
        }
    }

    /// Removes every stored draft and cancels writes still waiting on a debounce,
    /// so a later `tick` or `flush` cannot bring a finished course back.
    fn clear_drafts(&mut self) {
        self.details.discard_pending();
        self.curriculum.discard_pending();
        self.resources.discard_pending();

        let keys = WizardStep::ALL.iter().map(|step| step.draft_key()).chain([session_key()]);
        for key in keys {
            if let Err(e) = self.drafts.remove(&key) {
                tracing::warn!(%key, error = %e, "could not clear draft");
            }
        }
    }

    fn absorb(&mut self, report: SyncReport) -> bool {
        let clean = report.is_clean();
        self.notices.extend(report.notices);
        clean
    }

    fn advance(&mut self) -> StepOutcome {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.write_session();
                StepOutcome::Advanced(next)
            }
            None => StepOutcome::Failed,
        }
    }

    /// Validates the current step, saves it and moves on. An invalid step
    /// sends nothing; a partially failed save keeps the author on the step.
    pub async fn continue_step(&mut self) -> StepOutcome {
        let errors = self.current_errors();
        if !errors.is_empty() {
            let errors = errors.clone();
            self.notices.push(Notice::error(format!("Please fix the highlighted fields: {errors}")));
            return StepOutcome::Blocked(errors);
        }

        match self.step {
            WizardStep::Details => self.save_details().await,
            WizardStep::Curriculum => self.save_curriculum().await,
            WizardStep::Resources => self.finish().await,
        }
    }

    async fn save_details(&mut self) -> StepOutcome {
        let details = self.details.values().sanitized();
        match self.api.save_course(self.course_id, &details).await {
            Ok(course) => {
                tracing::info!(course_id = %course.id, created = self.course_id.is_none(), "course details saved");
                self.course_id = Some(course.id);
                self.notices.push(Notice::success("Course details saved"));
                self.advance()
            }
            Err(e) => {
                tracing::warn!(error = %e, "course details not saved");
                self.notices.push(Notice::error(format!("Course details were not saved: {e}")));
                StepOutcome::Failed
            }
        }
    }

    fn require_course(&mut self) -> Option<Uuid> {
        if self.course_id.is_none() {
            self.notices.push(Notice::error("Save the course details first"));
        }
        self.course_id
    }

    async fn save_curriculum(&mut self) -> StepOutcome {
        let Some(course_id) = self.require_course() else {
            return StepOutcome::Failed;
        };
        let report = sync::sync_curriculum(&self.api, course_id, &mut self.curriculum.values_mut().modules).await;
        self.curriculum.revalidate();
        let values = self.curriculum.draft_now();
        self.write_draft(WizardStep::Curriculum, &values);

        if self.absorb(report) {
            self.advance()
        } else {
            StepOutcome::Failed
        }
    }

    async fn finish(&mut self) -> StepOutcome {
        let Some(course_id) = self.require_course() else {
            return StepOutcome::Failed;
        };
        let report = sync::sync_resources(&self.api, course_id, &mut self.resources.values_mut().resources).await;
        self.resources.revalidate();
        let values = self.resources.draft_now();
        self.write_draft(WizardStep::Resources, &values);

        if !self.absorb(report) {
            return StepOutcome::Failed;
        }

        if self.options.publish_on_finish {
            if let Err(e) = self.api.set_published(course_id, true).await {
                self.notices.push(Notice::error(format!("Course was not published: {e}")));
                return StepOutcome::Failed;
            }
            self.notices.push(Notice::success("Course published"));
        }

        tracing::info!(%course_id, "course wizard completed");
        self.clear_drafts();
        StepOutcome::Completed(course_id)
    }

    /// Steps back without validating. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                self.write_session();
                true
            }
            None => false,
        }
    }

    pub fn toggle_module(&mut self, index: usize) -> Option<bool> {
        self.curriculum.values_mut().modules.toggle(index)
    }

    pub fn toggle_resource(&mut self, index: usize) -> Option<bool> {
        self.resources.values_mut().resources.toggle(index)
    }

    /// Removes a module, deleting it on the server first when it was saved.
    pub async fn remove_module(&mut self, now: Instant, index: usize) -> bool {
        let result = sync::remove_module(&self.api, self.course_id, &mut self.curriculum.values_mut().modules, index).await;
        self.after_curriculum_removal(now, result.map(|removed| removed.is_some()))
    }

    pub async fn remove_lesson(&mut self, now: Instant, module_index: usize, lesson_index: usize) -> bool {
        let modules = &mut self.curriculum.values_mut().modules;
        let result = sync::remove_lesson(&self.api, self.course_id, modules, module_index, lesson_index).await;
        self.after_curriculum_removal(now, result.map(|removed| removed.is_some()))
    }

    pub async fn remove_resource(&mut self, now: Instant, index: usize) -> bool {
        let result = sync::remove_resource(&self.api, self.course_id, &mut self.resources.values_mut().resources, index).await;
        match result {
            Ok(removed) => {
                self.resources.edit(now, |_| ());
                removed.is_some()
            }
            Err(e) => {
                self.notices.push(Notice::error(format!("Resource was not deleted: {e}")));
                false
            }
        }
    }

    fn after_curriculum_removal(&mut self, now: Instant, result: Result<bool, api::ApiError>) -> bool {
        match result {
            Ok(removed) => {
                self.curriculum.edit(now, |_| ());
                removed
            }
            Err(e) => {
                self.notices.push(Notice::error(format!("Item was not deleted: {e}")));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        draft::MemoryDraftStore,
        editor::ModuleDraft,
        sync::testing::{Call, RecordingApi},
        *,
    };
    use crate::schema::course::{LessonInput, ResourceInput};

    fn details() -> CourseDetails {
        CourseDetails {
            title: "Rust for Backend Developers".into(),
            description: "Ownership, async and sqlx from the ground up.".into(),
            category_id: Some(Uuid::new_v4()),
            price: Some(4900),
            instructor_id: Some(Uuid::new_v4()),
            thumbnail_url: None,
        }
    }

    fn lesson(name: &str) -> LessonInput {
        LessonInput {
            name: name.into(),
            content: "<p>Moves, copies and clones in practice.</p>".into(),
            ..Default::default()
        }
    }

    fn wizard(api: RecordingApi, drafts: MemoryDraftStore) -> CourseWizard<RecordingApi, MemoryDraftStore> {
        CourseWizard::new(api, drafts, WizardOptions::default())
    }

    fn wizard_for(drafts: MemoryDraftStore) -> CourseWizard<RecordingApi, MemoryDraftStore> {
        wizard(RecordingApi::default(), drafts)
    }

    #[actix_web::test]
    async fn invalid_step_is_blocked_without_a_request() {
        let api = RecordingApi::default();
        let mut wizard = wizard(api.clone(), MemoryDraftStore::new());
        assert!(!wizard.can_proceed());

        let outcome = wizard.continue_step().await;
        match outcome {
            StepOutcome::Blocked(errors) => assert!(errors.contains("title")),
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert!(api.calls().is_empty());
        assert!(wizard.notices().last().unwrap().is_error());
    }

    #[actix_web::test]
    async fn walks_all_steps_and_clears_drafts() {
        let api = RecordingApi::default();
        let drafts = MemoryDraftStore::new();
        let mut wizard = wizard(api.clone(), drafts.clone());
        let now = Instant::now();

        wizard.edit_details(now, |d| *d = details());
        assert_eq!(wizard.continue_step().await, StepOutcome::Advanced(WizardStep::Curriculum));
        let course_id = wizard.course_id().unwrap();

        wizard.edit_curriculum(now, |c| {
            let mut module = ModuleDraft::titled("Basics");
            module.lessons.append(lesson("Ownership"));
            c.modules.append(module);
        });
        assert_eq!(wizard.continue_step().await, StepOutcome::Advanced(WizardStep::Resources));
        assert!(wizard.curriculum().values().modules.get(0).unwrap().id.is_some());

        wizard.edit_resources(now, |r| {
            r.resources.append(ResourceInput {
                name: "Cheat sheet".into(),
                file_url: "https://cdn.example.com/cheatsheet.pdf".into(),
                ..Default::default()
            })
        });
        assert_eq!(wizard.continue_step().await, StepOutcome::Completed(course_id));

        assert_eq!(api.calls().last(), Some(&Call::SetPublished(course_id)));
        assert!(drafts.keys().is_empty(), "drafts left: {:?}", drafts.keys());
    }

    #[actix_web::test]
    async fn completed_wizard_leaves_no_draft_behind() {
        let drafts = MemoryDraftStore::new();
        let mut wizard = wizard(RecordingApi::default(), drafts.clone());
        let now = Instant::now();

        wizard.edit_details(now, |d| *d = details());
        wizard.continue_step().await;
        wizard.edit_curriculum(now, |c| {
            let mut module = ModuleDraft::titled("Basics");
            module.lessons.append(lesson("Ownership"));
            c.modules.append(module);
        });
        wizard.continue_step().await;
        wizard.edit_resources(now, |r| r.resources.append_blank());
        wizard.edit_resources(now, |r| r.resources.remove(0));
        assert!(matches!(wizard.continue_step().await, StepOutcome::Completed(_)));

        wizard.tick(now + Duration::from_secs(5));
        wizard.flush();
        assert!(drafts.keys().is_empty(), "drafts left: {:?}", drafts.keys());
        drop(wizard);

        let reloaded = wizard_for(drafts);
        assert_eq!(reloaded.details().values(), &CourseDetails::default());
        assert_eq!(reloaded.course_id(), None);
        assert_eq!(reloaded.step(), WizardStep::Details);
    }

    #[actix_web::test]
    async fn drafts_restore_after_reload() {
        let drafts = MemoryDraftStore::new();
        let start = Instant::now();
        let mut first = wizard(RecordingApi::default(), drafts.clone());

        first.edit_details(start, |d| {
            *d = details();
            d.title = "  Rust for Backend Developers  ".into();
        });
        first.edit_curriculum(start, |c| {
            let mut module = ModuleDraft::titled("Basics");
            module.lessons.append(lesson("Ownership"));
            c.modules.append(module);
            c.modules.get_mut(0).unwrap().begin_rename();
        });

        first.tick(start + Duration::from_millis(100));
        assert!(drafts.keys().is_empty());
        first.tick(start + Duration::from_millis(500));
        drop(first);

        let reloaded = wizard(RecordingApi::default(), drafts.clone());
        assert_eq!(reloaded.details().values().title, "Rust for Backend Developers");
        assert!(reloaded.details().can_proceed());

        let module = reloaded.curriculum().values().modules.get(0).unwrap();
        assert_eq!(module.title, "Basics");
        assert_eq!(module.lessons.get(0).unwrap().name, "Ownership");
        assert!(!module.is_renaming());
        assert!(!reloaded.curriculum().values().modules.is_expanded(0));
    }

    #[actix_web::test]
    async fn session_survives_reload_and_back_skips_validation() {
        let drafts = MemoryDraftStore::new();
        let mut first = wizard(RecordingApi::default(), drafts.clone());
        first.edit_details(Instant::now(), |d| *d = details());
        first.continue_step().await;
        let course_id = first.course_id();
        drop(first);

        let mut reloaded = wizard(RecordingApi::default(), drafts);
        assert_eq!(reloaded.step(), WizardStep::Curriculum);
        assert_eq!(reloaded.course_id(), course_id);
        assert!(!reloaded.can_proceed());
        assert!(reloaded.back());
        assert_eq!(reloaded.step(), WizardStep::Details);
        assert!(!reloaded.back());
    }

    #[actix_web::test]
    async fn blank_module_keeps_the_author_on_the_step() {
        let api = RecordingApi::default();
        let mut wizard = wizard(api.clone(), MemoryDraftStore::new());
        let now = Instant::now();
        wizard.edit_details(now, |d| *d = details());
        wizard.continue_step().await;

        wizard.edit_curriculum(now, |c| c.modules.append(ModuleDraft::titled("  ")));
        assert!(matches!(wizard.continue_step().await, StepOutcome::Blocked(_)));
        assert_eq!(api.calls().len(), 1);
        assert_eq!(wizard.step(), WizardStep::Curriculum);
    }

    #[actix_web::test]
    async fn removing_unsaved_and_saved_modules() {
        let api = RecordingApi::default();
        let mut wizard = wizard(api.clone(), MemoryDraftStore::new());
        let now = Instant::now();
        wizard.edit_details(now, |d| *d = details());
        wizard.continue_step().await;

        wizard.edit_curriculum(now, |c| {
            let mut module = ModuleDraft::titled("Basics");
            module.lessons.append(lesson("Ownership"));
            c.modules.append(module);
        });
        wizard.continue_step().await;
        let saved_id = wizard.curriculum().values().modules.get(0).unwrap().id.unwrap();
        wizard.back();

        wizard.edit_curriculum(now, |c| c.modules.append_blank());
        let calls_before = api.calls().len();
        assert!(wizard.remove_module(now, 1).await);
        assert_eq!(api.calls().len(), calls_before);

        assert!(wizard.remove_module(now, 0).await);
        assert_eq!(api.calls().last(), Some(&Call::DeleteModule(saved_id)));
        assert!(wizard.curriculum().values().modules.is_empty());
    }

    #[actix_web::test]
    async fn end_to_end_over_the_store() {
        use crate::{
            models::category::Category,
            schema::people::InstructorInput,
            store::{MemoryStore, Store},
            wizard::api::StoreApi,
        };

        let store = Arc::new(MemoryStore::new());
        let category = Category { id: Uuid::new_v4(), name: "Systems".into(), slug: "systems".into(), description: None };
        store.create_category(&category).await.unwrap();
        let instructor = store
            .create_instructor(&InstructorInput { name: "Ferris".into(), email: "ferris@example.com".into(), bio: None, avatar_url: None })
            .await
            .unwrap();

        let drafts = MemoryDraftStore::new();
        let mut wizard = CourseWizard::new(StoreApi::new(store.clone()), drafts.clone(), WizardOptions::default());
        let now = Instant::now();
        wizard.edit_details(now, |d| {
            *d = CourseDetails { category_id: Some(category.id), instructor_id: Some(instructor.id), ..details() }
        });
        wizard.continue_step().await;
        let course_id = wizard.course_id().unwrap();

        wizard.edit_curriculum(now, |c| {
            let mut module = ModuleDraft::titled("Basics");
            module.lessons.append(lesson("Ownership"));
            c.modules.append(module);
        });
        wizard.continue_step().await;
        wizard.back();
        wizard.edit_curriculum(now, |c| c.modules.get_mut(0).unwrap().title = "Fundamentals".into());
        assert_eq!(wizard.continue_step().await, StepOutcome::Advanced(WizardStep::Resources));
        assert_eq!(wizard.continue_step().await, StepOutcome::Completed(course_id));

        let modules = store.list_modules(course_id).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Fundamentals");
        assert_eq!(store.list_lessons(modules[0].id).await.unwrap().len(), 1);
        assert!(store.get_course(course_id).await.unwrap().published);
    }
}
