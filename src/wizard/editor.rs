//! Ordered, editable collections behind the curriculum and resources steps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::schema::course::{LessonInput, ModuleInput, ResourceInput};

/// Items that receive an id from the server on their first successful save.
pub trait ServerId {
    fn server_id(&self) -> Option<Uuid>;
    fn set_server_id(&mut self, id: Uuid);
}

impl ServerId for LessonInput {
    fn server_id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_server_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl ServerId for ResourceInput {
    fn server_id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_server_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

/// What removing an item requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Never saved: dropping it locally is enough.
    LocalOnly,
    /// Saved before: the server copy must be deleted first.
    Remote(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    pub value: T,
    pub expanded: bool,
}

/// An ordered list with per-item expand/collapse state. Only the values are
/// serialized; expansion is view state and starts collapsed after a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemList<T> {
    items: Vec<Item<T>>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        ItemList { items: Vec::new() }
    }
}

impl<T> From<Vec<T>> for ItemList<T> {
    fn from(values: Vec<T>) -> Self {
        ItemList {
            items: values
                .into_iter()
                .map(|value| Item { value, expanded: false })
                .collect(),
        }
    }
}

impl<T> ItemList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).map(|item| &item.value)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index).map(|item| &mut item.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().map(|item| &mut item.value)
    }

    /// Appends `value` expanded, ready for editing, and returns its index.
    pub fn append(&mut self, value: T) -> usize {
        self.items.push(Item { value, expanded: true });
        self.items.len() - 1
    }

    pub fn append_blank(&mut self) -> usize
    where
        T: Default,
    {
        self.append(T::default())
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index).value)
    }

    /// Moves the item at `from` so it ends up at `to`. Out-of-range indices are ignored.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Flips expand/collapse and returns the new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.expanded = !item.expanded;
        Some(item.expanded)
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| item.expanded)
    }

    pub fn collapse_all(&mut self) {
        for item in &mut self.items {
            item.expanded = false;
        }
    }
}

impl<T: ServerId> ItemList<T> {
    pub fn removal(&self, index: usize) -> Option<Removal> {
        let value = self.get(index)?;
        Some(match value.server_id() {
            Some(id) => Removal::Remote(id),
            None => Removal::LocalOnly,
        })
    }
}

impl<T: Serialize> Serialize for ItemList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ItemList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(ItemList::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    #[error("the module is not being renamed")]
    NotEditing,
    #[error("module title must not be blank")]
    Blank,
}

/// A module being authored, with its lessons and the inline-rename sub-state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub lessons: ItemList<LessonInput>,
    #[serde(skip)]
    rename: Option<String>,
}

impl ModuleDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        ModuleDraft { title: title.into(), ..Default::default() }
    }

    /// Payload for the module itself at `position`; lessons are sent separately.
    pub fn to_input(&self, position: usize) -> ModuleInput {
        ModuleInput {
            id: self.id,
            title: self.title.trim().to_string(),
            position: position as i32,
        }
    }

    pub fn begin_rename(&mut self) {
        self.rename = Some(self.title.clone());
    }

    pub fn is_renaming(&self) -> bool {
        self.rename.is_some()
    }

    pub fn rename_buffer(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    pub fn set_rename_buffer(&mut self, value: impl Into<String>) -> Result<(), RenameError> {
        let buffer = self.rename.as_mut().ok_or(RenameError::NotEditing)?;
        *buffer = value.into();
        Ok(())
    }

    /// Commits the buffer. A blank buffer is refused and editing continues.
    pub fn save_rename(&mut self) -> Result<(), RenameError> {
        let buffer = self.rename.as_deref().ok_or(RenameError::NotEditing)?;
        let title = buffer.trim();
        if title.is_empty() {
            return Err(RenameError::Blank);
        }
        self.title = title.to_string();
        self.rename = None;
        Ok(())
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }
}

impl ServerId for ModuleDraft {
    fn server_id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_server_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(list: &ItemList<ModuleDraft>) -> Vec<&str> {
        list.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn append_expands_and_toggle_flips() {
        let mut list: ItemList<ModuleDraft> = ItemList::new();
        let index = list.append_blank();
        assert!(list.is_expanded(index));
        assert_eq!(list.toggle(index), Some(false));
        assert_eq!(list.toggle(index), Some(true));
        assert_eq!(list.toggle(7), None);
    }

    #[test]
    fn move_reorders() {
        let mut list = ItemList::from(vec![
            ModuleDraft::titled("a"),
            ModuleDraft::titled("b"),
            ModuleDraft::titled("c"),
        ]);
        assert!(list.move_item(2, 0));
        assert_eq!(titles(&list), vec!["c", "a", "b"]);
        assert!(!list.move_item(0, 3));
    }

    #[test]
    fn removal_depends_on_server_id() {
        let saved = Uuid::new_v4();
        let list = ItemList::from(vec![
            ModuleDraft::titled("local"),
            ModuleDraft { id: Some(saved), ..ModuleDraft::titled("saved") },
        ]);
        assert_eq!(list.removal(0), Some(Removal::LocalOnly));
        assert_eq!(list.removal(1), Some(Removal::Remote(saved)));
        assert_eq!(list.removal(2), None);
    }

    #[test]
    fn rename_save_and_cancel() {
        let mut module = ModuleDraft::titled("Intro");
        assert_eq!(module.save_rename(), Err(RenameError::NotEditing));

        module.begin_rename();
        module.set_rename_buffer("   ").unwrap();
        assert_eq!(module.save_rename(), Err(RenameError::Blank));
        assert!(module.is_renaming());

        module.set_rename_buffer(" Getting started ").unwrap();
        module.save_rename().unwrap();
        assert_eq!(module.title, "Getting started");
        assert!(!module.is_renaming());

        module.begin_rename();
        module.set_rename_buffer("Discarded").unwrap();
        module.cancel_rename();
        assert_eq!(module.title, "Getting started");
    }

    #[test]
    fn serializes_values_only() {
        let mut list: ItemList<ModuleDraft> = ItemList::new();
        let index = list.append(ModuleDraft::titled("Intro"));
        list.get_mut(index).unwrap().begin_rename();

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json, serde_json::json!([{ "id": null, "title": "Intro", "lessons": [] }]));

        let restored: ItemList<ModuleDraft> = serde_json::from_value(json).unwrap();
        assert!(!restored.is_expanded(0));
        assert!(!restored.get(0).unwrap().is_renaming());
    }
}
