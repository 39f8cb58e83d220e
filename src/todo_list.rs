use crate::error::{Result, TodoError};
use crate::storage::{KeyValueStore, TodoStorage};
use crate::task::{clean_text, Category, Collection, Task, TaskId};
use chrono::Utc;
use tracing::{info, warn};

/// Which record, if any, the input line is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(TaskId),
}

/// Answer to the delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Sure,
    Cancel,
}

/// In-memory to-do collection plus the session state around it.
///
/// Every change to the collection is written through to storage before the
/// call returns.
#[derive(Debug)]
pub struct TodoList<S> {
    storage: TodoStorage<S>,
    todos: Collection,
    category: Category,
    edit: EditState,
    draft: String,
    edit_text: String,
    pending_removal: Option<TaskId>,
}

impl<S: KeyValueStore> TodoList<S> {
    /// Reads the stored collection once and starts on `category`.
    pub fn load(storage: TodoStorage<S>, category: Category) -> Result<Self> {
        let todos = storage.load()?;
        Ok(Self {
            storage,
            todos,
            category,
            edit: EditState::Idle,
            draft: String::new(),
            edit_text: String::new(),
            pending_removal: None,
        })
    }

    pub fn storage(&self) -> &TodoStorage<S> {
        &self.storage
    }

    pub fn collection(&self) -> &Collection {
        &self.todos
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.todos.get(&id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditState::Editing(_))
    }

    pub fn pending_removal(&self) -> Option<TaskId> {
        self.pending_removal
    }

    pub fn placeholder(&self) -> &'static str {
        self.category.placeholder()
    }

    /// Tasks in the active category, in creation order.
    pub fn visible(&self) -> Vec<(TaskId, &Task)> {
        self.todos
            .iter()
            .filter(|(_, task)| task.category == self.category)
            .map(|(id, task)| (*id, task))
            .collect()
    }

    /// Contents of the input line: the edit buffer while editing, otherwise
    /// the new-task draft.
    pub fn input(&self) -> &str {
        if self.is_editing() {
            &self.edit_text
        } else {
            &self.draft
        }
    }

    pub fn input_mut(&mut self) -> &mut String {
        if self.is_editing() {
            &mut self.edit_text
        } else {
            &mut self.draft
        }
    }

    /// Enter on the input line. Commits the edit or adds the draft to the
    /// active category.
    pub fn submit(&mut self) -> Result<bool> {
        match self.edit {
            EditState::Editing(id) => {
                let text = self.edit_text.clone();
                self.commit_edit(id, &text)
            }
            EditState::Idle => {
                let text = self.draft.clone();
                Ok(self.add(&text, self.category)?.is_some())
            }
        }
    }

    /// Adds a task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str, category: Category) -> Result<Option<TaskId>> {
        let Some(text) = clean_text(text) else {
            return Ok(None);
        };
        let id = TaskId::next(&self.todos, Utc::now().timestamp_millis())
            .ok_or(TodoError::IdsExhausted)?;
        let mut updated = self.todos.clone();
        updated.insert(id, Task::new(text, category));
        self.commit(updated)?;
        self.draft.clear();
        info!(%id, %category, "added to-do");
        Ok(Some(id))
    }

    pub fn start_edit(&mut self, id: TaskId) -> bool {
        let Some(task) = self.todos.get(&id) else {
            warn!(%id, "cannot edit unknown to-do");
            return false;
        };
        self.edit_text = task.text.clone();
        self.edit = EditState::Editing(id);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
        self.edit_text.clear();
    }

    /// Replaces the text of `id`, keeping every other field. Returns `false`
    /// for blank text or an unknown id, leaving edit mode untouched.
    pub fn commit_edit(&mut self, id: TaskId, new_text: &str) -> Result<bool> {
        let Some(text) = clean_text(new_text) else {
            return Ok(false);
        };
        let Some(existing) = self.todos.get(&id) else {
            warn!(%id, "cannot commit edit of unknown to-do");
            return Ok(false);
        };
        let mut updated = self.todos.clone();
        updated.insert(id, Task { text, ..existing.clone() });
        self.commit(updated)?;
        self.cancel_edit();
        info!(%id, "edited to-do");
        Ok(true)
    }

    /// Asks for confirmation before deleting `id`.
    pub fn request_remove(&mut self, id: TaskId) -> bool {
        if !self.todos.contains_key(&id) {
            warn!(%id, "cannot remove unknown to-do");
            return false;
        }
        self.pending_removal = Some(id);
        true
    }

    /// Answers the pending delete prompt. `Cancel` changes nothing.
    pub fn resolve_remove(&mut self, answer: Confirmation) -> Result<Option<Task>> {
        let Some(id) = self.pending_removal.take() else {
            return Ok(None);
        };
        match answer {
            Confirmation::Sure => self.remove(id),
            Confirmation::Cancel => Ok(None),
        }
    }

    /// Deletes `id` without asking.
    pub fn remove(&mut self, id: TaskId) -> Result<Option<Task>> {
        if !self.todos.contains_key(&id) {
            return Ok(None);
        }
        let mut updated = self.todos.clone();
        let removed = updated.remove(&id);
        self.commit(updated)?;
        if self.edit == EditState::Editing(id) {
            self.cancel_edit();
        }
        info!(%id, "removed to-do");
        Ok(removed)
    }

    pub fn set_checked(&mut self, id: TaskId, value: bool) -> Result<bool> {
        let Some(existing) = self.todos.get(&id) else {
            warn!(%id, "cannot check unknown to-do");
            return Ok(false);
        };
        if existing.checked == value {
            return Ok(true);
        }
        let mut updated = self.todos.clone();
        updated.insert(
            id,
            Task {
                checked: value,
                ..existing.clone()
            },
        );
        self.commit(updated)?;
        Ok(true)
    }

    pub fn toggle_checked(&mut self, id: TaskId) -> Result<bool> {
        match self.todos.get(&id) {
            Some(task) => {
                let value = !task.checked;
                self.set_checked(id, value)
            }
            None => Ok(false),
        }
    }

    /// Changes which list is shown. Any edit in progress is dropped so the
    /// record can't be re-filed under the other category.
    pub fn switch_category(&mut self, category: Category) {
        self.category = category;
        self.cancel_edit();
    }

    // Persist first so a failed write leaves memory matching storage.
    fn commit(&mut self, updated: Collection) -> Result<()> {
        self.storage.save(&updated)?;
        self.todos = updated;
        Ok(())
    }
}
