use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every task keyed by id. Iteration order is creation order.
pub type Collection = BTreeMap<TaskId, Task>;

/// Creation timestamp in milliseconds, bumped past the newest existing id
/// when two tasks are created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Next free id for `collection` given the current time. `None` only
    /// when every id is taken.
    pub fn next(collection: &Collection, now_millis: i64) -> Option<Self> {
        let now = u64::try_from(now_millis).unwrap_or(0);
        match collection.keys().next_back() {
            None => Some(TaskId(now)),
            Some(newest) if newest.0 < now => Some(TaskId(now)),
            Some(newest) => match newest.0.checked_add(1) {
                Some(id) => Some(TaskId(id)),
                None => first_free(collection, now).or_else(|| first_free(collection, 0)),
            },
        }
    }
}

// Lowest unused id at or above `from`.
fn first_free(collection: &Collection, from: u64) -> Option<TaskId> {
    let mut candidate = from;
    for id in collection.range(TaskId(from)..).map(|(id, _)| id.0) {
        if id != candidate {
            return Some(TaskId(candidate));
        }
        candidate = candidate.checked_add(1)?;
    }
    Some(TaskId(candidate))
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// The two lists a task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Travel,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Work, Category::Travel];

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Travel => "Travel",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Category::Work => Category::Travel,
            Category::Travel => Category::Work,
        }
    }

    /// Hint shown in the empty input line.
    pub fn placeholder(self) -> &'static str {
        match self {
            Category::Work => "What do you have to do?",
            Category::Travel => "Where do you want to go?",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "travel" => Ok(Category::Travel),
            other => Err(format!("unknown category `{other}` (expected work or travel)")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub text: String,
    #[serde(rename = "working", with = "working_flag")]
    pub category: Category,
    // Records rewritten by older builds lost this field.
    #[serde(default)]
    pub checked: bool,
}

impl Task {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
            checked: false,
        }
    }
}

/// Stored records carry the category as `"working": bool`.
mod working_flag {
    use super::Category;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(category: &Category, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*category == Category::Work)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Category, D::Error> {
        let working = bool::deserialize(deserializer)?;
        Ok(if working { Category::Work } else { Category::Travel })
    }
}

/// `None` when the text is blank, otherwise the text exactly as typed.
pub fn clean_text(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_uses_working_flag_on_the_wire() {
        let task = Task::new("Book flights", Category::Travel);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({ "text": "Book flights", "working": false, "checked": false })
        );
    }

    #[test]
    fn collection_keys_are_stringified_ids() {
        let mut collection = Collection::new();
        collection.insert(TaskId(1700000000000), Task::new("Standup", Category::Work));
        let raw = serde_json::to_string(&collection).unwrap();
        assert_eq!(
            raw,
            r#"{"1700000000000":{"text":"Standup","working":true,"checked":false}}"#
        );
    }

    #[test]
    fn record_without_checked_loads_unchecked() {
        let raw = r#"{"1690000000000":{"text":"Edited before","working":true}}"#;
        let collection: Collection = serde_json::from_str(raw).unwrap();
        let task = &collection[&TaskId(1690000000000)];
        assert_eq!(task.text, "Edited before");
        assert_eq!(task.category, Category::Work);
        assert!(!task.checked);
    }

    #[test]
    fn next_id_uses_clock_when_ahead() {
        let mut collection = Collection::new();
        collection.insert(TaskId(10), Task::new("a", Category::Work));
        assert_eq!(TaskId::next(&collection, 500), Some(TaskId(500)));
    }

    #[test]
    fn next_id_never_collides_within_same_millisecond() {
        let mut collection = Collection::new();
        collection.insert(TaskId(500), Task::new("a", Category::Work));
        collection.insert(TaskId(501), Task::new("b", Category::Work));
        assert_eq!(TaskId::next(&collection, 500), Some(TaskId(502)));
    }

    #[test]
    fn next_id_after_max_takes_a_free_slot() {
        let mut collection = Collection::new();
        collection.insert(TaskId(500), Task::new("a", Category::Work));
        collection.insert(TaskId(u64::MAX), Task::new("b", Category::Work));
        assert_eq!(TaskId::next(&collection, 500), Some(TaskId(501)));
    }

    #[test]
    fn first_free_reports_a_full_range() {
        let mut collection = Collection::new();
        collection.insert(TaskId(0), Task::new("a", Category::Work));
        collection.insert(TaskId(u64::MAX - 1), Task::new("b", Category::Work));
        collection.insert(TaskId(u64::MAX), Task::new("c", Category::Work));
        assert_eq!(first_free(&collection, u64::MAX - 1), None);
        assert_eq!(first_free(&collection, 0), Some(TaskId(1)));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Work".parse::<Category>(), Ok(Category::Work));
        assert_eq!(" TRAVEL ".parse::<Category>(), Ok(Category::Travel));
        assert!("home".parse::<Category>().is_err());
    }

    #[test]
    fn clean_text_rejects_blank_input() {
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text("  Buy milk "), Some("  Buy milk ".to_string()));
    }
}
