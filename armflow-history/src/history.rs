//! Template history - bounded undo/redo over template snapshots
//!
//! A linear sequence of snapshots with a cursor. Recording while the
//! cursor is not at the newest entry discards the redo tail; recording
//! at capacity evicts the oldest entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use armflow_core::template::ArmTemplate;

/// One entry in the history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub template: ArmTemplate,
    #[serde(rename = "takenAt")]
    pub taken_at: DateTime<Utc>,
}

/// Bounded undo/redo sequence with a cursor
#[derive(Debug, Clone)]
pub struct TemplateHistory {
    snapshots: Vec<Snapshot>,
    /// Index of the current snapshot; `None` while empty
    cursor: Option<usize>,
    capacity: usize,
}

impl TemplateHistory {
    /// Default number of snapshots kept before the oldest is evicted
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a history from persisted snapshots, clamping the cursor to
    /// the valid range
    pub(crate) fn restore(snapshots: Vec<Snapshot>, cursor: Option<usize>) -> Self {
        let cursor = cursor
            .filter(|&c| c < snapshots.len())
            .or_else(|| snapshots.len().checked_sub(1));
        Self {
            snapshots,
            cursor,
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Record a new snapshot; a template equal to the current one is ignored
    pub fn push(&mut self, template: ArmTemplate) {
        if self.current() == Some(&template) {
            return;
        }

        // Recording from the middle of history discards the redo tail
        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        }

        if self.snapshots.len() >= self.capacity {
            self.snapshots.remove(0);
        }

        self.snapshots.push(Snapshot {
            template,
            taken_at: Utc::now(),
        });
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back; returns the now-current template, or `None` at the oldest
    pub fn undo(&mut self) -> Option<&ArmTemplate> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        Some(&self.snapshots[cursor - 1].template)
    }

    /// Step forward; returns the now-current template, or `None` at the newest
    pub fn redo(&mut self) -> Option<&ArmTemplate> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        Some(&self.snapshots[cursor + 1].template)
    }

    pub fn current(&self) -> Option<&ArmTemplate> {
        self.cursor.map(|c| &self.snapshots[c].template)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.snapshots.len())
    }

    /// 1-based cursor position, 0 while empty
    pub fn position(&self) -> usize {
        self.cursor.map_or(0, |c| c + 1)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    /// All snapshots, oldest first
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub(crate) fn cursor(&self) -> Option<usize> {
        self.cursor
    }
}

impl Default for TemplateHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(version: &str) -> ArmTemplate {
        ArmTemplate::parse(&format!(
            r#"{{ "$schema": "s", "contentVersion": "{version}" }}"#
        ))
        .unwrap()
    }

    #[test]
    fn push_and_navigate() {
        let mut history = TemplateHistory::new();
        history.push(template("1"));
        history.push(template("2"));
        history.push(template("3"));

        assert_eq!(history.len(), 3);
        assert_eq!(history.position(), 3);
        assert_eq!(
            history.current().unwrap().content_version.as_deref(),
            Some("3")
        );

        let previous = history.undo().unwrap();
        assert_eq!(previous.content_version.as_deref(), Some("2"));
        assert_eq!(history.position(), 2);

        let next = history.redo().unwrap();
        assert_eq!(next.content_version.as_deref(), Some("3"));
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_stops_at_the_oldest() {
        let mut history = TemplateHistory::new();
        history.push(template("1"));

        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.position(), 1);
    }

    #[test]
    fn empty_history_has_no_current() {
        let mut history = TemplateHistory::new();
        assert!(history.current().is_none());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.position(), 0);
    }

    #[test]
    fn pushing_mid_history_discards_the_redo_tail() {
        let mut history = TemplateHistory::new();
        history.push(template("1"));
        history.push(template("2"));
        history.push(template("3"));
        history.undo();
        history.undo();

        history.push(template("4"));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.current().unwrap().content_version.as_deref(),
            Some("4")
        );
        assert!(!history.can_redo());
        assert_eq!(
            history.undo().unwrap().content_version.as_deref(),
            Some("1")
        );
    }

    #[test]
    fn capacity_evicts_the_oldest() {
        let mut history = TemplateHistory::with_capacity(3);
        for i in 1..=5 {
            history.push(template(&i.to_string()));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(
            history.snapshots()[0].template.content_version.as_deref(),
            Some("3")
        );
        assert_eq!(
            history.current().unwrap().content_version.as_deref(),
            Some("5")
        );
    }

    #[test]
    fn duplicate_of_current_is_ignored() {
        let mut history = TemplateHistory::new();
        history.push(template("1"));
        history.push(template("1"));

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut history = TemplateHistory::new();
        history.push(template("1"));
        history.push(template("2"));
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.position(), 0);
        assert!(history.current().is_none());
    }

    #[test]
    fn restore_clamps_a_stale_cursor() {
        let snapshots = vec![Snapshot {
            template: template("1"),
            taken_at: Utc::now(),
        }];
        let history = TemplateHistory::restore(snapshots, Some(7));
        assert_eq!(history.position(), 1);
    }
}
