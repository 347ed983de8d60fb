//! Linear snapshot history for undo/redo.

use crate::scene::{Scene, SceneState};
use std::sync::Arc;

/// An immutable recorded scene state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    revision: u64,
    state: Arc<SceneState>,
}

impl Snapshot {
    /// Monotonically increasing across the life of the history.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }
}

/// Undo and redo stacks of whole-scene snapshots.
///
/// The bottom undo entry is the baseline the history was created with and is
/// never undone, so `undo` needs at least two entries.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    next_revision: u64,
    limit: Option<usize>,
}

impl History {
    /// Start a history whose baseline is the current state of `scene`.
    pub fn new(scene: &Scene) -> Self {
        let mut history = Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_revision: 0,
            limit: None,
        };
        history.record(scene);
        history
    }

    /// Keep at most `limit` undo entries (baseline included, minimum 2).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(2));
        self.enforce_limit();
        self
    }

    /// Push a snapshot of `scene` and clear the redo stack.
    pub fn record(&mut self, scene: &Scene) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        self.undo_stack.push(Snapshot {
            revision,
            state: Arc::new(scene.capture()),
        });
        self.redo_stack.clear();
        self.enforce_limit();
        log::trace!("Recorded snapshot r{revision} ({} undo entries)", self.undo_stack.len());
        revision
    }

    /// Step back. Returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let top = self.undo_stack.pop()?;
        self.redo_stack.push(top);
        self.undo_stack.last().cloned()
    }

    /// Step forward. Returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(snapshot.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The state the scene should currently be in.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.undo_stack.len() > limit {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Drawable, Rectangle, SerializableColor};
    use kurbo::Point;

    fn scene() -> Scene {
        Scene::new(100, 100, SerializableColor::white())
    }

    fn add_rect(scene: &mut Scene) {
        scene.add(Drawable::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
    }

    #[test]
    fn test_baseline_cannot_be_undone() {
        let scene = scene();
        let mut history = History::new(&scene);
        assert_eq!(history.undo_len(), 1);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_undo_redo() {
        let mut scene = scene();
        let mut history = History::new(&scene);
        add_rect(&mut scene);
        let r1 = history.record(&scene);
        add_rect(&mut scene);
        let r2 = history.record(&scene);
        assert!(r2 > r1);

        let restored = history.undo().unwrap();
        assert_eq!(restored.revision(), r1);
        assert_eq!(restored.state().objects.len(), 1);
        assert!(history.can_redo());

        let redone = history.redo().unwrap();
        assert_eq!(redone.revision(), r2);
        assert_eq!(redone.state().objects.len(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut scene = scene();
        let mut history = History::new(&scene);
        add_rect(&mut scene);
        history.record(&scene);
        history.undo();
        assert_eq!(history.redo_len(), 1);

        history.record(&scene);
        assert_eq!(history.redo_len(), 0);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_does_not_deduplicate() {
        let scene = scene();
        let mut history = History::new(&scene);
        history.record(&scene);
        history.record(&scene);
        assert_eq!(history.undo_len(), 3);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut scene = scene();
        let mut history = History::new(&scene).with_limit(Some(3));
        for _ in 0..5 {
            add_rect(&mut scene);
            history.record(&scene);
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.current().map(Snapshot::revision), Some(5));
        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().map(|s| s.state().objects.len()), Some(3));
    }
}
