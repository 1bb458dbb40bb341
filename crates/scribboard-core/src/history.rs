//! Linear undo/redo history over immutable snapshots.

/// How a new snapshot enters the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// A completed user action: drops any redo branch, then becomes a new
    /// undo step.
    Append,
    /// An in-progress edit: replaces the current snapshot in place, so a
    /// whole drag collapses into the step that started it.
    Overwrite,
}

/// Branch-truncating snapshot history.
///
/// Only the snapshot at the current index is live; undo and redo just move
/// the index.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
    limit: Option<usize>,
}

impl<T: Clone> History<T> {
    /// Create a history holding a single initial snapshot.
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: None,
        }
    }

    /// Keep at most `limit` snapshots, dropping the oldest on append.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(1));
        self.enforce_limit();
        self
    }

    /// The live snapshot.
    pub fn current(&self) -> &T {
        &self.snapshots[self.index]
    }

    /// Record `next` as the live snapshot.
    pub fn commit(&mut self, mode: CommitMode, next: T) {
        match mode {
            CommitMode::Overwrite => {
                self.snapshots[self.index] = next;
            }
            CommitMode::Append => {
                self.snapshots.truncate(self.index + 1);
                self.snapshots.push(next);
                self.index += 1;
                self.enforce_limit();
            }
        }
    }

    /// Derive the next snapshot from the live one and commit it.
    pub fn update(&mut self, mode: CommitMode, f: impl FnOnce(&T) -> T) {
        let next = f(self.current());
        self.commit(mode, next);
    }

    /// Step back. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if self.index + 1 < self.snapshots.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of retained snapshots, including any redo branch.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let excess = self.snapshots.len() - limit;
                self.snapshots.drain(..excess);
                self.index = self.index.saturating_sub(excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_undo() {
        let mut history = History::new(0);
        history.commit(CommitMode::Append, 1);
        history.commit(CommitMode::Append, 2);
        assert_eq!(*history.current(), 2);
        assert!(history.undo());
        assert_eq!(*history.current(), 1);
        assert!(history.undo());
        assert_eq!(*history.current(), 0);
        assert!(!history.undo());
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_redo_at_head_is_noop() {
        let mut history = History::new("a");
        history.commit(CommitMode::Append, "b");
        assert!(!history.redo());
        assert_eq!(*history.current(), "b");
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new(vec![0]);
        for i in 1..5 {
            history.update(CommitMode::Append, |prev| {
                let mut next = prev.clone();
                next.push(i);
                next
            });
        }
        let before = history.current().clone();
        assert!(history.undo());
        assert!(history.redo());
        assert_eq!(*history.current(), before);
    }

    #[test]
    fn test_append_truncates_redo_branch() {
        let mut history = History::new(0);
        history.commit(CommitMode::Append, 1);
        history.commit(CommitMode::Append, 2);
        history.undo();
        history.undo();
        history.commit(CommitMode::Append, 10);
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.len(), 2);
        assert_eq!(*history.current(), 10);
    }

    #[test]
    fn test_overwrite_containment() {
        let mut history = History::new(0);
        history.commit(CommitMode::Append, 1);
        for n in 2..12 {
            history.commit(CommitMode::Overwrite, n);
        }
        assert_eq!(*history.current(), 11);
        assert!(history.undo());
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_overwrite_keeps_redo_branch() {
        let mut history = History::new(0);
        history.commit(CommitMode::Append, 1);
        history.undo();
        history.commit(CommitMode::Overwrite, 5);
        assert!(history.can_redo());
        assert!(history.redo());
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(0).with_limit(Some(3));
        for n in 1..6 {
            history.commit(CommitMode::Append, n);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(*history.current(), 5);
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(*history.current(), 3);
    }
}
