//! Undo/Redo History
//!
//! Graph mutations are wrapped as [`Command`]s whose `execute` and `undo`
//! are exact inverses over the graph state they touch. The
//! [`CommandManager`] keeps a bounded, linear history of executed commands.
//!
//! # Model
//!
//! The history is a single sequence plus a count of applied commands. The
//! commands before that count can be undone; the ones after it can be
//! redone. Executing a new command discards everything after the count
//! first, so history never branches.
//!
//! When an append pushes the history past its cap, the oldest command is
//! dropped in the same step and the applied count is set to the new length,
//! so the newest command stays the one `undo` reaches first.
//!
//! # Identity
//!
//! Undoing a delete and redoing a create rebuild nodes under new ids. The
//! manager owns one [`IdRenames`] table for its whole history; rebuilding
//! commands record their renames in it and every command resolves its stored
//! ids through it, so older commands still find the nodes they were recorded
//! against.
//!
//! # Re-entrancy
//!
//! A command only ever receives the graph and the rename table, never the
//! manager, so a command cannot push onto the history it is being run from.

mod commands;
mod renames;

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::config::HistoryConfig;
use crate::graph::NodeGraph;

pub use commands::{
    CreateNodeCommand, DeleteNodeCommand, EditTextCommand, MoveNodeCommand, NodeSnapshot,
    ToggleCollapseCommand,
};
pub use renames::IdRenames;

/// An invertible unit of graph mutation.
pub trait Command {
    /// Apply the mutation, resolving stored ids through `renames`.
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames);

    /// Revert exactly what the last `execute` did.
    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames);

    /// Short description for menus and logs.
    fn label(&self) -> &str;
}

/// Bounded, truncating undo/redo history.
pub struct CommandManager {
    history: VecDeque<Box<dyn Command>>,

    /// Number of commands currently applied; `history[applied - 1]` is the
    /// one `undo` reverts next.
    applied: usize,

    max_size: usize,

    renames: IdRenames,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            history: VecDeque::new(),
            applied: 0,
            max_size: config.max_size.max(1),
            renames: IdRenames::new(),
        }
    }

    /// Execute a command and record it, dropping any redo history.
    #[instrument(level = "trace", skip_all, fields(command = command.label()))]
    pub fn execute<C>(&mut self, graph: &mut NodeGraph, mut command: C)
    where
        C: Command + 'static,
    {
        command.execute(graph, &mut self.renames);

        self.history.truncate(self.applied);
        self.history.push_back(Box::new(command));
        if self.history.len() > self.max_size {
            self.history.pop_front();
        }
        self.applied = self.history.len();

        debug!(len = self.history.len(), "command recorded");
    }

    /// Undo the most recent applied command. Returns false if there is none.
    #[instrument(level = "trace", skip_all)]
    pub fn undo(&mut self, graph: &mut NodeGraph) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        let command = &mut self.history[self.applied];
        debug!(command = command.label(), "undo");
        command.undo(graph, &mut self.renames);
        true
    }

    /// Re-execute the next undone command. Returns false if there is none.
    #[instrument(level = "trace", skip_all)]
    pub fn redo(&mut self, graph: &mut NodeGraph) -> bool {
        let Some(command) = self.history.get_mut(self.applied) else {
            return false;
        };
        debug!(command = command.label(), "redo");
        command.execute(graph, &mut self.renames);
        self.applied += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.history.len()
    }

    /// Forget all history and recorded renames. Applied mutations stay
    /// applied. Call this after importing a document.
    pub fn clear(&mut self) {
        self.history.clear();
        self.applied = 0;
        self.renames.clear();
    }

    /// Index of the most recently applied command, `None` when nothing is applied.
    pub fn current_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Number of recorded commands, undone ones included.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Renames recorded so far by restoring commands.
    pub fn renames(&self) -> &IdRenames {
        &self.renames
    }

    pub fn undo_label(&self) -> Option<&str> {
        let index = self.current_index()?;
        self.history.get(index).map(|c| c.label())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.get(self.applied).map(|c| c.label())
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("len", &self.history.len())
            .field("applied", &self.applied)
            .field("max_size", &self.max_size)
            .field("renames", &self.renames.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records execute/undo calls into a shared log.
    struct Recorder {
        name: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: impl Into<String>, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name: name.into(),
                log: log.clone(),
            }
        }
    }

    impl Command for Recorder {
        fn execute(&mut self, _graph: &mut NodeGraph, _renames: &mut IdRenames) {
            self.log.borrow_mut().push(format!("do {}", self.name));
        }

        fn undo(&mut self, _graph: &mut NodeGraph, _renames: &mut IdRenames) {
            self.log.borrow_mut().push(format!("undo {}", self.name));
        }

        fn label(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn empty_history_cannot_move() {
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::new();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
        assert!(!manager.undo(&mut graph));
        assert!(!manager.redo(&mut graph));
        assert_eq!(manager.current_index(), None);
    }

    #[test]
    fn undo_and_redo_walk_the_history() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::new();

        manager.execute(&mut graph, Recorder::new("a", &log));
        manager.execute(&mut graph, Recorder::new("b", &log));
        assert_eq!(manager.current_index(), Some(1));
        assert_eq!(manager.undo_label(), Some("b"));

        assert!(manager.undo(&mut graph));
        assert_eq!(manager.redo_label(), Some("b"));
        assert!(manager.undo(&mut graph));
        assert!(!manager.can_undo());
        assert!(manager.redo(&mut graph));

        assert_eq!(
            *log.borrow(),
            ["do a", "do b", "undo b", "undo a", "do a"]
        );
        assert_eq!(manager.current_index(), Some(0));
    }

    #[test]
    fn executing_after_undo_truncates_redo() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::new();

        manager.execute(&mut graph, Recorder::new("a", &log));
        manager.execute(&mut graph, Recorder::new("b", &log));
        manager.undo(&mut graph);
        manager.execute(&mut graph, Recorder::new("c", &log));

        assert!(!manager.can_redo());
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.undo_label(), Some("c"));
    }

    #[test]
    fn eviction_keeps_index_on_newest_command() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::with_config(HistoryConfig { max_size: 3 });

        for name in ["a", "b", "c", "d"] {
            manager.execute(&mut graph, Recorder::new(name, &log));
        }

        assert_eq!(manager.len(), 3);
        assert_eq!(manager.current_index(), Some(2));
        assert_eq!(manager.undo_label(), Some("d"));
        assert!(!manager.can_redo());

        while manager.undo(&mut graph) {}
        assert_eq!(
            log.borrow()[4..],
            ["undo d", "undo c", "undo b"]
        );
    }

    #[test]
    fn eviction_after_undo_drops_redo_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::with_config(HistoryConfig { max_size: 2 });

        manager.execute(&mut graph, Recorder::new("a", &log));
        manager.execute(&mut graph, Recorder::new("b", &log));
        manager.undo(&mut graph);
        manager.execute(&mut graph, Recorder::new("c", &log));

        // b was truncated, so nothing had to be evicted.
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.current_index(), Some(1));
        manager.undo(&mut graph);
        assert_eq!(manager.undo_label(), Some("a"));
    }

    #[test]
    fn clear_forgets_without_undoing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let mut manager = CommandManager::new();

        manager.execute(&mut graph, Recorder::new("a", &log));
        manager.clear();

        assert!(manager.is_empty());
        assert!(!manager.can_undo());
        assert_eq!(*log.borrow(), ["do a"]);
    }
}
