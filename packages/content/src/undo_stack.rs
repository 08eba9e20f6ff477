//! # Undo/Redo Stack
//!
//! Tracks command history and enables undo/redo.
//!
//! ## Design
//!
//! - Each command is recorded as a batch of primitive operations plus the
//!   inverses produced while applying them
//! - Undo applies the inverses (most recent first) and moves the batch to the
//!   redo stack
//! - Redo reapplies the original operations
//! - New commands clear the redo stack

use crate::command::Command;
use crate::errors::ContentError;
use crate::operations::{Operation, TreeState};

/// Operations of one command, undone/redone together
#[derive(Debug, Clone)]
pub struct OperationBatch {
    /// The operations in this batch (in application order)
    pub operations: Vec<Operation>,

    /// The inverse operations (in reverse order for undo)
    pub inverses: Vec<Operation>,

    /// The command that produced this batch
    pub command: Option<Command>,
}

impl OperationBatch {
    fn empty() -> Self {
        Self {
            operations: Vec::new(),
            inverses: Vec::new(),
            command: None,
        }
    }
}

/// Undo/redo stack for a content store
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<OperationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<OperationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<OperationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply an operation and record it for undo
    pub fn apply(&mut self, operation: Operation, state: &mut TreeState) -> Result<(), ContentError> {
        let inverse = operation.apply(state)?;

        if let Some(batch) = &mut self.current_batch {
            batch.operations.push(operation);
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(OperationBatch {
                operations: vec![operation],
                inverses: vec![inverse],
                command: None,
            });
        }

        Ok(())
    }

    /// Start a batch of operations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(OperationBatch::empty());
    }

    /// End the current batch, tag it with `command` and push it
    pub fn end_batch(&mut self, command: Command) {
        if let Some(mut batch) = self.current_batch.take() {
            if !batch.operations.is_empty() {
                batch.command = Some(command);
                self.push_batch(batch);
            }
        }
    }

    /// Roll back whatever the current batch applied so far and drop it
    pub fn abort_batch(&mut self, state: &mut TreeState) {
        if let Some(batch) = self.current_batch.take() {
            for inverse in &batch.inverses {
                if let Err(error) = inverse.apply(state) {
                    tracing::warn!(%error, operation = inverse.name(), "Failed to roll back aborted batch");
                }
            }
        }
    }

    fn push_batch(&mut self, batch: OperationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch, returning the command it undid
    pub fn undo(&mut self, state: &mut TreeState) -> Result<Option<Command>, ContentError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Err(ContentError::NothingToUndo);
        };

        for inverse in &batch.inverses {
            inverse.apply(state)?;
        }

        let command = batch.command.clone();
        self.redo_stack.push(batch);
        Ok(command)
    }

    /// Redo the most recently undone batch, returning the command it redid
    pub fn redo(&mut self, state: &mut TreeState) -> Result<Option<Command>, ContentError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Err(ContentError::NothingToRedo);
        };

        for operation in &batch.operations {
            operation.apply(state)?;
        }

        let command = batch.command.clone();
        self.undo_stack.push(batch);
        Ok(command)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
