//! Progress markers for callers that resume work after a restart.

use std::sync::{Mutex, PoisonError};

use crate::error::CheckpointError;

/// Sink for processing progress. Persistence is up to the implementation.
pub trait Checkpointer: Send + Sync {
    /// Marks `block_number` as fully processed.
    fn checkpoint_block(&self, block_number: u64) -> Result<(), CheckpointError>;

    fn checkpoint_transaction(
        &self,
        block_number: u64,
        transaction_id: &str,
    ) -> Result<(), CheckpointError>;

    /// Next block to process.
    fn block_number(&self) -> Option<u64>;

    /// Last transaction processed within [`Checkpointer::block_number`].
    fn transaction_id(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct CheckpointState {
    block_number: Option<u64>,
    transaction_id: Option<String>,
}

/// Keeps the checkpoint for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointer {
    state: Mutex<CheckpointState>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        InMemoryCheckpointer::default()
    }
}

impl Checkpointer for InMemoryCheckpointer {
    fn checkpoint_block(&self, block_number: u64) -> Result<(), CheckpointError> {
        let next_block = block_number.checked_add(1).ok_or_else(|| {
            CheckpointError(format!("block number {} has no successor", block_number))
        })?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.block_number = Some(next_block);
        state.transaction_id = None;
        Ok(())
    }

    fn checkpoint_transaction(
        &self,
        block_number: u64,
        transaction_id: &str,
    ) -> Result<(), CheckpointError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.block_number = Some(block_number);
        state.transaction_id = Some(transaction_id.to_string());
        Ok(())
    }

    fn block_number(&self) -> Option<u64> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .block_number
    }

    fn transaction_id(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transaction_id
            .clone()
    }
}
