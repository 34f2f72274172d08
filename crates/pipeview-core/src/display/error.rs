//! Errors surfaced by the status-line engine.

use std::collections::TryReserveError;

use thiserror::Error;

/// Exit-status bit a caller should set when a tick failed to allocate.
pub const EXIT_DISPLAY_ALLOC: i32 = 64;

/// Failure that suppressed one tick's output. The engine stays usable.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("buffer allocation failed: {0}")]
    BufferAllocation(#[from] TryReserveError),
}

impl DisplayError {
    /// Bit to OR into the process exit status.
    pub fn exit_bit(&self) -> i32 {
        match self {
            DisplayError::BufferAllocation(_) => EXIT_DISPLAY_ALLOC,
        }
    }
}
