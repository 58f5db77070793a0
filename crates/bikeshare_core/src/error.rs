//! Errors raised by the simulation kernel and the scenario builder.
//!
//! Every failure is local and synchronous: it is returned from the call that
//! caused it and never retried by the kernel.

use thiserror::Error;

use crate::container::ContainerId;
use crate::process::ProcessId;

/// Errors produced by kernel operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// A timeout was requested with a negative or non-finite delay.
    #[error("invalid delay {delay}: delays must be finite and >= 0")]
    InvalidDelay {
        /// The rejected delay.
        delay: f64,
    },

    /// A resource request of zero units, or of more units than the container can ever hold.
    #[error("invalid amount {amount} for container with capacity {capacity}")]
    InvalidAmount {
        /// Requested amount.
        amount: u32,
        /// Capacity of the target container.
        capacity: u32,
    },

    /// `pop_next` was called with no pending events.
    #[error("event queue is empty")]
    QueueEmpty,

    /// A container was created with a zero capacity or an initial level above capacity.
    #[error("invalid container {name}: level {level}, capacity {capacity}")]
    InvalidContainer {
        name: String,
        level: u32,
        capacity: u32,
    },

    /// The run horizon is NaN.
    #[error("invalid horizon {horizon}")]
    InvalidHorizon { horizon: f64 },

    #[error("unknown container {0:?}")]
    UnknownContainer(ContainerId),

    #[error("unknown or finished process {0:?}")]
    UnknownProcess(ProcessId),

    /// Scenario parameters reference something that does not exist or are out of range.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// A process step failed; the process has been removed and the run aborted.
    #[error("process '{process}' failed: {source}")]
    ProcessFailed {
        process: String,
        #[source]
        source: Box<KernelError>,
    },
}

/// Convenience alias used throughout the crate.
pub type KernelResult<T> = Result<T, KernelError>;
