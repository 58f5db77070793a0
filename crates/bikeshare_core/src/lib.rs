//! Discrete-event simulation kernel and a bike-sharing model built on it.
//!
//! The kernel (`clock`, `process`, `container`, `runner`) is domain-agnostic:
//! processes are state machines resumed by a single-threaded scheduler over a
//! virtual clock, and containers are bounded counters with FIFO waiters. The
//! bike-share modules (`station`, `demand`, `trip`, `repair`, `generator`,
//! `rebalance`, `monitor`, `scenario`) are one application of it.

pub mod clock;
pub mod config;
pub mod container;
pub mod error;
pub mod process;
pub mod random;
pub mod runner;
pub mod telemetry;

pub mod demand;
pub mod generator;
pub mod monitor;
pub mod rebalance;
pub mod repair;
pub mod scenario;
pub mod station;
pub mod stats;
pub mod trip;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use clock::VirtualTime;
pub use config::RunConfig;
pub use container::{ContainerId, RequestKind, ResourceContainer};
pub use error::{KernelError, KernelResult};
pub use process::{Process, ProcessContext, ProcessId, Step};
pub use runner::{RunReport, RunState, Simulation};
