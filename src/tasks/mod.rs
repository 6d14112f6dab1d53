//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Deadline Sweep: Notifies clients about approaching and passed deadlines

mod deadline;

pub use deadline::{spawn_deadline_sweep, sweep_once, SweepReport};
