//! Role-gated approval workflow for telescope observation plans.
//!
//! Astronomers draft plans, Science Observers issue the official verdict,
//! and Telescope Operators execute the observing programs derived from
//! approved plans. The entry points live in [`service`].

pub mod advisor;
pub mod audit;
pub mod authority;
pub mod error;
pub mod fields;
pub mod role;
pub mod service;
pub mod state;

pub use error::{Entity, WorkflowError};
pub use role::{Action, Role};
