//! VECTRA Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the VECTRA simulation:
//! - Participant identity (NodeId)
//! - The vector clock engine (VectorClock, CausalOrder)
//! - Event history records and their console-compatible text format
//! - Node state snapshots
//! - Error taxonomy

pub mod clock;
pub mod error;
pub mod history;
pub mod id;
pub mod state;

pub use clock::*;
pub use error::*;
pub use history::*;
pub use id::*;
pub use state::*;
