//! VECTRA Node - one simulated process
//!
//! A node is a long-running server owning exactly one vector clock, an
//! append-only event history, and an inbox log. It is reachable by multiple
//! independent callers at once - the driver (local events, sends, state
//! polls) and any peer (receives) - so every state-touching operation runs
//! under a single per-node lock. The outbound network leg of a send happens
//! *outside* that lock; only the clock mutation is serialized.

pub mod config;
pub mod process;
pub mod server;
pub mod service;

pub use config::NodeConfig;
pub use process::ProcessNode;
pub use server::{spawn, NodeHandle};
pub use service::NodeService;
