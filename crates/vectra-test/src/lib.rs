//! VECTRA Test - multi-node harness
//!
//! Spins up real node servers in-process so scenario tests exercise the
//! full stack: wire encoding, TCP transport, connection caching, and the
//! per-node lock discipline, not just the pure state machine.

pub mod cluster;

pub use cluster::Cluster;
