//! VECTRA Wire - request/response protocol encoding
//!
//! A deliberately small, statically-tagged RPC format: every frame is one
//! request or one response, identified by a fixed tag byte. There is no
//! dynamic method dispatch - exactly five node operations (plus a liveness
//! ping) are expressible on the wire, and nothing else.
//!
//! This crate is pure encode/decode; all I/O lives in `vectra-transport`.

pub mod frame;
pub mod header;
pub mod message;

pub use frame::*;
pub use header::*;
pub use message::*;
