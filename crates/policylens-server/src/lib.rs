//! # policylens-server
//!
//! HTTP surface for PolicyLens: the `/brief` generation route, the
//! `/health` liveness constant, and the graceful-degradation mapping that
//! keeps generation failures from ever surfacing as transport errors.

pub mod handlers;
pub mod server;

pub use server::{build_app, AppState};
