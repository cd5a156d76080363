//! Physics
//!
//! Only box overlap and push-out for now; there is no rigid body simulation.

pub mod collision;

pub use collision::{collision_response, resolve_penetrations};
