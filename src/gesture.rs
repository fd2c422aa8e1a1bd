//! Tap disambiguation for one bound region.
//!
//! A statig machine tracks the touch sequence (`idle` / `tracking`) and
//! applies the movement and scroll tolerances; the engine around it resolves
//! and classifies the release target, dispatches the forwarded activation and
//! decides what the platform's delayed activation gets.

mod engine;
mod trace;

pub use engine::{GestureEngine, GestureSession};
pub use trace::{Invalidation, TapDecision, TapTrace};

#[cfg(test)]
mod tests;
