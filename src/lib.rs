//! Tap detection for touch displays.
//!
//! A bound region turns a completed single-point touch into an immediate
//! activation on the element under it and suppresses the platform's own
//! delayed activation, with exceptions for elements that need native
//! handling or explicit focus.

pub mod binding;
pub mod classify;
pub mod config;
pub mod events;
#[cfg(feature = "feedback")]
pub mod feedback;
pub mod geometry;
pub mod gesture;
pub mod options;
pub mod platform;
pub mod resolve;
pub mod tree;
pub mod virtual_tree;

pub use binding::{BindError, FastTap};
pub use events::{
    ActivationSignal, Disposition, Modifiers, RegionEvent, SyntheticActivation, TouchInput,
    TouchPhase, TouchPoint,
};
pub use geometry::{Point, Rect, ScrollOffset};
pub use gesture::{GestureEngine, GestureSession, Invalidation, TapDecision, TapTrace};
pub use options::{FeedbackOptions, Options};
pub use platform::{Capabilities, PlatformProbe};
pub use tree::{EventKind, EventTarget, Listener, ListenerId, NodeId, NodeKind, Phase, VisualTree};
pub use virtual_tree::VirtualTree;
