//! Flame timeline export.
//!
//! This module converts flow-labeled traces into evented speedscope
//! profiles, which show every call as a frame on a timeline.

pub mod speedscope;

// Re-export main types
pub use speedscope::{
    convert,
    EventType,
    SpeedscopeEvent,
    SpeedscopeFrame,
    SpeedscopeProfile,
    SpeedscopeReport,
};
