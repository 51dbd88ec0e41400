//! # stave-types
//!
//! Shared type definitions for the stave history engine.
//! This crate holds the payload format every tracked item speaks
//! ([`SerializedTree`]), the delta descriptors produced by diffing, and the
//! timeline/track events that the diff logic in `stave-core` understands.

pub mod delta;
pub mod event;
pub mod tree;

pub use delta::*;
pub use event::*;
pub use tree::*;
