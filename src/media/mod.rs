//! Media element abstraction
//!
//! This module provides:
//! - The `MediaElement` capability the coordinator drives
//! - Video identifiers
//! - Media engine errors
//! - A scripted in-memory element for tests and simulations

pub mod element;
pub mod error;
pub mod scripted;

pub use element::{MediaElement, VideoId};
pub use error::PlayError;
pub use scripted::{ElementSnapshot, ScriptedElement, ScriptedPlay};
