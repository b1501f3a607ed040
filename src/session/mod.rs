//! Interactive viewing session
//!
//! This module contains:
//! - Input and signal message types
//! - The interaction mode state
//! - Input handlers driving the viewer

pub mod handlers;
pub mod messages;
pub mod state;

pub use messages::{Input, Key, PointerButton, ViewerEvent};
pub use state::{Mode, Permissions};
