//! CLI output utilities for the interactive session.
//!
//! Headers, help and stats blocks, and state transition lines. Routed room
//! messages are rendered by [`crate::display`].

mod boxes;

pub use boxes::*;
