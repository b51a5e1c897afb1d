//! Shared utility functions.

pub mod csv;
pub mod env;
pub mod retry;
pub mod template;
