//! Terminal output helpers: resolve progress and tree rendering.

pub mod progress;
pub mod tree;
