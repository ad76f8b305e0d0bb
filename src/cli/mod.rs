// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for rendering keypoint annotations.
//!
//! This module contains the command-line interface logic, including argument parsing
//! and the `render` command implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Rendering logic.
pub mod render;
