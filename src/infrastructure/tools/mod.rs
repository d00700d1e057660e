//! # Tools Module
//!
//! The in-process filesystem tool set: path confinement, file operations and the
//! registry that validates arguments and dispatches by tool name.

pub mod file_ops;
pub mod path_guard;
pub mod registry;
