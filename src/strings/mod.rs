//! # Strings Module
//!
//! Centralizes user-facing strings, log lines and tool output text.

pub mod help;
pub mod logs;
pub mod messages;
pub mod tools;
