//! # Application Layer
//!
//! The conversation state machine that ties the model to the tool gateway, and process
//! setup shared by both binaries.

pub mod logging;
pub mod orchestrator;
