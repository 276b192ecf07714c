//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the GUI runtime:
//! - Math types and operations
//! - Collections and handle types
//! - Frame time tracking
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
