//! Common module
//!
//! This module contains shared types, errors, and utility functions used throughout the application.

pub mod error;
pub mod log;
pub mod net;

// Re-export commonly used types and functions
pub use error::{DetectError, Result};
pub use log::init_logger;
pub use net::{parse_target, Target};
