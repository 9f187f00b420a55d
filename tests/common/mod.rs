//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Mock feedback endpoint helpers
//! - Provider and store fixtures

pub mod fixtures;
pub mod mock_server;

// Re-export commonly used utilities
pub use fixtures::*;
pub use mock_server::*;
