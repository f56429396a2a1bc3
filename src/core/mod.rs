//! Core types and errors for similarity computations

pub mod error;
pub mod types;

pub use self::error::*;
pub use self::types::*;
