//! Loading feature matrices
//!
//! Computing the representations is left to the caller; this module only
//! reads matrices that were already dumped to disk.

pub mod csv;

pub use self::csv::*;
