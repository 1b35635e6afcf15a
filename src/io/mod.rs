/*!
Helper functions for saving a chain's trace to disk.
*/

#[cfg(feature = "csv")]
pub mod csv;
