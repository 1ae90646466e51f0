//! Input hygiene helpers

pub mod sanitize;

pub use sanitize::{mask_secret, sanitize_input};
