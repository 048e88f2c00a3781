//! Parse configuration module

pub mod null_handling;
pub mod parse_options;

pub use null_handling::*;
pub use parse_options::*;
