// Public modules
pub mod composer;
pub mod defaults;
pub mod error;
pub mod files;
pub mod replace;
pub mod setup;
pub mod stub;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
