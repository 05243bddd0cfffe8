pub mod console;
pub mod error;
pub mod logger;
pub mod output;
pub mod registry;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, RusuiteError};
