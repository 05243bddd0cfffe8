pub mod config;
pub mod types;

pub use config::{LoadedRegistry, RegistryLoader, RegistrySource};
pub use types::{SuiteRegistry, TestSuiteDescriptor};
