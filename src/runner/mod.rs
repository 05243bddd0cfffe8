pub mod discovery;
pub mod executor;
pub mod orchestrator;
pub mod types;

pub use discovery::{Discovery, DiscoveryEntry, discover_available};
pub use executor::{Execution, Interpreter, SuiteExecutor, is_interrupted};
pub use orchestrator::{Orchestrator, RunSettings, count_screenshots};
pub use types::{AvailableSuite, RunReport, RunSummary, SuiteOutcome, TestSuiteResult};
