pub mod listing;
pub mod reporter;
pub mod sink;

pub use listing::registry_table;
pub use reporter::TestReporter;
pub use sink::{OutputSink, SharedBuffer};
