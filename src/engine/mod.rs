pub mod core;
pub mod drivers;

// Re-export key components
pub use core::{Diagnostics, SessionAnalysis, SessionAnalyzer};
pub use drivers::EventContext;
