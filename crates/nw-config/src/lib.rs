mod alert;
mod analyzer;
mod input;
mod logging;
mod types;
mod validate;
mod watch;

pub use alert::AlertConfig;
pub use analyzer::AnalyzerConfig;
pub use input::InputConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use types::HumanDuration;
pub use watch::WatchConfig;
