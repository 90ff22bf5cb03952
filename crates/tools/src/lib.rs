//! cwburst Tools library

pub mod common;
pub mod report;

pub use common::{init_logging, load_config, save_config, session_texts, EngineArgs};
pub use report::{code_chart, timing_report};
