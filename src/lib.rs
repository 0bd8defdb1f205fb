// marketbrief - Market Intelligence Briefing Generator
// Synthesizes a periodic market report from price performance data and themed
// news coverage, with LLM-written prose and mandatory source attribution.

#![deny(clippy::unwrap_used)]

pub mod cli;
pub mod config;
pub mod data;
pub mod llm;
pub mod report;

// Re-export commonly used items
pub use config::Config;
pub use data::{Article, ClosePoint, Instrument};
pub use report::{GeneratedReport, ReportError, ReportPipeline, ReportRange};
