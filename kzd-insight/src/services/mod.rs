//! Insight generation and history services

pub mod engine;
pub mod fallback;
pub mod gemini_client;
pub mod history_summary;
pub mod insight_generator;
pub mod prompt;
pub mod response_parser;

pub use engine::{GeneratedInsight, InsightEngine};
pub use fallback::FallbackGenerator;
pub use gemini_client::{GeminiClient, GeminiError, GeminiSettings};
pub use history_summary::{summarize, HistorySummary};
pub use insight_generator::InsightGenerator;
