//! Jeonse fraud risk engine
//!
//! Reads the recognized text of a 등기사항전부증명서 (real estate registry
//! certificate), locates the property, finds the closest comparable officetel
//! sale, and scores the lease's risk from the deposit ratio and the
//! encumbrances recorded on the certificate.

pub mod address;
pub mod config;
pub mod error;
pub mod extractors;
pub mod features;
pub mod lawd;
pub mod patterns;
pub mod pipeline;
pub mod registry;
pub mod risk;
pub mod scoring;
pub mod summary;

pub use address::{parse_address_and_building, RegistrySubject};
pub use config::PipelineConfig;
pub use error::{
    AnalysisError, ConfigError, MalformedRecord, ParseError, ReferenceTableError, RegistryError,
    ScoringError, SetupError, SummaryError,
};
pub use features::extract_features;
pub use lawd::ReferenceTable;
pub use pipeline::{AnalysisPipeline, Capabilities};
pub use registry::{select_best_match, HttpRegistryClient, RegistryClient, TradeItem, TransactionMatcher};
pub use risk::interpret_risk_score;
pub use scoring::{HttpScoringModel, LinearScoringModel, ScoringModel};
pub use summary::{build_prompt, GeminiSummarizer, StaticSummarizer, Summarizer};
