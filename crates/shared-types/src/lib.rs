pub mod report;
pub mod types;

pub use report::{round2, AnalysisReport, Attribution, Direction, RiskLevel};
pub use types::{
    AdministrativeCode, BuildingName, FeatureRecord, ParsedAddress, RecognizedDocument,
    RecognizedPage, TradeRecord, FEATURE_COLUMNS,
};
