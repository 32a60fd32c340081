//! End-to-end analysis of one registry document
//!
//! recognize → parse address/building → resolve code → match comparable sale
//! → features → score/attribute → grade → summary. The run is synchronous and
//! stops at the first failing stage; no partial report is produced.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use shared_pdf::{
    recognize_document, PageRenderer, PdftoppmRenderer, RecognitionHint, TesseractRecognizer,
    TextRecognizer,
};
use shared_types::{round2, AnalysisReport};
use tracing::{info, warn};

use crate::address::parse_address_and_building;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, ConfigError, SetupError};
use crate::features::extract_features;
use crate::lawd::ReferenceTable;
use crate::registry::{HttpRegistryClient, RegistryClient, TransactionMatcher};
use crate::risk::interpret_risk_score;
use crate::scoring::{HttpScoringModel, LinearScoringModel, ScoringModel};
use crate::summary::{build_prompt, GeminiSummarizer, StaticSummarizer, Summarizer};

/// Shown in place of a generated summary when no summary key is configured
pub const OFFLINE_SUMMARY: &str = "요약 생성기가 설정되지 않아 분석 요약을 제공하지 않습니다.";

/// External engines the pipeline depends on
#[derive(Clone)]
pub struct Capabilities {
    pub renderer: Arc<dyn PageRenderer>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub registry: Arc<dyn RegistryClient>,
    pub scoring: Arc<dyn ScoringModel>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl Capabilities {
    /// Default engines: pdftoppm, Tesseract, the public registry and the configured model/summary
    pub fn from_config(config: &PipelineConfig) -> Result<Self, SetupError> {
        let registry = HttpRegistryClient::new(
            config.registry.endpoint.clone(),
            config.credential.clone(),
            config.registry.page_size,
            config.registry.timeout(),
        )?;
        if config.credential.is_empty() {
            warn!("No registry credential configured; transaction lookups will fail");
        }

        let scoring: Arc<dyn ScoringModel> = match (&config.scoring.endpoint, &config.scoring.model_path) {
            (Some(endpoint), _) => {
                info!("Using scoring service at {}", endpoint);
                Arc::new(HttpScoringModel::new(endpoint.clone(), config.scoring.timeout())?)
            }
            (None, Some(path)) => Arc::new(LinearScoringModel::from_file(path)?),
            (None, None) => {
                return Err(SetupError::Config(ConfigError::InvalidValue {
                    key: "scoring",
                    value: "neither model_path nor endpoint set".to_string(),
                }))
            }
        };

        let summarizer: Arc<dyn Summarizer> = match &config.summary.api_key {
            Some(key) => Arc::new(GeminiSummarizer::new(
                config.summary.endpoint.clone(),
                config.summary.model.clone(),
                key.clone(),
                config.summary.timeout(),
            )?),
            None => {
                warn!("No summary API key configured; using offline summary");
                Arc::new(StaticSummarizer::new(OFFLINE_SUMMARY))
            }
        };

        Ok(Self {
            renderer: Arc::new(PdftoppmRenderer::new(config.renderer_path.clone())),
            recognizer: Arc::new(TesseractRecognizer::new(config.engine_path.clone())),
            registry: Arc::new(registry),
            scoring,
            summarizer,
        })
    }
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
    capabilities: Capabilities,
    reference: Arc<ReferenceTable>,
    hint: RecognitionHint,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig, capabilities: Capabilities, reference: ReferenceTable) -> Self {
        Self {
            config,
            capabilities,
            reference: Arc::new(reference),
            hint: RecognitionHint::default(),
        }
    }

    /// Load the reference table and build the default capabilities
    pub fn from_config(config: PipelineConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let reference =
            ReferenceTable::from_path(&config.reference_table, config.reference_delimiter_byte())?;
        let capabilities = Capabilities::from_config(&config)?;
        Ok(Self::new(config, capabilities, reference))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze a registry PDF already on disk
    pub fn analyze(
        &self,
        pdf_path: &Path,
        area: f64,
        deposit: i64,
    ) -> Result<AnalysisReport, AnalysisError> {
        validate_inputs(area, deposit)?;

        let document = recognize_document(
            pdf_path,
            self.config.dpi,
            self.capabilities.renderer.as_ref(),
            self.capabilities.recognizer.as_ref(),
            &self.hint,
        )?;
        let text = document.full_text();
        info!("Recognized {} page(s)", document.page_count());

        let subject = parse_address_and_building(&text)?;
        info!("Address: {} / building: {}", subject.address, subject.building.as_str());

        let code = self
            .reference
            .resolve_parts(&subject.address)
            .ok_or_else(|| AnalysisError::Lookup(subject.address.to_string()))?;

        let best = TransactionMatcher::new(self.capabilities.registry.as_ref(), self.config.query_year)
            .with_retries(self.config.registry.retries)
            .find_best_match(&code, &subject.building, area)
            .ok_or_else(|| AnalysisError::NoComparableTransaction {
                code: code.to_string(),
                building: subject.building.as_str().to_string(),
            })?;

        let sale_price = best.sale_price();
        let jeonse_ratio = deposit as f64 / sale_price as f64;
        info!(
            "Comparable sale: {} {:.2}㎡ on {} for {} KRW (ratio {:.4})",
            best.complex_name, best.area, best.contract_date, sale_price, jeonse_ratio
        );

        let features = extract_features(&text, jeonse_ratio);
        let score = self.capabilities.scoring.score(&features)?;
        let attributions = self.capabilities.scoring.attribute(&features)?;
        let level = interpret_risk_score(score);

        let prompt = build_prompt(score, level, &attributions);
        let explanation = self.capabilities.summarizer.summarize(&prompt)?;

        Ok(AnalysisReport {
            address: subject.address.to_string(),
            building: subject.building.as_str().to_string(),
            sale_price,
            jeonse_price: deposit,
            jeonse_ratio: round2(jeonse_ratio * 100.0),
            risk_score: round2(score),
            risk_level: level.label().to_string(),
            risk_message: level.message().to_string(),
            shap: attributions,
            llm_explanation: explanation,
        })
    }

    /// Analyze an uploaded document; the scratch copy is removed on every exit path
    pub fn analyze_bytes(
        &self,
        bytes: &[u8],
        area: f64,
        deposit: i64,
    ) -> Result<AnalysisReport, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::InvalidInput("uploaded file is empty".to_string()));
        }

        let mut upload = tempfile::Builder::new()
            .prefix("registry-")
            .suffix(".pdf")
            .tempfile()?;
        upload.write_all(bytes)?;
        upload.flush()?;

        self.analyze(upload.path(), area, deposit)
    }
}

fn validate_inputs(area: f64, deposit: i64) -> Result<(), AnalysisError> {
    if !area.is_finite() || area <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!("area must be positive, got {}", area)));
    }
    if deposit <= 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "jeonse_price must be positive, got {}",
            deposit
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fakes for every capability

    use super::*;
    use crate::error::RegistryError;
    use crate::registry::TradeItem;
    use crate::scoring::LinearScoringModel;
    use image::{DynamicImage, GrayImage, Luma};
    use shared_pdf::{DocumentError, PageVisitor};
    use shared_types::AdministrativeCode;
    use std::path::PathBuf;
    use std::sync::Mutex;

    pub const REGISTRY_TEXT: &str = "등기사항전부증명서(말소사항 포함) - 집합건물\n\
        [집합건물] 경기도 성남시 분당구 정자동 123-4 정자오피스텔 제1층 제101호\n\
        신탁 원부 제2024-11호\n\
        근저당권설정 채권최고액 근저당권설정금 50,000,000원\n";

    pub const REFERENCE_CSV: &str = "법정동코드,시도명,시군구명,읍면동명\n\
        4113510300,경기도,성남시분당구,정자동\n\
        1168010100,서울특별시,강남구,역삼동\n";

    /// Records every path it was asked to render
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub paths: Mutex<Vec<PathBuf>>,
    }

    impl PageRenderer for RecordingRenderer {
        fn render(
            &self,
            pdf_path: &Path,
            _dpi: u32,
            visit: &mut PageVisitor<'_>,
        ) -> Result<usize, DocumentError> {
            assert!(pdf_path.exists());
            self.paths.lock().unwrap().push(pdf_path.to_path_buf());
            visit(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                8,
                8,
                Luma([230u8]),
            )))?;
            Ok(1)
        }
    }

    pub struct FixedText(pub String);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _image: &GrayImage, _hint: &RecognitionHint) -> Result<String, DocumentError> {
            Ok(self.0.clone())
        }
    }

    pub struct FixedRegistry(pub Vec<TradeItem>);

    impl RegistryClient for FixedRegistry {
        fn fetch_month(
            &self,
            _code: &AdministrativeCode,
            deal_ymd: &str,
        ) -> Result<Vec<TradeItem>, RegistryError> {
            Ok(self
                .0
                .iter()
                .filter(|item| {
                    let month = item.deal_month.as_deref().unwrap_or("");
                    format!("2024{:0>2}", month) == deal_ymd
                })
                .cloned()
                .collect())
        }
    }

    pub fn trade(name: &str, area: &str, month: &str, amount: &str) -> TradeItem {
        TradeItem {
            complex_name: Some(name.to_string()),
            area: Some(area.to_string()),
            deal_year: Some("2024".to_string()),
            deal_month: Some(month.to_string()),
            deal_day: Some("15".to_string()),
            deal_amount: Some(amount.to_string()),
        }
    }

    pub fn linear_model() -> LinearScoringModel {
        LinearScoringModel::new(10.0, [50.0, 15.0, 4.0, 8.0, 8.0, 2.0, 12.0], [0.7, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    pub fn capabilities(text: &str, trades: Vec<TradeItem>) -> (Capabilities, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::default());
        let capabilities = Capabilities {
            renderer: renderer.clone(),
            recognizer: Arc::new(FixedText(text.to_string())),
            registry: Arc::new(FixedRegistry(trades)),
            scoring: Arc::new(linear_model()),
            summarizer: Arc::new(StaticSummarizer::new("위험 요약")),
        };
        (capabilities, renderer)
    }

    pub fn pipeline(text: &str, trades: Vec<TradeItem>) -> (AnalysisPipeline, Arc<RecordingRenderer>) {
        let (capabilities, renderer) = capabilities(text, trades);
        let reference = ReferenceTable::from_reader(REFERENCE_CSV.as_bytes(), b',').unwrap();
        (
            AnalysisPipeline::new(PipelineConfig::default(), capabilities, reference),
            renderer,
        )
    }

    pub fn default_trades() -> Vec<TradeItem> {
        vec![
            trade("정자오피스텔", "24.10", "2", "19,000"),
            trade("정자오피스텔", "29.90", "6", "23,500"),
            trade("분당오피스텔", "30.00", "7", "40,000"),
        ]
    }
}
