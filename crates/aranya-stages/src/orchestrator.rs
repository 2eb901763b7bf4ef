//! Analysis Orchestrator
//!
//! ```text
//! identify ─────────────────────┐
//!                               ├─→ ayurvedic ─→ composite
//! identify ─→ categorize ───────┘
//! ```
//!
//! The two identification calls share the same input and may finish in
//! either order. Any failure aborts the run; earlier results are dropped.
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use aranya_core::{
    run_stage, AnalysisRequest, CompositeResult, ExecutionContext, HerbError, HerbReport,
    StageTrace,
};
use aranya_model::PromptModelClient;

use crate::ayurvedic::{AyurvedicInput, AyurvedicStage};
use crate::categorize::{CategorizeInput, CategorizationStage};
use crate::identify::{IdentificationStage, IdentifyInput};

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Deadline applied to every stage call
    pub stage_timeout: Option<Duration>,
    /// Run identification once and feed categorization from it
    pub dedupe_identification: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            stage_timeout: Some(Duration::from_secs(60)),
            dedupe_identification: false,
        }
    }
}

/// Hook for the outcome of each analysis run (metrics, audit).
pub trait AnalysisObserver: Send + Sync {
    fn completed(&self, _traces: &[StageTrace]) {}

    fn failed(&self, _error: &HerbError) {}
}

pub struct Orchestrator {
    identify: IdentificationStage,
    categorize: CategorizationStage,
    ayurvedic: AyurvedicStage,
    options: OrchestratorOptions,
    observer: Option<Arc<dyn AnalysisObserver>>,
}

impl Orchestrator {
    pub fn new(client: PromptModelClient, options: OrchestratorOptions) -> Self {
        Self {
            identify: IdentificationStage::new(client.clone()),
            categorize: CategorizationStage::new(client.clone()),
            ayurvedic: AyurvedicStage::new(client),
            options,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Fresh context carrying this orchestrator's stage deadline
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new().with_stage_timeout(self.options.stage_timeout)
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> CompositeResult {
        self.analyze_with(request, &self.context()).await
    }

    /// Run one analysis under a caller-supplied context (deadline and
    /// cancellation token).
    pub async fn analyze_with(
        &self,
        request: AnalysisRequest,
        ctx: &ExecutionContext,
    ) -> CompositeResult {
        match self.run(&request, ctx).await {
            Ok((report, traces)) => {
                for trace in &traces {
                    info!(
                        trace_id = %ctx.trace_id,
                        stage = %trace.id,
                        in_hash = %trace.in_hash,
                        out_hash = %trace.out_hash,
                        latency_ms = trace.latency_ms,
                        "stage trace"
                    );
                }
                if let Some(observer) = &self.observer {
                    observer.completed(&traces);
                }
                let total_ms: u64 = traces.iter().map(|t| t.latency_ms).sum();
                info!(
                    trace_id = %ctx.trace_id,
                    herb = %report.identification.common_name,
                    stages = traces.len(),
                    total_ms,
                    "analysis completed"
                );
                CompositeResult::Success(Box::new(report))
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, error = %e, "analysis failed");
                if let Some(observer) = &self.observer {
                    observer.failed(&e);
                }
                CompositeResult::failure(e.user_message())
            }
        }
    }

    /// Typed form of [`analyze_with`](Self::analyze_with): the error keeps
    /// its kind instead of collapsing to a message.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        ctx: &ExecutionContext,
    ) -> Result<(HerbReport, Vec<StageTrace>), HerbError> {
        let photo = request.validate()?;
        let input = IdentifyInput::from_request(request, photo);

        let (primary, second_trace, categorization) = if self.options.dedupe_identification {
            let primary = run_stage(&self.identify, &input, ctx).await?;
            let name = CategorizeInput::new(primary.value.identification.common_name.clone());
            let categorization = run_stage(&self.categorize, &name, ctx).await?;
            (primary, None, categorization)
        } else {
            let chain = async {
                let second = run_stage(&self.identify, &input, ctx).await?;
                let name = CategorizeInput::new(second.value.identification.common_name.clone());
                let categorization = run_stage(&self.categorize, &name, ctx).await?;
                Ok::<_, HerbError>((second.trace, categorization))
            };
            let (primary, (second_trace, categorization)) =
                tokio::try_join!(run_stage(&self.identify, &input, ctx), chain)?;
            (primary, Some(second_trace), categorization)
        };

        let identification = primary.value.identification;
        let details = primary.value.details;
        let ayurvedic_input =
            AyurvedicInput::new(identification.common_name.clone(), details.uses.clone());
        let ayurvedic = run_stage(&self.ayurvedic, &ayurvedic_input, ctx).await?;

        let mut traces = vec![primary.trace];
        traces.extend(second_trace);
        traces.extend([categorization.trace, ayurvedic.trace]);
        let report = HerbReport {
            identification,
            details,
            category: categorization.value,
            ayurvedic: ayurvedic.value,
            location_hint: request.location().map(str::to_string),
            weather_hint: request.weather().map(str::to_string),
        };
        Ok((report, traces))
    }
}
