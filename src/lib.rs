pub mod clients;
pub mod config;
pub mod dataset;
pub mod error;
pub mod judge;
pub mod pipelines;
pub mod prompts;
pub mod telemetry;
pub mod vision;

pub use clients::{ModelError, OpenAiCompatClient, VisionModel};
pub use config::Config;
pub use dataset::{Dataset, DatasetRow};
pub use error::{BenchError, Result};
pub use judge::{AnswerJudge, Score};
pub use pipelines::{AnswerStrategy, EvaluationResult, PipelineKind, Prediction, evaluate};
pub use vision::{SceneColor, SceneDetector, SceneFact, Shape};

/// Run every requested pipeline over the same dataset, one after another.
pub async fn run_pipelines(
    kinds: &[PipelineKind],
    config: &Config,
    model: &dyn VisionModel,
    judge_model: &dyn VisionModel,
    dataset: &Dataset,
) -> Vec<EvaluationResult> {
    let judge = AnswerJudge::new(judge_model, config.agent.judge_max_tokens);
    let mut results = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let strategy = pipelines::build_strategy(kind, config);
        results.push(evaluate(strategy.as_ref(), model, &judge, dataset).await);
    }
    results
}
