//! Agent pipelines and the shared evaluation driver
//!
//! Every pipeline answers one row at a time through an [`AnswerStrategy`];
//! [`evaluate`] owns the loop, the judging and the partial-failure contract.

pub mod chain_of_thought;
pub mod classic;
pub mod zero_shot;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clients::{ModelError, VisionModel};
use crate::config::Config;
use crate::dataset::{Dataset, DatasetRow};
use crate::judge::{AnswerJudge, Score};
use crate::vision::SceneDetector;

pub use chain_of_thought::ChainOfThoughtStrategy;
pub use classic::ClassicStrategy;
pub use zero_shot::ZeroShotStrategy;

/// Produces the model-under-test's answer for one dataset row
#[async_trait]
pub trait AnswerStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn answer(&self, model: &dyn VisionModel, row: &DatasetRow) -> Result<String, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    ZeroShot,
    Classic,
    Dl,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [PipelineKind::ZeroShot, PipelineKind::Classic, PipelineKind::Dl];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::ZeroShot => "zero-shot",
            PipelineKind::Classic => "classic",
            PipelineKind::Dl => "dl",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero-shot" | "zero_shot" | "zeroshot" => Ok(PipelineKind::ZeroShot),
            "classic" | "cv" => Ok(PipelineKind::Classic),
            "dl" | "cot" | "chain-of-thought" => Ok(PipelineKind::Dl),
            other => Err(format!("unknown pipeline '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub row_index: usize,
    pub answer_text: String,
}

/// The row that stopped a run early
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub image_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub pipeline: String,
    /// correct / judged, or 0 when nothing was judged
    pub accuracy: f64,
    pub predictions: Vec<Prediction>,
    pub scores: Vec<Score>,
    /// Set when a row failed and the run stopped early
    pub halted: Option<RowFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EvaluationResult {
    pub fn judged(&self) -> usize {
        self.scores.len()
    }

    pub fn correct(&self) -> usize {
        self.scores.iter().filter(|&&s| s == 1).count()
    }

    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

/// Strategy for a pipeline, configured from the loaded [`Config`]
pub fn build_strategy(kind: PipelineKind, config: &Config) -> Box<dyn AnswerStrategy> {
    match kind {
        PipelineKind::ZeroShot => Box::new(ZeroShotStrategy::new(config.agent.answer_max_tokens)),
        PipelineKind::Classic => Box::new(ClassicStrategy::new(
            SceneDetector::new(config.detector.clone()),
            config.agent.answer_max_tokens,
        )),
        PipelineKind::Dl => Box::new(ChainOfThoughtStrategy::new(&config.agent)),
    }
}

pub fn accuracy(scores: &[Score]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let correct = scores.iter().filter(|&&s| s == 1).count();
    correct as f64 / scores.len() as f64
}

/// Run one pipeline over the dataset. Rows are processed strictly in
/// order; the first strategy failure stops the run and everything
/// collected before it is returned.
pub async fn evaluate(
    strategy: &dyn AnswerStrategy,
    model: &dyn VisionModel,
    judge: &AnswerJudge<'_>,
    dataset: &Dataset,
) -> EvaluationResult {
    let pipeline = strategy.name();
    let started_at = Utc::now();
    tracing::info!(pipeline, rows = dataset.len(), model = model.name(), "Starting evaluation");

    let mut predictions = Vec::with_capacity(dataset.len());
    let mut scores = Vec::with_capacity(dataset.len());
    let mut halted = None;

    for (index, row) in dataset.rows().iter().enumerate() {
        let answer_text = match strategy.answer(model, row).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(
                    pipeline,
                    row = index,
                    image_id = %row.image_id,
                    image = %row.image_path.display(),
                    question = %row.question,
                    "Error during {} loop, stopping after {} judged rows: {}",
                    pipeline,
                    scores.len(),
                    e
                );
                halted = Some(RowFailure {
                    row_index: index,
                    image_id: row.image_id.clone(),
                    error: e.to_string(),
                });
                break;
            }
        };

        let score = judge
            .judge(&row.question, &answer_text, &row.ground_truth_answer)
            .await;
        tracing::debug!(pipeline, row = index, score, answer = %answer_text, "row judged");

        predictions.push(Prediction {
            row_index: index,
            answer_text,
        });
        scores.push(score);
    }

    let accuracy = accuracy(&scores);
    if halted.is_none() {
        tracing::info!(pipeline, "Evaluation complete. Accuracy: {:.4}", accuracy);
    } else {
        tracing::warn!(
            pipeline,
            judged = scores.len(),
            "Evaluation halted early. Partial accuracy: {:.4}",
            accuracy
        );
    }

    EvaluationResult {
        pipeline: pipeline.to_string(),
        accuracy,
        predictions,
        scores,
        halted,
        started_at,
        finished_at: Utc::now(),
    }
}
