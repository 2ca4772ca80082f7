use async_trait::async_trait;

use crate::clients::{ModelError, VisionModel};
use crate::dataset::DatasetRow;
use crate::pipelines::AnswerStrategy;
use crate::prompts::classic_prompt;
use crate::vision::SceneDetector;

/// CV-augmented pipeline: detector facts become a textual scene context
/// the model is told to answer from.
pub struct ClassicStrategy {
    detector: SceneDetector,
    max_new_tokens: Option<u32>,
}

impl ClassicStrategy {
    pub fn new(detector: SceneDetector, max_new_tokens: Option<u32>) -> Self {
        Self {
            detector,
            max_new_tokens,
        }
    }

    pub fn build_prompt(&self, row: &DatasetRow) -> String {
        let facts = self.detector.detect_path(&row.image_path);
        tracing::debug!(image_id = %row.image_id, objects = facts.len(), "scene context built");
        classic_prompt(&facts, &row.question)
    }
}

#[async_trait]
impl AnswerStrategy for ClassicStrategy {
    fn name(&self) -> &'static str {
        "classic"
    }

    async fn answer(&self, model: &dyn VisionModel, row: &DatasetRow) -> Result<String, ModelError> {
        let prompt = self.build_prompt(row);
        let completions = model
            .infer(&prompt, Some(&row.image_path), self.max_new_tokens)
            .await?;
        Ok(completions.into_iter().next().unwrap_or_default())
    }
}
