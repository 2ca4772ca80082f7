use async_trait::async_trait;

use crate::clients::{ModelError, VisionModel};
use crate::dataset::DatasetRow;
use crate::pipelines::AnswerStrategy;

/// Control baseline: the raw question and image go straight to the model
pub struct ZeroShotStrategy {
    max_new_tokens: Option<u32>,
}

impl ZeroShotStrategy {
    pub fn new(max_new_tokens: Option<u32>) -> Self {
        Self { max_new_tokens }
    }
}

#[async_trait]
impl AnswerStrategy for ZeroShotStrategy {
    fn name(&self) -> &'static str {
        "zero-shot"
    }

    async fn answer(&self, model: &dyn VisionModel, row: &DatasetRow) -> Result<String, ModelError> {
        let completions = model
            .infer(&row.question, Some(&row.image_path), self.max_new_tokens)
            .await?;
        match completions.into_iter().next() {
            Some(answer) => Ok(answer),
            None => {
                tracing::warn!("Model returned no answer for image {}", row.image_id);
                Ok(String::new())
            }
        }
    }
}
