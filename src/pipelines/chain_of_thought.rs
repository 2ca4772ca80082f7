use async_trait::async_trait;

use crate::clients::{ModelError, VisionModel};
use crate::config::AgentConfig;
use crate::dataset::DatasetRow;
use crate::pipelines::AnswerStrategy;
use crate::prompts::{NO_CONTEXT, NO_PLAN, extract_prompt, plan_prompt, synthesis_prompt};

/// Plan, observe, answer: three dependent completions per row.
pub struct ChainOfThoughtStrategy {
    plan_max_tokens: u32,
    extract_max_tokens: u32,
    answer_max_tokens: Option<u32>,
}

impl ChainOfThoughtStrategy {
    pub fn new(agent: &AgentConfig) -> Self {
        Self {
            plan_max_tokens: agent.plan_max_tokens,
            extract_max_tokens: agent.extract_max_tokens,
            answer_max_tokens: agent.answer_max_tokens,
        }
    }
}

#[async_trait]
impl AnswerStrategy for ChainOfThoughtStrategy {
    fn name(&self) -> &'static str {
        "dl"
    }

    async fn answer(&self, model: &dyn VisionModel, row: &DatasetRow) -> Result<String, ModelError> {
        let image = Some(row.image_path.as_path());

        let plan = model
            .infer(&plan_prompt(&row.question), image, Some(self.plan_max_tokens))
            .await?
            .into_iter()
            .next()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_PLAN.to_string());

        let context = model
            .infer(extract_prompt(), image, Some(self.extract_max_tokens))
            .await?
            .into_iter()
            .next()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_CONTEXT.to_string());

        // TODO: decide whether placeholder text should reach the synthesis prompt or skip the row
        let final_prompt = synthesis_prompt(&row.question, &plan, &context);
        let completions = model
            .infer(&final_prompt, image, self.answer_max_tokens)
            .await?;
        Ok(completions.into_iter().next().unwrap_or_default())
    }
}
