//! LLM-as-judge scoring of candidate answers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::clients::VisionModel;
use crate::prompts::judge_prompt;

static YES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\byes\b").expect("static regex"));
static NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bno\b").expect("static regex"));

/// Binary verdict: 1 when the judge accepted the answer, 0 otherwise
pub type Score = u8;

/// Map judge completions to a score. Unclear output counts as incorrect.
pub fn parse_verdict(completions: &[String]) -> Score {
    let Some(first) = completions.first() else {
        tracing::warn!("Judge model returned no response.");
        return 0;
    };

    let decision = first.trim().to_lowercase();
    if YES.is_match(&decision) {
        1
    } else if NO.is_match(&decision) {
        0
    } else {
        tracing::warn!("Judge model returned ambiguous response: '{}'", first);
        0
    }
}

pub struct AnswerJudge<'a> {
    model: &'a dyn VisionModel,
    max_new_tokens: u32,
}

impl<'a> AnswerJudge<'a> {
    pub fn new(model: &'a dyn VisionModel, max_new_tokens: u32) -> Self {
        Self {
            model,
            max_new_tokens,
        }
    }

    /// Never fails: inference errors are logged and scored 0.
    pub async fn judge(&self, question: &str, model_answer: &str, ground_truth: &str) -> Score {
        let prompt = judge_prompt(question, model_answer, ground_truth);
        match self
            .model
            .infer(&prompt, None, Some(self.max_new_tokens))
            .await
        {
            Ok(completions) => parse_verdict(&completions),
            Err(e) => {
                tracing::error!(judge = self.model.name(), "Error during judge inference: {}", e);
                0
            }
        }
    }
}
