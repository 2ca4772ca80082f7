#![allow(dead_code)]
//! Deterministic `VisionModel` doubles shared by the integration tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vqa_bench::{ModelError, VisionModel};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: Option<PathBuf>,
    pub max_new_tokens: Option<u32>,
}

/// Replays queued responses in order; an exhausted queue answers with no completions.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<Vec<String>, ModelError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<Vec<String>, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answers: &[&str]) -> Self {
        Self::new(answers.iter().map(|a| Ok(vec![a.to_string()])).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn infer(
        &self,
        prompt: &str,
        image: Option<&Path>,
        max_new_tokens: Option<u32>,
    ) -> Result<Vec<String>, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            image: image.map(Path::to_path_buf),
            max_new_tokens,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Judge double that always gives the same reply
pub struct FixedJudge {
    reply: Result<Vec<String>, String>,
    prompts: Mutex<Vec<String>>,
}

impl FixedJudge {
    pub fn says(reply: &str) -> Self {
        Self {
            reply: Ok(vec![reply.to_string()]),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for FixedJudge {
    async fn infer(
        &self,
        prompt: &str,
        _image: Option<&Path>,
        _max_new_tokens: Option<u32>,
    ) -> Result<Vec<String>, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(v) => Ok(v.clone()),
            Err(m) => Err(ModelError::Unavailable(m.clone())),
        }
    }

    fn name(&self) -> &str {
        "fixed-judge"
    }
}

pub fn row(image_id: &str, question: &str, answer: &str, image_path: impl Into<PathBuf>) -> vqa_bench::DatasetRow {
    vqa_bench::DatasetRow {
        image_id: image_id.to_string(),
        question: question.to_string(),
        ground_truth_answer: answer.to_string(),
        image_path: image_path.into(),
    }
}
