//! Prompt templates for the judge and the agent pipelines
//!
//! Every user-supplied string is embedded verbatim; nothing is escaped or
//! truncated, so what the model sees matches the dataset row exactly.

use crate::vision::SceneFact;

/// Placeholder used when the planning step returns no completion
pub const NO_PLAN: &str = "No plan generated.";
/// Placeholder used when the extraction step returns no completion
pub const NO_CONTEXT: &str = "No context extracted.";

pub fn judge_prompt(question: &str, model_answer: &str, ground_truth: &str) -> String {
    format!(
        r#"
You are an expert evaluator for a Visual Question Answering task.
Your goal is to determine if the "Model's Answer" correctly and concisely answers the "Question" based on the "Ground Truth Answer".

The answer must be semantically equivalent, even if phrased differently.
For "Is the..." questions, the answer must match (e.G., "left" matches "on the left").
For "What is the shape..." questions, the answer must be the shape (e.g., "square" matches "a red square").
For "What is the color..." questions, the answer must be the color (e.g., "red" matches "the red one").

Respond with only "Yes" or "No". Do not provide any explanation.

---
Question: "{question}"
Ground Truth Answer: "{ground_truth}"
Model's Answer: "{model_answer}"
---

Is the Model's Answer correct?
"#
    )
}

/// Render detector output as the "Scene Context" block
pub fn scene_context(facts: &[SceneFact]) -> String {
    if facts.is_empty() {
        return "Scene Context: No objects were detected by the CV system.".to_string();
    }
    let mut context = String::from("Scene Context: The following objects were detected:\n");
    for fact in facts {
        context.push_str("- ");
        context.push_str(&fact.to_string());
        context.push('\n');
    }
    context
}

pub fn classic_prompt(facts: &[SceneFact], question: &str) -> String {
    format!(
        "{}\nBased *only* on the scene context provided above, answer the following question.\nQuestion: {}",
        scene_context(facts),
        question
    )
}

pub fn plan_prompt(question: &str) -> String {
    format!(
        "To answer the question '{}', what is the step-by-step reasoning plan I should follow? List the steps.",
        question
    )
}

pub fn extract_prompt() -> &'static str {
    "Describe all objects in the image in detail. For each object, list its color, its shape, and its relative position (e.g., top-left, bottom-right)."
}

pub fn synthesis_prompt(question: &str, plan: &str, context: &str) -> String {
    format!(
        "You are a reasoning agent. Use the following information to answer the question.\n\n\
         Original Question: {question}\n\n\
         Reasoning Plan:\n{plan}\n\n\
         Image Context:\n{context}\n\n\
         Based on the plan and context, what is the final, concise answer to the original question?"
    )
}
