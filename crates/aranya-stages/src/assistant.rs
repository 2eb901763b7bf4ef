//! Aranya, the single-turn plant and Ayurveda assistant.
//!
//! The persona is a two-state gate: off-topic questions get the fixed
//! decline, on-topic answers are passed through. Health questions
//! additionally carry the disclaimer. Every answer ends with the closing
//! phrase.
use async_trait::async_trait;
use serde::Deserialize;

use aranya_core::{ChatAnswer, ChatRequest, Contract, ExecutionContext, HerbError, Stage, Topic};
use aranya_model::PromptModelClient;
use aranya_prompt::ids;

pub const DECLINE: &str =
    "I apologize, but I can only answer questions related to plants, herbs, and Ayurveda.";
pub const DISCLAIMER: &str = "**Disclaimer:** This information is for educational purposes only. Please consult with a qualified healthcare professional or a doctor for any medical advice or treatment on an emergency basis.";
/// Part of [`DISCLAIMER`] that must appear verbatim
pub const DISCLAIMER_CORE: &str = "This information is for educational purposes only.";
pub const CLOSING_PHRASE: &str = "Please let me know if you have any further doubts.";

/// What the model returns before the persona rules are applied
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub on_topic: bool,
    #[serde(default)]
    pub health_condition: bool,
    #[serde(default)]
    pub answer: String,
}

impl Contract for AssistantReply {
    fn validate(&self) -> Result<(), String> {
        if !self.on_topic {
            return Ok(());
        }
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        if self.health_condition && !has_bullet_list(&self.answer) {
            return Err("health answer has no bulleted list of remedies".to_string());
        }
        Ok(())
    }
}

fn has_bullet_list(markdown: &str) -> bool {
    markdown.lines().map(str::trim_start).any(|line| {
        line.starts_with("- ") || line.starts_with("* ") || line.starts_with("• ")
    })
}

/// Apply the persona rules to a validated reply.
pub fn compose_answer(reply: AssistantReply) -> ChatAnswer {
    if !reply.on_topic {
        return ChatAnswer {
            answer_text: format!("{}\n\n{}", DECLINE, CLOSING_PHRASE),
            topic: Topic::OffTopic,
            health_condition: false,
        };
    }

    let mut body = reply.answer.trim().to_string();
    if let Some(stripped) = body.strip_suffix(CLOSING_PHRASE) {
        body = stripped.trim_end().to_string();
    }
    if reply.health_condition && !body.contains(DISCLAIMER_CORE) {
        body.push_str("\n\n");
        body.push_str(DISCLAIMER);
    }
    body.push_str("\n\n");
    body.push_str(CLOSING_PHRASE);

    ChatAnswer {
        answer_text: body,
        topic: Topic::OnTopic,
        health_condition: reply.health_condition,
    }
}

pub struct AssistantStage {
    client: PromptModelClient,
}

impl AssistantStage {
    pub fn new(client: PromptModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage for AssistantStage {
    type Input = ChatRequest;
    type Output = ChatAnswer;

    fn id(&self) -> &'static str {
        "assistant.aranya.v1"
    }

    async fn run(
        &self,
        input: &Self::Input,
        _ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError> {
        let reply: AssistantReply = self
            .client
            .invoke(ids::ARANYA_CHAT, input, Vec::new())
            .await?;
        Ok(compose_answer(reply))
    }
}
