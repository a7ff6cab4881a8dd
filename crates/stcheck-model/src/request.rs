//! Completion request types.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One stateless text-to-JSON request.
///
/// The model sees a system instruction and a single user message holding the
/// prompt followed by the document text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction sent as the system message.
    pub system: String,
    /// Extraction prompt describing the expected JSON.
    pub prompt: String,
    /// Raw document text.
    pub document: String,
    /// Sampling temperature; low values keep extraction stable.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            document: document.into(),
            temperature: 0.1,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the chat messages sent to the model.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(format!(
                "{}\n\nDocument text:\n{}",
                self.prompt, self.document
            )),
        ]
    }
}
