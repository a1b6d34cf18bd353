use anyhow::{anyhow, Context, Error};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

/// Turns a prompt into raw completion text.
#[async_trait]
pub trait Synthesizer {
    async fn complete(&self, prompt: String) -> Result<String, Error>;
}

pub fn build_prompt(schema: &str, question: &str) -> String {
    format!(
        "You are a data analyst. Based on the table schema below, write a SQL query that answers the user's question.\n\
         Schema: {schema}\n\
         \n\
         Question: {question}\n\
         Return ONLY the SQL query. Do not wrap it in markdown or code blocks.\n\
         SQL Query:\n"
    )
}

/// Asks the synthesizer for SQL answering `question`. The text comes back
/// untouched and may well not be SQL.
pub async fn synthesize_sql(
    synthesizer: &(dyn Synthesizer + Send + Sync),
    question: &str,
    schema: &str,
) -> Result<String, Error> {
    let prompt = build_prompt(schema, question);
    debug!(prompt = %prompt, "Sending prompt");
    synthesizer.complete(prompt).await
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Hosted chat completion on Groq's OpenAI-compatible endpoint.
pub struct GroqSynthesizer {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl GroqSynthesizer {
    pub fn new(api_key: String, model: String) -> Self {
        GroqSynthesizer {
            client: reqwest::Client::new(),
            url: GROQ_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Points the synthesizer at another chat-completions endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl Synthesizer for GroqSynthesizer {
    async fn complete(&self, prompt: String) -> Result<String, Error> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request(&prompt))
            .send()
            .await
            .context("Completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(200).collect();
            return Err(anyhow!("Completion service returned {}: {}", status, truncated));
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow!("Completion service returned no choices"))
    }
}

/// Local model served by Ollama.
pub struct OllamaSynthesizer {
    client: Ollama,
    model: String,
}

impl OllamaSynthesizer {
    pub fn new(model: String) -> Self {
        OllamaSynthesizer {
            client: Ollama::default(),
            model,
        }
    }
}

#[async_trait]
impl Synthesizer for OllamaSynthesizer {
    async fn complete(&self, prompt: String) -> Result<String, Error> {
        let request = GenerationRequest::new(self.model.clone(), prompt)
            .options(ModelOptions::default().temperature(0.0));

        let response = self
            .client
            .generate(request)
            .await
            .context("Failed to generate sql query")?;

        Ok(response.response)
    }
}
