use anyhow::{Result, anyhow};
use reqwest::{Client, header};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;

const PERSONA_PROMPT: &str = "You are a warm, concise receptionist answering the phone for a medical clinic. \
Rephrase the message you are given so it sounds natural when spoken aloud, in at most two sentences. \
Keep every date, time, and doctor name exactly as written. Do not add or remove any information.";

/// Optional LLM rewording of the template responses. Any failure falls back
/// to the template text unchanged.
pub struct GenerativePhraser {
    api_key: String,
    base_url: String,
    model: String,
    http_client: Client,
}

impl GenerativePhraser {
    /// `None` unless generative phrasing is switched on and a key is present.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if !config.is_generative_phrasing_enabled() {
            return None;
        }

        Some(Self {
            api_key: config.openai_api_key.clone()?,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            http_client: Client::new(),
        })
    }

    pub async fn phrase(&self, template_text: &str) -> String {
        match self.request_phrasing(template_text).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generative phrasing failed, using template: {}", e);
                template_text.to_string()
            }
        }
    }

    async fn request_phrasing(&self, template_text: &str) -> Result<String> {
        debug!("Requesting generative phrasing from {}", self.model);

        let prompt = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": PERSONA_PROMPT
                },
                {
                    "role": "user",
                    "content": template_text
                }
            ],
            "temperature": 0.3,
            "max_tokens": 120
        });

        let response = self.http_client.post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&prompt)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let ai_response: Value = response.json().await?;
        let text = ai_response["choices"][0]["message"]["content"].as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("Invalid OpenAI response format"))?;

        Ok(text.to_string())
    }
}
