use crate::error::Error;
use crate::{EMBEDDING_MODEL, GENERATION_MODEL, REQUEST_TIMEOUT_SECS};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Google Generative Language REST API. Calls block the
/// current cycle until completion or the configured timeout.
#[derive(Clone)]
pub struct Gemini {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Content {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Content,
}

#[derive(Serialize, Debug)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Serialize, Debug)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Deserialize, Debug)]
struct BatchEmbedResponse {
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize, Debug)]
struct EmbedResponse {
    embedding: Embedding,
}

#[derive(Deserialize, Debug)]
struct Embedding {
    values: Vec<f32>,
}

impl Gemini {
    pub fn from_env() -> Result<Self, Error> {
        let api_key = match std::env::var("GOOGLE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Err(Error::Credential),
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(*REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(Gemini { http, api_key })
    }

    /// One completion call, temperature 0. Returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, *GENERATION_MODEL, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content::from_text(prompt)],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let start = Instant::now();
        let response = self.post(&url, &request).await?;
        let response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        debug!("generate call spends {}s", start.elapsed().as_secs_f64());

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::Generation("empty completion".to_string()))?;
        Ok(text)
    }

    /// One embedding vector per input string, in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Error> {
        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            API_BASE, *EMBEDDING_MODEL, self.api_key
        );
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| EmbedRequest {
                    model: format!("models/{}", *EMBEDDING_MODEL),
                    content: Content::from_text(t),
                })
                .collect(),
        };

        let start = Instant::now();
        let response = self.post(&url, &request).await?;
        let response: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        debug!(
            "embedding {} chunks spends {}s",
            texts.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, Error> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            API_BASE, *EMBEDDING_MODEL, self.api_key
        );
        let request = EmbedRequest {
            model: format!("models/{}", *EMBEDDING_MODEL),
            content: Content::from_text(text),
        };

        let response = self.post(&url, &request).await?;
        let response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(response.embedding.values)
    }

    async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<reqwest::Response, Error> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Credential),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Generation(format!("{}: {}", status, body)))
            }
        }
    }
}
