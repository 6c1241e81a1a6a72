use super::index::{SimilarityIndex, RETRIEVE_TOP_K};
use crate::document::split::split_text;
use crate::error::Error;
use crate::gemini::Gemini;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tokio::sync::RwLock;

/// Shown when a question arrives before any document has been ingested.
pub const UPLOAD_PROMPT: &str = "Please upload a PDF file to begin.";

#[derive(Clone, Debug, Serialize)]
pub struct SummaryPair {
    pub english: String,
    pub indonesian: String,
}

struct DocumentState {
    fingerprint: String,
    summaries: SummaryPair,
    index: SimilarityIndex,
}

/// Per-process session state: the Gemini client plus the current document's
/// summaries and similarity index. Summaries are cached against a content
/// fingerprint so re-uploading the same file skips regeneration, while a
/// different file recomputes them. The index is rebuilt on every upload.
pub struct Session {
    gemini: Option<Gemini>,
    state: RwLock<Option<DocumentState>>,
}

impl Session {
    pub fn new(gemini: Option<Gemini>) -> Self {
        Session {
            gemini,
            state: RwLock::new(None),
        }
    }

    fn gemini(&self) -> Result<&Gemini, Error> {
        self.gemini.as_ref().ok_or(Error::Credential)
    }

    /// One upload-processing cycle over already-extracted text.
    pub async fn ingest(&self, text: String) -> Result<SummaryPair, Error> {
        let gemini = self.gemini()?;
        let fingerprint = fingerprint(&text);

        let cached = {
            let state = self.state.read().await;
            state
                .as_ref()
                .filter(|s| s.fingerprint == fingerprint)
                .map(|s| s.summaries.clone())
        };

        let summaries = match cached {
            Some(summaries) => {
                info!("summary cache hit for fingerprint {}", &fingerprint[..8]);
                summaries
            }
            None => {
                let start = Instant::now();
                let english = gemini.generate(&summary_prompt_english(&text)).await?;
                let indonesian = gemini.generate(&summary_prompt_indonesian(&text)).await?;
                info!("summarizing spends {}s", start.elapsed().as_secs_f64());
                SummaryPair { english, indonesian }
            }
        };

        let chunks = split_text(&text);
        let start = Instant::now();
        let vectors = gemini.embed_batch(&chunks).await?;
        info!(
            "embedding {} chunks spends {}s",
            chunks.len(),
            start.elapsed().as_secs_f64()
        );
        let index = SimilarityIndex::from_chunks(chunks, vectors)?;

        let mut state = self.state.write().await;
        *state = Some(DocumentState {
            fingerprint,
            summaries: summaries.clone(),
            index,
        });

        Ok(summaries)
    }

    /// Answers a question against the current index. `Ok(None)` means no
    /// document has been ingested yet; no service call is made in that case.
    pub async fn ask(&self, question: &str) -> Result<Option<String>, Error> {
        let state = self.state.read().await;
        let state = match state.as_ref() {
            Some(state) => state,
            None => return Ok(None),
        };
        let gemini = self.gemini()?;

        let start = Instant::now();
        let vector = gemini.embed_one(question).await?;
        let hits = state.index.top_k(&vector, RETRIEVE_TOP_K);
        info!(
            "retrieved {} of {} chunks in {}s",
            hits.len(),
            state.index.len(),
            start.elapsed().as_secs_f64()
        );

        let prompt = answer_prompt(&hits, question);
        let answer = gemini.generate(&prompt).await?;
        Ok(Some(answer))
    }

    pub async fn has_document(&self) -> bool {
        self.state.read().await.is_some()
    }
}

pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{:x}", digest)
}

fn summary_prompt_english(text: &str) -> String {
    format!(
        "Please provide a concise summary of the following text in English:\n\n{}\n\nSummary:",
        text
    )
}

fn summary_prompt_indonesian(text: &str) -> String {
    format!(
        "Tolong berikan ringkasan yang singkat dari teks berikut dalam Bahasa Indonesia:\n\n{}\n\nRingkasan:",
        text
    )
}

/// "Stuff" strategy: every retrieved chunk goes into one prompt, one call.
fn answer_prompt(chunks: &[&str], question: &str) -> String {
    let context: String = chunks.concat();
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try \
         to make up an answer.\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_identical_text() {
        assert_eq!(fingerprint("A.B.C."), fingerprint("A.B.C."));
    }

    #[test]
    fn fingerprint_differs_for_different_text() {
        assert_ne!(fingerprint("first upload"), fingerprint("second upload"));
    }

    #[test]
    fn answer_prompt_stuffs_all_chunks_and_question() {
        let prompt = answer_prompt(&["alpha ", "beta"], "what is it?");
        assert!(prompt.contains("alpha beta"));
        assert!(prompt.contains("Question: what is it?"));
        assert!(prompt.ends_with("Helpful Answer:"));
    }

    #[test]
    fn summary_prompts_interpolate_full_text() {
        let en = summary_prompt_english("DOC BODY");
        let id = summary_prompt_indonesian("DOC BODY");
        assert!(en.contains("DOC BODY") && en.contains("in English"));
        assert!(id.contains("DOC BODY") && id.contains("Bahasa Indonesia"));
    }

    #[tokio::test]
    async fn ask_before_upload_makes_no_service_call() {
        let session = Session::new(None);
        assert!(!session.has_document().await);
        let answer = session.ask("anything").await.unwrap();
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn ingest_without_credential_is_a_credential_error() {
        let session = Session::new(None);
        let err = session.ingest("some text".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::Credential));
        assert!(err.user_message().contains("API key"));
    }
}
