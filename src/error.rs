use thiserror::Error;

/// Failure taxonomy for one processing cycle. The variant is set at the
/// point of failure, never inferred from message text afterwards.
#[derive(Debug, Error)]
pub enum Error {
    #[error("GOOGLE_API_KEY is missing or rejected by the service")]
    Credential,
    #[error("failed to extract text from PDF: {0}")]
    Extraction(String),
    #[error("generation service call failed: {0}")]
    Generation(String),
}

impl Error {
    /// The localized string shown in the UI error region.
    pub fn user_message(&self) -> String {
        match self {
            Error::Credential => {
                "Error: API key Gemini tidak ditemukan. \
                 Silakan tambahkan GOOGLE_API_KEY di file .env"
                    .to_string()
            }
            other => format!("Terjadi kesalahan: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_message_mentions_api_key() {
        let msg = Error::Credential.user_message();
        assert!(msg.contains("API key"));
        assert!(msg.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn generic_errors_get_wrapped() {
        let msg = Error::Generation("timeout".to_string()).user_message();
        assert!(msg.starts_with("Terjadi kesalahan:"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn extraction_message_carries_cause() {
        let msg = Error::Extraction("not a PDF".to_string()).user_message();
        assert!(msg.contains("not a PDF"));
    }
}
