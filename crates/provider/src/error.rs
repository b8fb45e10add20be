/// Errors from the generation provider layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Missing or placeholder credentials, detected before any call.
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status (quota, safety rejection,
    /// bad request). The body is preserved for the scene error message.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response arrived but its payload was not usable.
    #[error("Provider response malformed: {0}")]
    Decode(String),
}
