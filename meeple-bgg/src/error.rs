use thiserror::Error;

/// Errors from the BGG XML API client.
#[derive(Error, Debug)]
pub enum BggError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BGG rate limit hit, slow down before retrying")]
    RateLimited,

    #[error("BGG server error (HTTP {status})")]
    Server { status: u16 },

    #[error("BGG rejected the request (HTTP {status})")]
    InvalidRequest { status: u16 },

    #[error("no such item on BGG")]
    NotFound,

    #[error("collection export still queued after {attempts} polls")]
    CollectionQueued { attempts: u32 },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Unexpected response shape: {0}")]
    Parse(String),

    #[error("BGG API error: {0}")]
    Api(String),
}

impl BggError {
    /// Create a parse error with a custom message.
    pub fn parse(msg: impl Into<String>) -> Self {
        BggError::Parse(msg.into())
    }

    /// Whether a retry with backoff could plausibly succeed.
    ///
    /// Rate limits, server-side failures, pending collection exports and
    /// network-level faults are transient. Parse errors and rejected
    /// requests are not; retrying those just repeats the failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            BggError::RateLimited
            | BggError::Server { .. }
            | BggError::CollectionQueued { .. } => true,
            BggError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
