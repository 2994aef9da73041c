use std::fmt;

use newsdesk_core::{DirectorySnapshot, FeedDescriptor, Outcome, RequestId, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    DirectoryLoaded(DirectorySnapshot),
    DirectoryFailed { schema: Schema, message: String },
    FeedsLoaded(Vec<FeedDescriptor>),
    FeedsFailed { message: String },
    CommandFinished {
        request_id: RequestId,
        outcome: Outcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    InvalidPayload,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "undecodable text"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// One failed stage of a provider chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider}: {source}")]
    Fetch {
        provider: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("{provider}: no data for {subject}")]
    Empty {
        provider: &'static str,
        subject: String,
    },
    #[error("{provider}: {message}")]
    Unavailable {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn fetch(provider: &'static str, source: FetchError) -> Self {
        ProviderError::Fetch { provider, source }
    }

    pub fn empty(provider: &'static str, subject: impl Into<String>) -> Self {
        ProviderError::Empty {
            provider,
            subject: subject.into(),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Fetch { provider, .. }
            | ProviderError::Empty { provider, .. }
            | ProviderError::Unavailable { provider, .. } => provider,
        }
    }
}
