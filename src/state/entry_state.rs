/// Frontier entry state definitions
///
/// Every URL the crawler enqueues moves through these states. They are written
/// through to the database so an interrupted run can be resumed.
use std::fmt;

/// Represents the current state of a frontier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// Entry is queued and waiting to be fetched
    Pending,

    /// Entry is currently being fetched
    Fetching,

    /// Entry was fetched and its document persisted
    Fetched,

    /// Entry failed; the reason is recorded alongside
    Failed,
}

impl EntryState {
    /// Returns true if this is a terminal state. Terminal entries never
    /// transition back to `Pending`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fetched | Self::Failed)
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "fetching" => Some(Self::Fetching),
            "fetched" => Some(Self::Fetched),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Why a frontier entry failed.
///
/// The reason decides whether a later `--process-pending` run may retry the
/// URL: transport-level trouble is worth retrying, policy and client errors
/// are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailReason {
    /// robots.txt disallows the path; no fetch was attempted
    Disallowed,

    /// Request exceeded the fetch timeout
    Timeout,

    /// Hostname did not resolve
    Dns,

    /// Connection refused, reset, or otherwise failed mid-transfer
    Connection,

    /// Server answered with a non-success HTTP status
    Http(u16),

    /// Response was not an HTML or text document
    ContentType,

    /// No extraction strategy produced content
    Extraction,
}

impl FailReason {
    /// Returns true if a future run may retry this URL
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection => true,
            Self::Http(code) => *code >= 500,
            Self::Disallowed | Self::Dns | Self::ContentType | Self::Extraction => false,
        }
    }

    /// Converts the reason to its database string representation
    pub fn to_db_string(&self) -> String {
        match self {
            Self::Disallowed => "disallowed".to_string(),
            Self::Timeout => "timeout".to_string(),
            Self::Dns => "dns".to_string(),
            Self::Connection => "connection".to_string(),
            Self::Http(code) => format!("http_{}", code),
            Self::ContentType => "content_type".to_string(),
            Self::Extraction => "extraction".to_string(),
        }
    }

    /// Parses a reason from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        if let Some(code) = s.strip_prefix("http_") {
            return code.parse().ok().map(Self::Http);
        }

        match s {
            "disallowed" => Some(Self::Disallowed),
            "timeout" => Some(Self::Timeout),
            "dns" => Some(Self::Dns),
            "connection" => Some(Self::Connection),
            "content_type" => Some(Self::ContentType),
            "extraction" => Some(Self::Extraction),
            _ => None,
        }
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
