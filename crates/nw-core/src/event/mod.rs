mod parse;

pub use parse::parse_line;

/// Field width bounds from the wire format.
pub const MAX_IP_LEN: usize = 39;
pub const MAX_EVENT_TYPE_LEN: usize = 15;
pub const MAX_RESOURCE_LEN: usize = 31;
pub const MAX_STATUS_LEN: usize = 15;

/// Kind of activity an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Login,
    FileAccess,
    ApiCall,
    Transaction,
}

impl EventType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOGIN" => Some(Self::Login),
            "FILE_ACCESS" => Some(Self::FileAccess),
            "API_CALL" => Some(Self::ApiCall),
            "TRANSACTION" => Some(Self::Transaction),
            _ => None,
        }
    }
}

/// Outcome of the recorded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    Failed,
}

impl StatusCode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One parsed event from the input feed.
///
/// Entries are owned exclusively by the store's log window from insertion
/// until expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Seconds since the epoch, as stamped by the event source.
    pub timestamp: i64,
    pub user_id: u32,
    pub ip_address: String,
    pub event_type: EventType,
    /// `None` when the feed carried the "no resource" sentinel (`-`).
    pub resource_id: Option<String>,
    pub status_code: StatusCode,
}

impl LogEntry {
    /// Failed login attempts are what both the per-user and per-IP
    /// failure counters track.
    pub fn is_failed_login(&self) -> bool {
        self.event_type == EventType::Login && self.status_code == StatusCode::Failed
    }
}
