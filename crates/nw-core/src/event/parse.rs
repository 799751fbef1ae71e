use winnow::ascii::{dec_int, dec_uint, space0};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

use orion_error::StructError;

use crate::error::{CoreReason, CoreResult};

use super::{
    EventType, LogEntry, StatusCode, MAX_EVENT_TYPE_LEN, MAX_IP_LEN, MAX_RESOURCE_LEN,
    MAX_STATUS_LEN,
};

// ---------------------------------------------------------------------------
// Line grammar: timestamp, user_id, ip, event_type, resource_id, status_code
// ---------------------------------------------------------------------------

/// Field separator: a comma with optional surrounding spaces.
fn sep(input: &mut &str) -> ModalResult<()> {
    let _ = space0.parse_next(input)?;
    let _ = literal(",").parse_next(input)?;
    let _ = space0.parse_next(input)?;
    Ok(())
}

/// One raw comma-delimited field, surrounding whitespace trimmed.
/// Rejected when empty or longer than `max` after trimming.
fn field<'s>(input: &mut &'s str, max: usize) -> ModalResult<&'s str> {
    let raw: &str = take_while(0.., |c: char| c != ',').parse_next(input)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > max {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(trimmed)
}

fn log_line(input: &mut &str) -> ModalResult<LogEntry> {
    let _ = space0.parse_next(input)?;
    let timestamp: i64 = dec_int.parse_next(input)?;
    sep(input)?;
    let user_id: u32 = dec_uint.parse_next(input)?;
    sep(input)?;
    let ip_address = field(input, MAX_IP_LEN)?.to_string();
    sep(input)?;
    let Some(event_type) = EventType::parse(field(input, MAX_EVENT_TYPE_LEN)?) else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    sep(input)?;
    let resource_raw = field(input, MAX_RESOURCE_LEN)?;
    let resource_id = (resource_raw != "-").then(|| resource_raw.to_string());
    sep(input)?;
    let Some(status_code) = StatusCode::parse(field(input, MAX_STATUS_LEN)?) else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };

    Ok(LogEntry {
        timestamp,
        user_id,
        ip_address,
        event_type,
        resource_id,
        status_code,
    })
}

/// Parse one input line into a [`LogEntry`].
///
/// The whole line must be consumed; trailing garbage makes it malformed.
/// Comment and blank-line filtering is the reader's job, not the parser's.
pub fn parse_line(line: &str) -> CoreResult<LogEntry> {
    log_line
        .parse(line)
        .map_err(|e| StructError::from(CoreReason::Parse).with_detail(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
