/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field automatically so callers never need
/// to remember the string literal. The domains are the four subsystems of
/// the pipeline: `sys` (lifecycle), `ingest` (feed reader), `sweep`
/// (analyzer), `alert` (sink).
///
/// # Usage
///
/// ```ignore
/// use crate::log_macros::*;
///
/// nw_info!(sys, window_secs = 300, "pipeline started");
/// nw_warn!(alert, error = %e, "alert sink write failed");
/// nw_debug!(ingest, error = %e, "discarding malformed line");
/// ```
///
/// The macros accept any tracing-compatible field syntax after the domain
/// identifier, which is a bare identifier converted to a string literal.

// ---------------------------------------------------------------------------
// Core macro — dispatches to the matching tracing level macro.
// ---------------------------------------------------------------------------

/// Internal helper. Do not call directly; use `nw_error!` … `nw_trace!`.
#[doc(hidden)]
macro_rules! nw_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

// ---------------------------------------------------------------------------
// Public per-level macros
// ---------------------------------------------------------------------------

/// Log at ERROR level with an automatic `domain` field.
macro_rules! nw_error {
    ($domain:ident, $($rest:tt)*) => {
        nw_log!(error, $domain, $($rest)*)
    };
}

/// Log at WARN level with an automatic `domain` field.
#[allow(unused_macros)]
macro_rules! nw_warn {
    ($domain:ident, $($rest:tt)*) => {
        nw_log!(warn, $domain, $($rest)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
macro_rules! nw_info {
    ($domain:ident, $($rest:tt)*) => {
        nw_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
macro_rules! nw_debug {
    ($domain:ident, $($rest:tt)*) => {
        nw_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
#[allow(unused_macros)]
macro_rules! nw_trace {
    ($domain:ident, $($rest:tt)*) => {
        nw_log!(trace, $domain, $($rest)*)
    };
}
