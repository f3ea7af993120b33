//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Response header reporting which cache tier served a listing
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Request correlation header, honoured inbound and echoed outbound
pub const REQUEST_ID_HEADER: &str = "x-request-id";
