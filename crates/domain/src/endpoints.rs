//! Endpoint paths below the API base URL.

/// Chat relay.
pub const CHAT: &str = "/chat";
/// Image generation relay.
pub const IMAGE: &str = "/image";
/// Lightweight ping/pong endpoint used by the diagnostics.
pub const PING: &str = "/ping";
/// Request echo endpoint.
pub const TEST: &str = "/test";
