//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3030);
const DEFAULT_PAGE_LIMIT: usize = 10;
const DEFAULT_MAX_PAGE_LIMIT: usize = 500;

pub const ADDR_VAR: &str = "WIDGETBOARD_ADDR";
pub const PAGE_LIMIT_VAR: &str = "WIDGETBOARD_PAGE_LIMIT";
pub const MAX_PAGE_LIMIT_VAR: &str = "WIDGETBOARD_MAX_PAGE_LIMIT";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Page size used when a pagination request omits `limit`.
    pub page_limit: usize,
    /// Largest `limit` a pagination request may ask for.
    pub max_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(DEFAULT_ADDR),
            page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for anything
    /// missing or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_page_limit = parse_or(&lookup, MAX_PAGE_LIMIT_VAR, defaults.max_page_limit);
        let mut page_limit = parse_or(&lookup, PAGE_LIMIT_VAR, defaults.page_limit);
        if page_limit > max_page_limit {
            warn!(
                "{} ({}) exceeds {} ({}), clamping",
                PAGE_LIMIT_VAR, page_limit, MAX_PAGE_LIMIT_VAR, max_page_limit
            );
            page_limit = max_page_limit;
        }

        Self {
            addr: parse_or(&lookup, ADDR_VAR, defaults.addr),
            page_limit,
            max_page_limit,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring malformed {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
