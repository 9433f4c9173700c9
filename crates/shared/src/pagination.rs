//! Pagination helpers.
//!
//! Append-only tables (audit log) page with an opaque keyset cursor; mutable
//! listings (devices) page with a plain offset.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Default page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on any requested page size.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Error type for cursor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Keyset position of the last row on a page, ordered by `(created_at, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: i64) -> Self {
        Self { created_at, id }
    }

    /// Encodes as `base64url(RFC3339_micros|id)`.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let raw = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

        let (timestamp, id) = raw.split_once('|').ok_or(CursorError::InvalidFormat)?;
        let id: i64 = id.parse().map_err(|_| CursorError::InvalidId)?;
        let created_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| CursorError::InvalidTimestamp)?
            .with_timezone(&Utc);

        Ok(Self { created_at, id })
    }
}

/// Clamps a client supplied page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Offset pagination query parameters (`?page=2&per_page=25`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    /// 1-based page number.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        clamp_limit(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}
