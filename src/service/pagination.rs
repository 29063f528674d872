//! Offset pagination behind opaque continuation tokens.
//!
//! A token is URL-safe base64 (no padding) of `offset:<n>`. Callers must treat
//! it as opaque; the only guarantee is that feeding it back yields the next
//! page of the same ordered result set.

use crate::error::MarketError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const TOKEN_PREFIX: &str = "offset:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    offset: u64,
}

impl PageToken {
    pub fn new(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{TOKEN_PREFIX}{}", self.offset))
    }

    pub fn decode(token: &str) -> Result<Self, MarketError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| MarketError::InvalidNextToken)?;
        let text = std::str::from_utf8(&raw).map_err(|_| MarketError::InvalidNextToken)?;
        let offset = text
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or(MarketError::InvalidNextToken)?;
        Ok(Self { offset })
    }
}

/// Page size policy for one listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl PageLimits {
    pub fn clamp(&self, requested: Option<u32>) -> u32 {
        let max = self.max_size.max(1);
        requested.unwrap_or(self.default_size).clamp(1, max)
    }
}

/// A resolved window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u32,
}

impl PageRequest {
    /// Resolve from an optional continuation token (SP-API style).
    pub fn from_token(
        token: Option<&str>,
        size: Option<u32>,
        limits: PageLimits,
    ) -> Result<Self, MarketError> {
        let offset = match token.filter(|t| !t.trim().is_empty()) {
            Some(t) => PageToken::decode(t)?.offset(),
            None => 0,
        };
        Ok(Self {
            offset,
            limit: limits.clamp(size),
        })
    }

    /// Resolve from a 1-based page number, unless a continuation token is also
    /// given, in which case the token wins.
    pub fn from_page(
        page: Option<u32>,
        token: Option<&str>,
        size: Option<u32>,
        limits: PageLimits,
    ) -> Result<Self, MarketError> {
        if token.is_some_and(|t| !t.trim().is_empty()) {
            return Self::from_token(token, size, limits);
        }
        let limit = limits.clamp(size);
        let page = page.unwrap_or(1).max(1);
        Ok(Self {
            offset: u64::from(page - 1) * u64::from(limit),
            limit,
        })
    }

    /// 1-based page number this window starts on.
    pub fn page_number(&self) -> u64 {
        self.offset / u64::from(self.limit) + 1
    }

    pub fn next_token(&self, total: u64) -> Option<String> {
        let end = self.offset + u64::from(self.limit);
        (end < total).then(|| PageToken::new(end).encode())
    }
}

/// One page of rows plus the size of the full filtered set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn next_token(&self) -> Option<String> {
        self.request.next_token(self.total)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.request.limit))
    }

    pub fn has_next(&self) -> bool {
        self.request.offset + u64::from(self.request.limit) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.request.offset > 0
    }
}
