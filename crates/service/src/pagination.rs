//! Pagination utilities for service layer
//!
//! Cursor-based: callers pass back the opaque token from the previous page.

use serde::Deserialize;

pub const MAX_PAGE_SIZE: u32 = 100;

/// List parameters, usually parsed from a query string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ListOptions {
    /// Opaque resume token; empty means start from the beginning.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Page size; `None` reads the whole scope in one page.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn page(limit: u32) -> Self {
        Self { cursor: None, limit: Some(limit) }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Cursor with blank tokens folded to `None`.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Clamp the page size into `1..=MAX_PAGE_SIZE`.
    pub fn normalized_limit(&self) -> Option<usize> {
        self.limit.map(|l| l.clamp(1, MAX_PAGE_SIZE) as usize)
    }
}

/// One page of entities.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the scan is exhausted.
    pub next_cursor: Option<String>,
}
