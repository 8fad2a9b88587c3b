//! Plain-text rendering of records and pages.

use std::fmt::{Debug, Write};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use service::Page;

pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

/// `<Label>: <record>` on its own line.
pub fn record<T: Debug>(out: &mut String, label: &str, item: &T) {
    let _ = writeln!(out, "{label}: {item:?}");
}

/// One `#<n> <Label>: <record>` line per item, or `no <label>s!`, followed
/// by the resume token when more pages exist.
pub fn page<T: Debug>(out: &mut String, label: &str, page: &Page<T>) {
    if page.items.is_empty() {
        let _ = writeln!(out, "no {}s!", label.to_lowercase());
    }
    for (i, item) in page.items.iter().enumerate() {
        let _ = writeln!(out, "#{i} {label}: {item:?}");
    }
    if let Some(cursor) = &page.next_cursor {
        let _ = writeln!(out, "next cursor: {cursor}");
    }
}

/// Response headers for a rendered page.
pub fn page_headers<T>(page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    if let Some(value) = page.next_cursor.as_deref().and_then(|c| HeaderValue::from_str(c).ok()) {
        headers.insert(HeaderName::from_static(NEXT_CURSOR_HEADER), value);
    }
    headers
}
