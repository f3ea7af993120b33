//! Shared continuation-token paging for backends that enumerate locally.
//!
//! The token is the last key of the previous page; the next page starts at the
//! first key sorting strictly after it, the same contract as S3 `start-after`.

/// Select the page following `token` from entries sorted by key.
///
/// Returns the page and the token for the next one, `None` once exhausted.
pub(crate) fn page_after<'a, T>(
    entries: &'a [(String, T)],
    token: Option<&str>,
    page_size: usize,
) -> (&'a [(String, T)], Option<String>) {
    let start = match token {
        Some(token) => entries.partition_point(|(key, _)| key.as_str() <= token),
        None => 0,
    };
    let end = start.saturating_add(page_size).min(entries.len());
    let page = &entries[start..end];

    let next = if end < entries.len() {
        page.last().map(|(key, _)| key.clone())
    } else {
        None
    };

    (page, next)
}
