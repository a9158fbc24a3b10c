//! Client-side search over loaded moderation requests.
//!
//! Filtering happens entirely in memory on the full result set; there is no
//! pagination and no server-side query.

use crate::request::ModerationRequest;

/// Whether a request matches a free-text search term.
///
/// An empty term matches everything. Otherwise the match is a
/// case-insensitive substring test against the id, the content, the status
/// wire name and every flag's type wire name. The term is used as given,
/// without trimming.
pub fn matches(request: &ModerationRequest, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    contains(&request.id)
        || contains(&request.content)
        || contains(request.status.as_str())
        || request
            .flags
            .as_ref()
            .is_some_and(|flags| flags.type_names().into_iter().any(contains))
}

/// Filter requests by a search term, preserving their order.
pub fn filter_requests<'a>(
    requests: &'a [ModerationRequest],
    term: &str,
) -> Vec<&'a ModerationRequest> {
    requests.iter().filter(|r| matches(r, term)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
