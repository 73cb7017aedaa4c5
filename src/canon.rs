//! URL cleanup, normalisation, same-origin testing, and endpoint classification.

use url::Url;

/// Strip surrounding quotes/backslashes from a raw string pulled out of HTML
/// or JS source, and drop anything before the first `http` occurrence.
///
/// Links embedded in JS string literals routinely carry garbage prefixes
/// (`"+location.origin+'http://...'"`-style concatenation artefacts) left
/// behind by naive regex extraction; slicing at the first `http` recovers
/// the URL itself.
pub fn clean(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let trimmed = s.trim_matches(|c: char| c == '"' || c == '\'' || c == '\\');

    let sliced = match trimmed.find("http") {
        Some(idx) => &trimmed[idx..],
        None => trimmed,
    };

    sliced.trim().to_string()
}

/// Parse and canonicalise a URL: empty path becomes `/`, a single trailing
/// slash on a non-root path is stripped, and the fragment is dropped.
/// Scheme, authority, and query are preserved verbatim.
pub fn normalise(u: &str) -> Option<Url> {
    let mut parsed = Url::parse(u).ok()?;
    parsed.set_fragment(None);

    if parsed.path().is_empty() {
        parsed.set_path("/");
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    Some(parsed)
}

/// True iff `u`'s network authority (scheme + host + port as written)
/// equals `root` exactly. No DNS or suffix matching.
pub fn same_origin(u: &Url, root: &str) -> bool {
    authority_of(u) == root
}

/// `scheme://host[:port]` for a parsed URL, matching the shape `root` is
/// derived in (see [`root_authority`]).
pub fn authority_of(u: &Url) -> String {
    match u.port() {
        Some(port) => format!("{}://{}:{port}", u.scheme(), u.host_str().unwrap_or("")),
        None => format!("{}://{}", u.scheme(), u.host_str().unwrap_or("")),
    }
}

/// Derive the `root` authority string for a seed URL.
pub fn root_authority(seed: &Url) -> String {
    authority_of(seed)
}

/// True iff the path (query stripped, case-folded) ends with `.js`.
pub fn looks_js(u: &Url) -> bool {
    u.path().to_ascii_lowercase().ends_with(".js")
}

const ENDPOINT_MARKERS: &[&str] = &["/api/", "/rest/", "/v1/", "/v2/", "/graphql", "/admin", "/auth"];

/// True iff the case-folded path+query contains any endpoint marker, or a
/// `?` (any query string at all is endpoint-shaped for our purposes).
pub fn looks_endpoint(path_and_query: &str) -> bool {
    if path_and_query.contains('?') {
        return true;
    }
    let folded = path_and_query.to_ascii_lowercase();
    ENDPOINT_MARKERS.iter().any(|marker| folded.contains(marker))
}

/// `path[?query]` of a parsed URL, the shape [`looks_endpoint`] expects.
pub fn path_and_query(u: &Url) -> String {
    match u.query() {
        Some(q) => format!("{}?{q}", u.path()),
        None => u.path().to_string(),
    }
}
