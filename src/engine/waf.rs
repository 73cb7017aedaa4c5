//! The WAF-like response detector (spec §4.4).

const WAF_STATUSES: &[u16] = &[403, 406, 409, 429, 503];

const WAF_HEADER_MARKERS: &[&str] = &[
    "cf-ray",
    "cf-cache-status",
    "cf-chl-bypass",
    "x-sucuri-id",
    "x-sucuri-block",
    "x-amzn-waf-id",
    "x-amz-cf-id",
    "x-iinfo",
    "incapsula",
    "x-cdn",
    "akamai",
    "x-akamai",
    "x-akamai-transformed",
    "x-waf",
    "x-firewall",
];

const WAF_BODY_MARKERS: &[&str] = &[
    "checking your browser",
    "just a moment",
    "ddos protection by",
    "web application firewall",
    "access denied",
    "you are being rate limited",
    "/cdn-cgi/l/chk_jschl",
    "waf",
];

/// True if the status, any response header name, or the first 2048 bytes of
/// the body (all case-folded) match a fixed marker list.
pub fn looks_waf_like(status: u16, headers: &[(String, String)], body: &str) -> bool {
    if WAF_STATUSES.contains(&status) {
        return true;
    }

    if headers.iter().any(|(name, _)| {
        let folded = name.to_ascii_lowercase();
        WAF_HEADER_MARKERS.iter().any(|marker| folded.contains(marker))
    }) {
        return true;
    }

    let mut prefix_len = body.len().min(2048);
    while prefix_len > 0 && !body.is_char_boundary(prefix_len) {
        prefix_len -= 1;
    }
    let folded = body[..prefix_len].to_ascii_lowercase();
    WAF_BODY_MARKERS.iter().any(|marker| folded.contains(marker))
}
