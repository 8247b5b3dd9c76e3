//! Logging utilities with sensitive data redaction.

/// Query and form parameters that never reach log output in clear text
pub const SENSITIVE_PARAMS: &[&str] = &[
    "access_token",
    "client_secret",
    "fb_exchange_token",
    "refresh_token",
    "code",
    "appsecret_proof",
    "input_token",
];

/// Redact a token, keeping a short prefix for correlation
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(6) {
        Some((idx, _)) if token.len() > 12 => format!("{}...[REDACTED]", &token[..idx]),
        _ => "[REDACTED]".to_string(),
    }
}

/// Redact a URL, hiding any secrets in query parameters
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) => format!("{}?{}", base, redact_query(query)),
        None => url.to_string(),
    }
}

/// Redact sensitive pairs in a `k=v&k=v` string
pub fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive(key) => format!("{}=[REDACTED]", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_PARAMS.iter().any(|s| key.eq_ignore_ascii_case(s))
}
