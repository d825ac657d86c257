//! Query-string parsing.
//!
//! Pairs are separated by `&` and split on the first `=`. Keys and values are
//! percent-decoded with `+` standing for a space. Decoding never fails a request: a
//! token holding a malformed escape (`%GG`, a trailing `%2`) or decoding to invalid
//! UTF-8 is kept exactly as it appeared on the wire.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::trace;

/// Parses a raw query string (the part after `?`) into a map.
///
/// A pair without `=` is a flag and maps to an empty value. Empty pairs are skipped and
/// a repeated key keeps its last value.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        params.insert(decode_component(key).into_owned(), decode_component(value).into_owned());
    }

    params
}

/// Percent-decodes one query token, falling back to the raw token on failure.
pub fn decode_component(token: &str) -> Cow<'_, str> {
    if !token.contains(['%', '+']) {
        return Cow::Borrowed(token);
    }

    if !has_valid_escapes(token) {
        trace!(token, "malformed percent escape, keep raw token");
        return Cow::Borrowed(token);
    }

    let spaced = token.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(e) => {
            trace!(token, cause = %e, "decoded token is not utf-8, keep raw token");
            Cow::Borrowed(token)
        }
    }
}

/// Checks that every `%` is followed by two hex digits.
fn has_valid_escapes(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            match escape {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
