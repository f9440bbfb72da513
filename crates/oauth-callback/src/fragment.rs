//! Redirect fragment parsing.

use crate::{OAuthError, OAuthResult};
use std::collections::HashMap;

pub const ACCESS_TOKEN_FIELD: &str = "access_token";
pub const REFRESH_TOKEN_FIELD: &str = "refresh_token";

/// Parse `a=1&b=2` into a map, URL-decoding each value.
///
/// A pair without `=` maps to an empty value. The last occurrence of a
/// repeated name wins.
pub fn parse_fragment(fragment: &str) -> OAuthResult<HashMap<String, String>> {
    fragment
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default().to_string();
            let value = parts.next().unwrap_or("");
            let value = urlencoding::decode(value)
                .map_err(|e| OAuthError::InvalidUrl(format!("undecodable value for {}: {}", key, e)))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}
