//! The `auth_token` cookie.

use std::time::Duration;

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Build the `HttpOnly` cookie carrying a freshly issued token.
pub fn auth_cookie(
    token: &str,
    max_age: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_auth_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("auth_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("auth_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Token from the `auth_token` cookie. Empty values count as absent.
pub fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            let val = parts.next().unwrap_or_default().trim();
            if key == AUTH_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

/// Token from the cookie, falling back to `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = token_from_cookie(headers) {
        return Some(token);
    }
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let v = auth_cookie("abc", Duration::from_secs(604800), false).unwrap();
        let s = v.to_str().unwrap();
        assert_eq!(
            s,
            "auth_token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
        let v = auth_cookie("abc", Duration::from_secs(604800), true).unwrap();
        assert!(v.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_it() {
        let v = clear_auth_cookie(false);
        assert!(v.to_str().unwrap().contains("Max-Age=0"));
        assert!(v.to_str().unwrap().starts_with("auth_token=;"));
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; auth_token=t0k; lang=en".parse().unwrap());
        assert_eq!(token_from_cookie(&headers).as_deref(), Some("t0k"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert!(token_from_cookie(&headers).is_none());
        headers.insert(COOKIE, "auth_token=".parse().unwrap());
        assert!(token_from_cookie(&headers).is_none());
        headers.insert(COOKIE, "other_auth_token=x".parse().unwrap());
        assert!(token_from_cookie(&headers).is_none());
    }

    #[test]
    fn bearer_header_is_a_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer hdr".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("hdr"));
        headers.insert(COOKIE, "auth_token=ck".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("ck"));
    }
}
