//! The admin session cookie and client identification.

use std::time::Duration;

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "press_admin";

/// Lifetime of a session (and of its cookie).
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// `Set-Cookie` value that stores `token`.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_TTL.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of cookie `name` in a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Key used to rate-limit a client: the first `X-Forwarded-For` hop, else
/// `X-Real-IP`, else `"unknown"`.
pub fn client_identifier(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|ip| !ip.is_empty()))
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let c = session_cookie("tok", false);
        assert_eq!(
            c,
            "press_admin=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=43200"
        );
        assert!(session_cookie("tok", true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn reads_cookie_values() {
        let header = "theme=dark; press_admin=abc.def ; other=1";
        assert_eq!(cookie_value(header, "press_admin"), Some("abc.def"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("", "press_admin"), None);
        assert_eq!(cookie_value("press_admin=", "press_admin"), Some(""));
    }

    #[test]
    fn client_identification() {
        assert_eq!(
            client_identifier(Some(" 10.0.0.1 , 10.0.0.2"), Some("9.9.9.9")),
            "10.0.0.1"
        );
        assert_eq!(client_identifier(Some(" "), Some(" 9.9.9.9 ")), "9.9.9.9");
        assert_eq!(client_identifier(None, None), "unknown");
        assert_eq!(client_identifier(None, Some("")), "unknown");
    }
}
