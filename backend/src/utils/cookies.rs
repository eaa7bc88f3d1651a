use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

/// Name of the session cookie. Browser clients authenticate with it; API
/// clients may present the same token as a bearer credential instead.
pub const SESSION_COOKIE_NAME: &str = "token";
pub const SESSION_COOKIE_PATH: &str = "/";

/// Serializes the session cookie with its hardening attributes.
pub fn session_cookie(token: &str, max_age: Duration, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        SESSION_COOKIE_NAME,
        token,
        SESSION_COOKIE_PATH,
        max_age.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Serializes an immediately-expiring session cookie for logout.
pub fn clear_session_cookie(options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}",
        SESSION_COOKIE_NAME,
        SESSION_COOKIE_PATH,
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
