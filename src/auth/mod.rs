pub mod handlers;
pub mod password;
pub mod session;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const LOGIN_PATH: &str = "/auth/login/";

/// Characters escaped in the `next` query value; `/` stays readable.
const NEXT_VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Login URL that sends the user back to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!(
        "{}?next={}",
        LOGIN_PATH,
        utf8_percent_encode(next, NEXT_VALUE_SET)
    )
}

/// Only local absolute paths are accepted as redirect targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}
