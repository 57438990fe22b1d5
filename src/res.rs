use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{models::User, session, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Replaces each `{key}` in `template` with its value in a single pass, so
/// substituted text is never scanned again. Unknown `{...}` is left alone.
/// Values are inserted verbatim; escape user text with [`escape`] first.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let hit = tail.find('}').and_then(|end| {
            let key = &tail[..end];
            values.iter().find(|(k, _)| *k == key).map(|(_, v)| (end, *v))
        });

        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// The lowercased scheme of `url`, if it has one. Whitespace and control
/// characters are dropped first, as browsers do.
fn url_scheme(url: &str) -> Option<String> {
    let url: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let end = url.find([':', '/', '?', '#'])?;
    url[end..].starts_with(':').then(|| url[..end].to_ascii_lowercase())
}

/// Relative, http or https.
pub fn is_web_url(url: &str) -> bool {
    matches!(url_scheme(url).as_deref(), None | Some("http" | "https"))
}

/// Anything [`is_web_url`] accepts, plus mailto.
pub fn is_link_url(url: &str) -> bool {
    is_web_url(url) || url_scheme(url).as_deref() == Some("mailto")
}

/// Escapes `url` for a CSS `url('...')` inside an HTML attribute.
pub fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' => out.push_str("%27"),
            '"' => out.push_str("%22"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '\\' => out.push_str("%5C"),
            c if c.is_whitespace() || c.is_control() => {
                for byte in c.encode_utf8(&mut [0; 4]).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
            _ => out.push(c),
        }
    }
    escape(&out)
}

pub fn alert(category: &str, message: &str) -> String {
    fill(
        include_res!(str, "/pages/alert.html"),
        &[("category", &escape(category)), ("message", &escape(message))],
    )
}

/// Wraps `content` in the site layout, draining pending flashes into it.
pub async fn page(session: &Session, user: Option<&User>, title: &str, content: &str) -> AppResult<Response> {
    let flashes: String = session::take_flashes(session)
        .await?
        .iter()
        .map(|flash| alert(&flash.category, &flash.message))
        .collect();

    let nav = match user {
        Some(user) => fill(
            include_res!(str, "/pages/nav_user.html"),
            &[
                ("id", &user.id.to_string()),
                ("username", &escape(&user.username)),
                ("image_url", &escape(user.image_url())),
            ],
        ),
        None => include_res!(str, "/pages/nav_anon.html").to_owned(),
    };

    Ok(Html(fill(
        include_res!(str, "/pages/base.html"),
        &[
            ("title", &escape(title)),
            ("nav", &nav),
            ("flashes", &flashes),
            ("content", content),
        ],
    ))
    .into_response())
}

pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(fill(include_res!(str, "/pages/sorry.html"), &[("what", &escape(what))])),
    )
        .into_response())
}

pub async fn unauthorized(session: &Session) -> AppResult<Response> {
    session::flash(session, "danger", "Access unauthorized.").await?;
    Ok(Redirect::to("/").into_response())
}
