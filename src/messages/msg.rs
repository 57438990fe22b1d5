use std::collections::HashSet;

use pulldown_cmark::{html, CowStr, Event, Parser, Tag};

use crate::{
    include_res,
    models::{User, Warble, DEFAULT_IMAGE_URL},
    res::{escape, fill, is_link_url, is_web_url},
};

/// Renders message text as markdown. Raw HTML in the text is shown, not
/// interpreted, and links or images with a script-capable scheme point at `#`.
pub(crate) fn text_to_html(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) if !is_link_url(&dest_url) => {
            Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        Event::Start(Tag::Image { link_type, dest_url, title, id }) if !is_web_url(&dest_url) => {
            Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        _ => event,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// One message as a list item. `viewer` gets a like button on messages that
/// aren't theirs; `liked` holds the ids the viewer already likes.
pub(crate) fn warble_to_html(warble: &Warble, viewer: Option<&User>, liked: &HashSet<i64>) -> String {
    let like_button = match viewer {
        Some(viewer) if viewer.id != warble.user_id => {
            let is_liked = liked.contains(&warble.id);
            fill(
                include_res!(str, "/pages/like_button.html"),
                &[
                    ("id", &warble.id.to_string()),
                    ("class", if is_liked { "btn-primary" } else { "btn-secondary" }),
                    ("star", if is_liked { "&#9733;" } else { "&#9734;" }),
                ],
            )
        }
        _ => String::new(),
    };

    fill(
        include_res!(str, "/pages/message_item.html"),
        &[
            ("id", &warble.id.to_string()),
            ("user_id", &warble.user_id.to_string()),
            ("username", &escape(&warble.username)),
            ("image_url", &escape(warble.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL))),
            ("timestamp", &warble.timestamp.format("%d %B %Y").to_string()),
            ("text", &text_to_html(&warble.text)),
            ("like_button", &like_button),
        ],
    )
}

pub(crate) fn warbles_to_html(warbles: &[Warble], viewer: Option<&User>, liked: &HashSet<i64>) -> String {
    warbles
        .iter()
        .map(|warble| warble_to_html(warble, viewer, liked))
        .collect()
}
