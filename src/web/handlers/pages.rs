//! Page handlers: room link generation and the share/view pages.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::HOST, HeaderMap},
    response::Html,
};
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::state::AppState;
use crate::relay::new_room_id;

/// Header set by reverse proxies carrying the original scheme.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Render the shared page layout.
///
/// `title` is escaped here; `content` is inserted as-is and must already be
/// safe HTML.
pub fn render_page(title: &str, content: &str, room_id: Option<&str>) -> String {
    let title = encode_text(title);
    let (room_attr, script) = match room_id {
        Some(id) => (
            format!(r#" data-room="{}""#, encode_double_quoted_attribute(id)),
            r#"<script src="/static/roomcast.js" defer></script>"#,
        ),
        None => (String::new(), ""),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
{script}
</head>
<body{room_attr}>
<main>
<h1>{title}</h1>
{content}
</main>
</body>
</html>
"#
    )
}

/// Base URL of the incoming request, e.g. `http://localhost:8088`.
fn base_url(headers: &HeaderMap, fallback_host: &str) -> String {
    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback_host);
    format!("{scheme}://{host}")
}

/// Generate a new room and show its share and view links.
///
/// GET /
pub async fn generate_room(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let room_id = new_room_id();
    let base = base_url(&headers, &state.public_host);
    let share_link = format!("{base}/share/{room_id}");
    let view_link = format!("{base}/view/{room_id}");

    tracing::debug!(room_id = %room_id, "generated room");

    let content = format!(
        r#"<p>Share your screen: <a id="share-link" href="{}">{}</a></p>
<p>View the shared screen: <a id="view-link" href="{}">{}</a></p>"#,
        encode_double_quoted_attribute(&share_link),
        encode_text(&share_link),
        encode_double_quoted_attribute(&view_link),
        encode_text(&view_link),
    );
    Html(render_page("Screen Sharing Links", &content, None))
}

/// Sharing page for a room.
///
/// GET /share/:room_id
pub async fn share_screen(Path(room_id): Path<String>) -> Html<String> {
    let escaped = encode_text(&room_id);
    let content = format!(
        r#"<p>Sharing screen for room <strong>{escaped}</strong>.</p>
<p><input id="outgoing" type="text" placeholder="Message to viewers"> <button id="send">Send</button></p>
<pre id="log"></pre>"#
    );
    Html(render_page(
        &format!("Sharing Room {room_id}"),
        &content,
        Some(&room_id),
    ))
}

/// Viewing page for a room.
///
/// GET /view/:room_id
pub async fn view_screen(Path(room_id): Path<String>) -> Html<String> {
    let escaped = encode_text(&room_id);
    let content = format!(
        r#"<p>Viewing screen for room <strong>{escaped}</strong>.</p>
<pre id="log"></pre>"#
    );
    Html(render_page(
        &format!("Viewing Room {room_id}"),
        &content,
        Some(&room_id),
    ))
}
