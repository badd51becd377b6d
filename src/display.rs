use crate::http::Fetched;
use crate::payload::{Payload, SuccessDataHandler};
use crate::Result;
use std::io::Write;

/// Where a result came from, as shown next to the URL.
fn origin(fetched: &Fetched) -> String {
    match fetched {
        Fetched::Network(response) => format!("network {}", response.status),
        Fetched::Cached(_) => "cache".to_string(),
    }
}

fn render_payload(payload: &Payload) -> Result<String> {
    let rendered = match payload {
        Payload::Text(text) => text.clone(),
        Payload::Json(value) => serde_json::to_string_pretty(value)?,
        Payload::Binary(data) => format!("<{} bytes>", data.len()),
        Payload::Blob(blob) => match &blob.content_type {
            Some(content_type) => format!("<{} bytes, {}>", blob.data.len(), content_type),
            None => format!("<{} bytes>", blob.data.len()),
        },
    };
    Ok(rendered)
}

/// Writes the URL, the origin of the result and its body. Network bodies
/// are rendered the way `handler` would parse them.
pub fn print<W: Write>(
    w: &mut W,
    url: &str,
    fetched: &Fetched,
    handler: SuccessDataHandler,
) -> Result<()> {
    writeln!(w, "{} [{}]", url, origin(fetched))?;
    let body = match fetched {
        Fetched::Cached(payload) => render_payload(payload)?,
        Fetched::Network(response) => render_payload(&handler.parse(response)?)?,
    };
    if !body.is_empty() {
        writeln!(w, "{body}")?;
    }
    Ok(())
}
