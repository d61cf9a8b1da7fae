//! Rendering an [`HttpMessage`] as JSON, a human debug dump, or a
//! headers-only listing — used by the CLI binary.

use crate::types::HttpMessage;

/// Serialize a message to a JSON string; `pretty` indents for readability.
pub fn format_json(message: &HttpMessage, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(message).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(message).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a message in a human-readable debug format.
pub fn format_debug(message: &HttpMessage) -> String {
    let mut out = String::with_capacity(256);

    match message {
        HttpMessage::Request(request) => {
            out.push_str("=== HTTP Request ===\n");
            out.push_str(&format!("Method:  {}\n", request.method));
            out.push_str(&format!("URI:     {}\n", request.uri));
            out.push_str(&format!("Version: {}\n", request.version));
        }
        HttpMessage::Response(response) => {
            out.push_str("=== HTTP Response ===\n");
            out.push_str(&format!("Version: {}\n", response.version));
            out.push_str(&format!("Status:  {} {}\n", response.status_code, response.reason));
        }
    }

    out.push_str(&format!("\n--- Headers ({}) ---\n", message.headers().len()));
    for header in message.headers() {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    match message.body() {
        Some(body) => {
            out.push_str(&format!("\n--- Body ({} bytes) ---\n", body.len()));
            match std::str::from_utf8(body) {
                Ok(s) => out.push_str(s),
                Err(_) => out.push_str(&format!("<binary data: {} bytes>", body.len())),
            }
            out.push('\n');
        }
        None => out.push_str("\n--- No Body ---\n"),
    }

    out.push_str("====================\n");
    out
}

/// Render only the request/status line and headers (no body).
pub fn format_headers_only(message: &HttpMessage) -> String {
    let mut out = String::with_capacity(64 + message.headers().len() * 40);

    match message {
        HttpMessage::Request(request) => {
            out.push_str(&format!(
                "{} {} {}\n",
                request.method, request.uri, request.version
            ));
        }
        HttpMessage::Response(response) => {
            out.push_str(&format!(
                "{} {} {}\n",
                response.version, response.status_code, response.reason
            ));
        }
    }

    for header in message.headers() {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }

    out
}
