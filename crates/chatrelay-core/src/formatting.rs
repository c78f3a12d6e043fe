//! Message text → HTML for rendering surfaces.
//!
//! All raw text is HTML-escaped before any markup is introduced, so message
//! content can never inject elements of its own.
//!
//! Supported conversions:
//! - Code blocks (```lang\n...```) → `<pre><code>...</code></pre>`
//! - Inline code (`) → `<code>...</code>`
//! - Bare URLs → `<a href="..." target="_blank" rel="noopener noreferrer">...</a>`
//! - Bold (**) → `<strong>...</strong>`
//! - Italic (*) → `<em>...</em>`
//! - Newlines → `<br>`

use regex::Regex;

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Convert a chat message to display HTML.
pub fn format_message(text: &str) -> String {
    // 1. Extract and protect code blocks
    let mut code_blocks: Vec<String> = Vec::new();
    let re_code_block = Regex::new(r"(?s)```(?:\w+)?\n(.*?)```").unwrap();
    let text = re_code_block.replace_all(text, |caps: &regex::Captures| {
        let idx = code_blocks.len();
        code_blocks.push(escape_html(&caps[1]));
        format!("\x00CB{idx}\x00")
    });

    // 2. Extract and protect inline code
    let mut inline_codes: Vec<String> = Vec::new();
    let re_inline = Regex::new(r"`([^`]+)`").unwrap();
    let text = re_inline.replace_all(&text, |caps: &regex::Captures| {
        let idx = inline_codes.len();
        inline_codes.push(escape_html(&caps[1]));
        format!("\x00IC{idx}\x00")
    });

    // 3. Escape everything else
    let text = escape_html(&text);

    // 4. Extract and protect links so emphasis can't split them.
    // Trailing emphasis markers and sentence punctuation stay outside the link.
    let mut links: Vec<String> = Vec::new();
    let re_url = Regex::new(r"https?://[^\s\x00]*[^\s\x00*.,:!?)]").unwrap();
    let text = re_url.replace_all(&text, |caps: &regex::Captures| {
        let idx = links.len();
        let url = &caps[0];
        links.push(format!(
            r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
        ));
        format!("\x00LK{idx}\x00")
    });

    // 5. Bold **text**
    let re_bold = Regex::new(r"\*\*(\S(?:.*?\S)?)\*\*").unwrap();
    let text = re_bold.replace_all(&text, "<strong>$1</strong>");

    // 6. Italic *text* (no leading/trailing space, so `2 * 3 * 4` is left alone)
    let re_italic = Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap();
    let text = re_italic.replace_all(&text, "<em>$1</em>");

    // 7. Restore protected spans
    let mut text = text.to_string();
    for (idx, link) in links.iter().enumerate() {
        text = text.replace(&format!("\x00LK{idx}\x00"), link);
    }
    for (idx, code) in inline_codes.iter().enumerate() {
        text = text.replace(&format!("\x00IC{idx}\x00"), &format!("<code>{code}</code>"));
    }
    for (idx, code) in code_blocks.iter().enumerate() {
        text = text.replace(
            &format!("\x00CB{idx}\x00"),
            &format!("<pre><code>{code}</code></pre>"),
        );
    }

    // 8. Line breaks, code blocks included
    text.replace('\n', "<br>")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
