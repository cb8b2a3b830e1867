//! Front-matter text format.
//!
//! ```text
//! ---
//! title: "Ciclo Menstrual 101"
//! category: "Ciclo"
//! date: "05-03-2025"
//! ---
//!
//! Body starts here.
//! ```

use crate::document::FrontMatter;

const FENCE: &str = "---";

/// Result of [`decode`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Serialize front matter and body.
///
/// Leading whitespace of the body is dropped and the body ends with exactly
/// one newline.
pub fn encode(front_matter: &FrontMatter, body: &str) -> String {
    let body = body.trim_start().trim_end_matches(['\n', '\r']);
    let mut out = String::with_capacity(body.len() + 96);
    out.push_str(FENCE);
    out.push('\n');
    for (key, value) in [
        ("title", &front_matter.title),
        ("category", &front_matter.category),
        ("date", &front_matter.date),
    ] {
        out.push_str(key);
        out.push_str(": \"");
        out.push_str(&escape(value));
        out.push_str("\"\n");
    }
    out.push_str(FENCE);
    out.push_str("\n\n");
    out.push_str(body);
    out.push('\n');
    out
}

/// Parse a stored article. Best effort: a missing or unterminated block
/// means no front matter, unknown keys are ignored, missing keys are empty.
pub fn decode(text: &str) -> Decoded {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some((header, rest)) = split_front_matter(text) else {
        return Decoded {
            front_matter: FrontMatter::default(),
            body: text.to_string(),
        };
    };

    let mut front_matter = FrontMatter::default();
    for line in header.lines() {
        let Some((key, raw)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "title" => &mut front_matter.title,
            "category" => &mut front_matter.category,
            "date" => &mut front_matter.date,
            _ => continue,
        };
        *slot = parse_scalar(raw);
    }

    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    Decoded {
        front_matter,
        body: body.to_string(),
    }
}

/// Split `---\n<header>\n---\n<rest>`. `None` if the text does not open
/// with a fence or the fence is never closed.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let after_open = text
        .strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let header = &after_open[..offset];
            let rest = &after_open[offset + line.len()..];
            return Some((header, rest));
        }
        offset += line.len();
    }
    None
}

fn parse_scalar(raw: &str) -> String {
    let value = raw.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        unescape_double(&value[1..value.len() - 1])
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
