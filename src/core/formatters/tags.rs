//! Inline tag expansion.
//!
//! Rule text embeds markup of the form `{@kind arg|arg|...}`. The scanner
//! pairs every brace in one pass, then walks the text and dispatches on each
//! tag's kind. Unknown kinds keep their first argument. Text with no tags
//! passes through unchanged.

use std::collections::HashMap;
use std::fmt::Write;

const OPEN: &str = "{@";

/// Tags nested deeper than this keep their inner markup as plain text.
const MAX_TAG_DEPTH: usize = 32;

/// Expand every `{@...}` tag in `text` to HTML.
///
/// A tag with no matching close brace is left as-is; scanning resumes just
/// past its opening marker so nested well-formed tags still expand.
pub fn process_formatting_tags(text: &str) -> String {
    let scanner = Scanner::new(text);
    let mut out = String::with_capacity(text.len());
    scanner.render(&mut out, 0, text.len(), 0);
    out
}

/// Source text with the matching close of every `{`.
struct Scanner<'a> {
    text: &'a str,
    closes: HashMap<usize, usize>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        let mut closes = HashMap::new();
        let mut open = Vec::new();
        for (i, b) in text.bytes().enumerate() {
            match b {
                b'{' => open.push(i),
                b'}' => {
                    if let Some(start) = open.pop() {
                        closes.insert(start, i);
                    }
                }
                _ => {}
            }
        }
        Self { text, closes }
    }

    /// Expand tags in `text[start..end]` at nesting level `depth`.
    fn render(&self, out: &mut String, start: usize, end: usize, depth: usize) {
        let mut pos = start;
        while let Some(found) = self.text[pos..end].find(OPEN) {
            let at = pos + found;
            out.push_str(&self.text[pos..at]);
            match self.tag_at(at, end) {
                Some(tag) => {
                    tag.render(self, out, depth);
                    pos = tag.close + 1;
                }
                None => {
                    out.push_str(OPEN);
                    pos = at + OPEN.len();
                }
            }
        }
        out.push_str(&self.text[pos..end]);
    }

    /// Parse the tag whose `{@` sits at byte `at`.
    fn tag_at(&self, at: usize, end: usize) -> Option<Tag<'a>> {
        let close = *self.closes.get(&at)?;
        if close >= end {
            return None;
        }
        let inner = &self.text[at + OPEN.len()..close];

        let kind_len = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let kind = &inner[..kind_len];
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        let body = inner[kind_len..].trim_start();

        Some(Tag { kind, body, close })
    }
}

/// Long names for `{@atk}` codes.
fn attack_type(code: &str) -> Option<&'static str> {
    match code {
        "mw" => Some("Melee Weapon Attack"),
        "rw" => Some("Ranged Weapon Attack"),
        "ms" => Some("Melee Spell Attack"),
        "rs" => Some("Ranged Spell Attack"),
        "mw,rw" => Some("Melee or Ranged Weapon Attack"),
        "ms,rs" => Some("Melee or Ranged Spell Attack"),
        _ => None,
    }
}

/// Escape text for use inside a double-quoted attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag<'a> {
    kind: &'a str,
    body: &'a str,
    /// Byte offset of the closing brace in the scanned text.
    close: usize,
}

impl<'a> Tag<'a> {
    /// Split the body on `|` separators that are not inside a nested tag.
    fn args(&self) -> Vec<&'a str> {
        if self.body.is_empty() {
            return Vec::new();
        }
        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, b) in self.body.bytes().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'|' if depth == 0 => {
                    args.push(&self.body[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        args.push(&self.body[start..]);
        args
    }

    fn render(&self, scanner: &Scanner<'a>, out: &mut String, depth: usize) {
        let args = self.args();
        let arg = |i: usize| args.get(i).copied().map(str::trim).filter(|s| !s.is_empty());
        let first = arg(0).unwrap_or("");
        let body = || {
            if depth >= MAX_TAG_DEPTH {
                return self.body.to_string();
            }
            let mut html = String::with_capacity(self.body.len());
            scanner.render(&mut html, self.close - self.body.len(), self.close, depth + 1);
            html
        };

        // Writing into a String cannot fail.
        let _ = match self.kind {
            "b" | "bold" => write!(out, "<strong>{}</strong>", body()),
            "i" | "italic" => write!(out, "<em>{}</em>", body()),
            "bi" => write!(out, "<strong><em>{}</em></strong>", body()),
            "s" | "strike" => write!(out, "<s>{}</s>", body()),
            "u" | "underline" => write!(out, "<u>{}</u>", body()),
            "code" => write!(out, "<code>{}</code>", self.body),
            "note" => write!(out, "<span class=\"note\">Note: {}</span>", body()),

            "dice" => write!(out, "<span class=\"dice-roll\">{}</span>", arg(1).unwrap_or(first)),
            "damage" => write!(out, "<span class=\"damage-roll\">{}</span>", first),
            "d20" => write!(out, "<span class=\"d20-roll\">d20{}</span>", first),
            "hit" => {
                let bonus = if first.starts_with('+') || first.starts_with('-') {
                    first.to_string()
                } else {
                    format!("+{first}")
                };
                write!(out, "<span class=\"hit-bonus\">{bonus}</span>")
            }
            "scaledice" | "scaledamage" => {
                write!(out, "<span class=\"scaled-value\">{first}</span>")
            }
            "dc" => match arg(1) {
                Some(ability) => write!(out, "<span class=\"dc-check\">DC {first} {ability}</span>"),
                None => write!(out, "<span class=\"dc-check\">DC {first}</span>"),
            },
            "chance" => match arg(1) {
                Some(text) => write!(out, "<span class=\"chance\">{text}</span>"),
                None => write!(out, "<span class=\"chance\">{first}% chance</span>"),
            },
            "recharge" => match arg(0) {
                Some(n) => write!(out, "<span class=\"recharge\">(Recharge {n}\u{2013}6)</span>"),
                None => write!(out, "<span class=\"recharge\">(Recharge)</span>"),
            },
            "atk" => write!(out, "<em>{}:</em>", attack_type(first).unwrap_or(first)),
            "h" => write!(out, "<em>Hit:</em> "),

            "condition" => write!(out, "<span class=\"condition\">{first}</span>"),
            "status" => write!(out, "<span class=\"status\">{first}</span>"),
            "skill" => write!(out, "<span class=\"skill\">{first}</span>"),
            "sense" => write!(out, "<span class=\"sense\">{first}</span>"),
            "action" => write!(out, "<span class=\"action\">{first}</span>"),
            "classFeature" => write!(out, "<span class=\"feature-ref\">{first}</span>"),
            "filter" => write!(out, "<span class=\"filter-ref\">{first}</span>"),
            "book" => write!(out, "<span class=\"book-ref\">{}</span>", arg(3).unwrap_or(first)),

            "spell" | "item" | "creature" | "race" | "background" | "feat" => {
                let display = arg(2).unwrap_or(first);
                write_reference(out, self.kind, first, arg(1), display)
            }
            "class" => {
                let display = arg(3).unwrap_or(first);
                write_reference(out, "class", first, arg(1), display)
            }

            "link" => match arg(1) {
                Some(url) => write!(
                    out,
                    "<a href=\"{}\" target=\"_blank\">{}</a>",
                    escape_attr(url),
                    first
                ),
                None => write!(out, "{first}"),
            },

            _ => write!(out, "<span class=\"tagged\">{first}</span>"),
        };
    }
}

/// Clickable cross-reference span carrying the lookup key.
fn write_reference(
    out: &mut String,
    kind: &str,
    name: &str,
    source: Option<&str>,
    display: &str,
) -> std::fmt::Result {
    write!(
        out,
        "<span class=\"{kind}-ref cross-ref-link\" data-ref-type=\"{kind}\" data-ref-name=\"{}\" data-ref-source=\"{}\">{display}</span>",
        escape_attr(name),
        escape_attr(source.unwrap_or("")),
    )
}
