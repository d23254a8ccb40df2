//! Tolerant repair of model output into structured JSON
//!
//! Models asked for strict JSON routinely wrap it in prose or code fences,
//! stop mid-document, drop separators, or leave reserved characters
//! unescaped. [`repair`] turns any such text into a JSON value by trying an
//! ordered list of stages, each a plain `fn(&str) -> StageResult`. A stage
//! either parses (and wins) or hands a candidate to the next one. Extraction
//! narrows the candidate to the structured part. The rewriting stages pass
//! the candidate on unmodified when their rewrite does not parse, so every
//! stage starts from the text the model actually wrote.
//!
//! The two fallbacks look at the whole response: salvage needs a response
//! that starts with `{` or `[`, or a candidate with a recognizable `title`
//! or `intro` field. Anything else is wrapped as plain text.
//!
//! ```text
//! Direct → Extraction → Balancing → Separators → Escaping → Salvage → PlainText
//! ```
//!
//! Cheap, structure-preserving fixes run before the ones that rewrite string
//! content. Every scanner tracks string-literal state so braces, brackets
//! and sigils inside string values are never touched.
//!
//! Repair is total: the last two stages always produce a document.

use quill_domain::RawModelResponse;
use regex::Regex;
use serde_json::{json, Value};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Title given to documents synthesized without one
pub const UNTITLED: &str = "Untitled Article";

/// The stage that produced a repaired value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepairStage {
    /// The input parsed as-is
    Direct,
    /// A fenced block or the first object span parsed
    Extraction,
    /// Closing delimiters were appended or stray ones dropped
    Balancing,
    /// Missing commas were inserted or trailing ones removed
    Separators,
    /// Characters inside string literals were escaped
    Escaping,
    /// Only `title` and `intro` could be recovered
    Salvage,
    /// The text was not structured at all and was wrapped as an intro
    PlainText,
}

impl RepairStage {
    /// Whether the document was synthesized rather than repaired
    pub fn is_fallback(self) -> bool {
        matches!(self, RepairStage::Salvage | RepairStage::PlainText)
    }
}

impl fmt::Display for RepairStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepairStage::Direct => "direct",
            RepairStage::Extraction => "extraction",
            RepairStage::Balancing => "balancing",
            RepairStage::Separators => "separators",
            RepairStage::Escaping => "escaping",
            RepairStage::Salvage => "salvage",
            RepairStage::PlainText => "plain-text",
        };
        f.write_str(name)
    }
}

/// Result of a single repair stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageResult {
    /// The candidate parsed into a document
    Parsed {
        /// Parsed value
        value: Value,
        /// The text that parsed
        text: String,
    },
    /// Still broken; the rewritten candidate for the next stage
    Broken(String),
}

/// What [`repair`] produced
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    /// Repaired value: an object, or a sequence containing one
    pub value: Value,
    /// Stage that produced `value`
    pub stage: RepairStage,
    /// Text that `value` was parsed from
    pub text: String,
}

type Stage = fn(&str) -> StageResult;

const STAGES: [(RepairStage, Stage); 5] = [
    (RepairStage::Direct, direct),
    (RepairStage::Extraction, extraction),
    (RepairStage::Balancing, balancing),
    (RepairStage::Separators, separators),
    (RepairStage::Escaping, escaping),
];

/// Repair raw model output into a JSON document
///
/// Never fails. Valid documents come back unchanged from the
/// [`RepairStage::Direct`] stage.
///
/// # Examples
///
/// ```
/// use quill_generator::{repair, RepairStage};
///
/// let outcome = repair("```json\n{\"title\": \"Bitcoin Rally\", \"content\": {\"intro\": \"Up\"\n```");
/// assert_eq!(outcome.stage, RepairStage::Balancing);
/// assert_eq!(outcome.value["title"], "Bitcoin Rally");
/// ```
pub fn repair(raw: &str) -> RepairOutcome {
    let mut candidate = raw.to_string();

    for (stage, attempt) in STAGES {
        match attempt(&candidate) {
            StageResult::Parsed { value, text } => {
                match stage {
                    RepairStage::Direct | RepairStage::Extraction => {
                        debug!(%stage, "Model output parsed")
                    }
                    _ => info!(%stage, "Model output repaired"),
                }
                return RepairOutcome { value, stage, text };
            }
            StageResult::Broken(next) => {
                debug!(%stage, candidate_len = next.len(), "Stage did not yield a document");
                candidate = next;
            }
        }
    }

    if let Some(value) = salvage(&candidate, looks_structured(raw)) {
        warn!("Structural repair failed, salvaged title and intro");
        return RepairOutcome {
            text: value.to_string(),
            value,
            stage: RepairStage::Salvage,
        };
    }

    warn!("Model output is not structured, wrapping it as plain text");
    let value = plain_text(raw);
    let text = value.to_string();
    RepairOutcome {
        value,
        stage: RepairStage::PlainText,
        text,
    }
}

/// Repair a response in either of its raw shapes
pub fn repair_response(response: RawModelResponse) -> RepairOutcome {
    repair(&response.into_text())
}

/// Parse `text` if it holds a document: an object or a sequence with one
fn parse_document(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text).ok()?;
    let is_document = match &value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(Value::is_object),
        _ => false,
    };
    is_document.then_some(value)
}

fn attempt_parse(text: String) -> StageResult {
    match parse_document(&text) {
        Some(value) => StageResult::Parsed { value, text },
        None => StageResult::Broken(text),
    }
}

fn looks_structured(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn direct(text: &str) -> StageResult {
    attempt_parse(text.to_string())
}

fn extraction(text: &str) -> StageResult {
    attempt_parse(extract_candidate(text))
}

/// Parse `rewritten`, or pass `original` on so later stages see unmangled text
fn attempt_rewrite(original: &str, rewritten: String) -> StageResult {
    match parse_document(&rewritten) {
        Some(value) => StageResult::Parsed {
            value,
            text: rewritten,
        },
        None => StageResult::Broken(original.to_string()),
    }
}

fn balancing(text: &str) -> StageResult {
    if !looks_structured(text) {
        return StageResult::Broken(text.to_string());
    }
    attempt_rewrite(text, balance_delimiters(text))
}

fn separators(text: &str) -> StageResult {
    if !looks_structured(text) {
        return StageResult::Broken(text.to_string());
    }
    attempt_rewrite(text, balance_delimiters(&repair_separators(text)))
}

fn escaping(text: &str) -> StageResult {
    if !looks_structured(text) {
        return StageResult::Broken(text.to_string());
    }
    // Escaping can move string boundaries, so structure is re-checked after it
    let escaped = escape_string_literals(text);
    attempt_rewrite(text, balance_delimiters(&repair_separators(&escaped)))
}

/// Locate the structured part of a response
///
/// Takes the body of the first fenced code block holding a `{` if there is
/// one (an unterminated fence runs to the end of the text), otherwise the
/// whole text, then narrows to the first `{` and its matching `}`. Without a match the span runs to the
/// end, leaving truncation to the balancing stage. Text with no `{` at all
/// is returned trimmed.
pub fn extract_candidate(text: &str) -> String {
    let scope = fenced_body(text).unwrap_or(text).trim();

    match scope.find('{') {
        Some(start) => match matching_brace(scope, start) {
            Some(end) => scope[start..=end].to_string(),
            None => scope[start..].trim_end().to_string(),
        },
        None => scope.to_string(),
    }
}

fn fenced_body(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let tag_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        let body = &after[tag_len..];
        let (content, next) = match body.find("```") {
            Some(end) => (&body[..end], &body[end + 3..]),
            None => (body, ""),
        };
        if content.contains('{') {
            return Some(content);
        }
        rest = next;
    }
    None
}

/// Byte offset of the `}` closing the `{` at `start`, skipping string content
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Balance `{}` and `[]` outside string literals
///
/// Unmatched closers are dropped. A closer that skips over open containers
/// closes them first. A string literal cut off by truncation is terminated,
/// unless it is an object key: a key without its value is cut off together
/// with the `,` before it. A dangling `,` is dropped and a dangling `:` gets
/// a `null` value. Missing closers are then appended innermost first.
pub fn balance_delimiters(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    // Last significant character outside strings
    let mut last: Option<char> = None;
    // Where the latest string literal starts in `out` and whether it is a key
    let mut string_start = 0;
    let mut string_is_key = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last = Some('"');
            }
            continue;
        }

        match c {
            '"' => {
                string_start = out.len();
                string_is_key =
                    expected.last() == Some(&'}') && matches!(last, Some('{' | ','));
                in_string = true;
                out.push(c);
            }
            '{' => {
                expected.push('}');
                out.push(c);
                last = Some(c);
            }
            '[' => {
                expected.push(']');
                out.push(c);
                last = Some(c);
            }
            '}' | ']' => {
                if expected.contains(&c) {
                    while let Some(closer) = expected.pop() {
                        out.push(closer);
                        if closer == c {
                            break;
                        }
                    }
                    last = Some(c);
                }
            }
            c if c.is_whitespace() => out.push(c),
            _ => {
                out.push(c);
                last = Some(c);
            }
        }
    }

    let key_without_value = string_is_key && (in_string || last == Some('"'));
    if key_without_value && !expected.is_empty() {
        out.truncate(string_start);
    } else if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    if !expected.is_empty() && (key_without_value || !in_string) {
        out.truncate(out.trim_end().len());
        if out.ends_with(',') {
            out.pop();
        } else if out.ends_with(':') {
            out.push_str(" null");
        }
    }

    while let Some(closer) = expected.pop() {
        out.push(closer);
    }
    out
}

fn ends_value(c: char) -> bool {
    matches!(c, '"' | '}' | ']') || c.is_ascii_alphanumeric()
}

/// Insert missing commas between adjacent values and drop trailing ones
///
/// A value end (closing quote, `}`, `]` or the last character of a literal)
/// directly followed by a value start (`"`, `{`, `[`) gets a comma between
/// them. A comma directly before `}` or `]` is removed.
pub fn repair_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    // Last significant character outside strings and the length of `out` after it
    let mut last: Option<(char, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last = Some(('"', out.len()));
            }
            continue;
        }

        match c {
            '"' | '{' | '[' => {
                if let Some((prev, at)) = last {
                    if ends_value(prev) {
                        out.insert(at, ',');
                    }
                }
                out.push(c);
                in_string = c == '"';
                last = Some((c, out.len()));
            }
            '}' | ']' => {
                if let Some((',', at)) = last {
                    out.remove(at - 1);
                }
                out.push(c);
                last = Some((c, out.len()));
            }
            c if c.is_whitespace() => out.push(c),
            _ => {
                out.push(c);
                last = Some((c, out.len()));
            }
        }
    }
    out
}

/// Escape characters that end string literals too early
///
/// Only string content is rewritten:
/// - a backslash starting an invalid escape is doubled, except before the
///   `$` sigil where it is dropped (`\$BTC` becomes `$BTC`)
/// - raw control characters become escape sequences
/// - a quote is treated as closing only when the next non-whitespace
///   character is `,` `}` `]` `:` or the end of the text, or when a line
///   break and another quote follow it; otherwise it is escaped as part of
///   the content
pub fn escape_string_literals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !in_string {
            out.push(c);
            in_string = c == '"';
            i += 1;
            continue;
        }

        match c {
            '\\' => match chars.get(i + 1).copied() {
                Some(next @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                    out.push('\\');
                    out.push(next);
                    i += 2;
                }
                Some('u')
                    if chars.len() >= i + 6
                        && chars[i + 2..i + 6].iter().all(char::is_ascii_hexdigit) =>
                {
                    out.extend(&chars[i..i + 6]);
                    i += 6;
                }
                Some('$') => {
                    out.push('$');
                    i += 2;
                }
                _ => {
                    out.push_str("\\\\");
                    i += 1;
                }
            },
            '"' => {
                let gap = chars[i + 1..].iter().take_while(|ch| ch.is_whitespace());
                let line_break = gap.clone().any(|&ch| ch == '\n');
                let next = chars.get(i + 1 + gap.count()).copied();
                // A quote ending a line before another quoted token closes a
                // value whose separator is missing
                if matches!(next, None | Some(',' | '}' | ']' | ':'))
                    || (line_break && next == Some('"'))
                {
                    out.push('"');
                    in_string = false;
                } else {
                    out.push_str("\\\"");
                }
                i += 1;
            }
            '\n' => {
                out.push_str("\\n");
                i += 1;
            }
            '\r' => {
                out.push_str("\\r");
                i += 1;
            }
            '\t' => {
                out.push_str("\\t");
                i += 1;
            }
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""title"\s*:\s*"((?:[^"\\]|\\.)*)(?:"|\z)"#).expect("valid regex")
});

static INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""intro(?:duction)?"\s*:\s*"((?:[^"\\]|\\.)*)(?:"|\z)"#).expect("valid regex")
});

static PART1_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"part\s?1"\s*:\s*"((?:[^"\\]|\\.)*)(?:"|\z)"#).expect("valid regex")
});

static PART2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"part\s?2"\s*:\s*"((?:[^"\\]|\\.)*)(?:"|\z)"#).expect("valid regex")
});

/// Decode the raw content of a JSON string literal, keeping it verbatim if invalid
fn unescape_literal(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_literal(m.as_str()).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Recover `title` and the intro from a candidate no stage could parse
///
/// A response that starts like a document is always salvaged. Otherwise
/// salvage needs at least one of the two fields.
fn salvage(text: &str, structured: bool) -> Option<Value> {
    let title = capture(&TITLE_RE, text);
    let part1 = capture(&PART1_RE, text);
    let part2 = capture(&PART2_RE, text);
    let plain_intro = capture(&INTRO_RE, text);

    let found = title.is_some() || part1.is_some() || part2.is_some() || plain_intro.is_some();
    if !structured && !found {
        return None;
    }

    let intro = if part1.is_some() || part2.is_some() {
        json!({
            "Part1": part1.unwrap_or_default(),
            "Part2": part2.unwrap_or_default(),
        })
    } else {
        Value::String(plain_intro.unwrap_or_else(|| text.trim().to_string()))
    };

    Some(json!({
        "title": title.unwrap_or_else(|| UNTITLED.to_string()),
        "content": { "intro": intro },
    }))
}

fn plain_text(text: &str) -> Value {
    let body = text.trim();
    let title = body
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .unwrap_or(UNTITLED);

    json!({
        "title": title,
        "content": { "intro": body },
    })
}

/// Count `{`/`[` and `}`/`]` outside string literals
pub fn structural_delimiter_counts(text: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => opens += 1,
            '}' | ']' => closes += 1,
            _ => {}
        }
    }
    (opens, closes)
}
