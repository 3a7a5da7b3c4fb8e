//! Response Parser: pulls the JSON payload out of the provider's free text
//! and validates it into typed fields.
//!
//! Lookup order: a fenced code block, else the first balanced `{...}` span.
//! Anything missing or mistyped is a `PARSE_ERROR`; partial data is never
//! returned.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::optimization::error::OptimizeError;
use crate::optimization::models::{ContentKind, ResultExtra};

/// Names models emit when they fail to carry the real one over.
const PLACEHOLDER_NAMES: &[&str] = &[
    "john doe",
    "jane doe",
    "your name",
    "[name]",
    "[your name]",
    "[full name]",
    "full name",
    "first last",
    "firstname lastname",
    "candidate name",
    "applicant name",
];

/// Words that mark a line as a section heading rather than a name.
const HEADING_WORDS: &[&str] = &[
    "resume",
    "résumé",
    "curriculum",
    "vitae",
    "cv",
    "summary",
    "profile",
    "objective",
    "experience",
    "education",
    "skills",
    "contact",
    "references",
];

/// How many non-empty lines of the original input are searched for a name.
const NAME_SEARCH_LINES: usize = 5;

/// Validated provider payload, before request metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub rewritten_text: String,
    pub score: u8,
    pub suggestions: Vec<String>,
    pub extra: ResultExtra,
}

/// Parses `text` for `kind`. For resumes with `repair_names`, a placeholder
/// name on the first line is replaced by one found in `original`.
pub fn parse_response(
    kind: ContentKind,
    text: &str,
    original: &str,
    repair_names: bool,
) -> Result<ParsedPayload, OptimizeError> {
    let json = extract_json(text)
        .ok_or_else(|| OptimizeError::Parse("no JSON object found in response".to_string()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| OptimizeError::Parse(format!("invalid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| OptimizeError::Parse("response JSON is not an object".to_string()))?;

    let mut rewritten_text = match object.get("rewritten_text") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) => {
            return Err(OptimizeError::Parse("`rewritten_text` is empty".to_string()))
        }
        Some(_) => {
            return Err(OptimizeError::Parse(
                "`rewritten_text` must be a string".to_string(),
            ))
        }
        None => return Err(OptimizeError::Parse("missing `rewritten_text`".to_string())),
    };

    let raw_score = match object.get("score") {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| OptimizeError::Parse("`score` is not representable".to_string()))?,
        Some(_) => return Err(OptimizeError::Parse("`score` must be a number".to_string())),
        None => return Err(OptimizeError::Parse("missing `score`".to_string())),
    };
    let score = clamp_score(raw_score);
    if f64::from(score) != raw_score {
        debug!(raw_score, score, "normalized provider score");
    }

    let suggestions = string_list(object, "suggestions")?;

    let extra = match kind {
        ContentKind::Resume => ResultExtra::Resume {
            missing_keywords: string_list(object, "missing_keywords")?,
        },
        ContentKind::Post => ResultExtra::Post {
            hashtags: string_list(object, "hashtags")?,
            alternatives: string_list(object, "alternatives")?,
        },
    };

    if kind == ContentKind::Resume && repair_names {
        if let Some(repaired) = repair_placeholder_name(&rewritten_text, original) {
            info!("replaced placeholder name in rewritten resume");
            rewritten_text = repaired;
        }
    }

    Ok(ParsedPayload {
        rewritten_text,
        score,
        suggestions,
        extra,
    })
}

/// Rounds and clamps a provider score into 0..=100.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Locates the JSON object in free text.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(fenced) = fenced_block(text) {
        if let Some(object) = balanced_object(fenced) {
            return Some(object);
        }
    }
    balanced_object(text)
}

/// Inner text of the first ``` fenced block, language tag skipped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip an optional language tag such as `json`.
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let tag = after_fence[..body_start].trim();
    let body = if tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        &after_fence[body_start..]
    } else {
        after_fence
    };
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// First `{...}` span whose braces balance, ignoring braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Optional array-of-strings field; absent or null means empty.
fn string_list(object: &Map<String, Value>, field: &str) -> Result<Vec<String>, OptimizeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| OptimizeError::Parse(format!("`{field}` must contain only strings")))
            })
            .collect(),
        Some(_) => Err(OptimizeError::Parse(format!("`{field}` must be an array"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Placeholder name repair (best effort)
// ────────────────────────────────────────────────────────────────────────────

/// Returns `rewritten` with its first line swapped for the real name, or
/// `None` when the first line is not a placeholder or no name was found.
fn repair_placeholder_name(rewritten: &str, original: &str) -> Option<String> {
    let first_line = rewritten.lines().find(|l| !l.trim().is_empty())?;
    if !is_placeholder_name(first_line) {
        return None;
    }

    let name = original
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(NAME_SEARCH_LINES)
        .map(strip_markup)
        .find(|l| is_plausible_name(l) && !is_placeholder_name(l))?;

    let trimmed = first_line.trim();
    let prefix: String = trimmed
        .chars()
        .take_while(|c| matches!(c, '#' | '*' | ' '))
        .collect();
    let suffix: String = trimmed
        .chars()
        .rev()
        .take_while(|c| *c == '*')
        .collect();
    let replacement = format!("{prefix}{name}{suffix}");

    // Line endings (LF or CRLF) are kept as they came.
    let mut repaired = String::with_capacity(rewritten.len() + replacement.len());
    let mut replaced = false;
    for segment in rewritten.split_inclusive('\n') {
        let line = segment
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(segment);
        if !replaced && line == first_line {
            replaced = true;
            repaired.push_str(&replacement);
            repaired.push_str(&segment[line.len()..]);
        } else {
            repaired.push_str(segment);
        }
    }
    Some(repaired)
}

fn strip_markup(line: &str) -> &str {
    line.trim_matches(|c: char| matches!(c, '#' | '*' | '_') || c.is_whitespace())
}

fn is_placeholder_name(line: &str) -> bool {
    let normalized = strip_markup(line).to_lowercase();
    PLACEHOLDER_NAMES.contains(&normalized.as_str())
}

/// 2–4 capitalized alphabetic words, no digits, contacts or headings.
fn is_plausible_name(line: &str) -> bool {
    let char_count = line.chars().count();
    if !(3..=60).contains(&char_count) {
        return false;
    }
    if line.chars().any(|c| c.is_ascii_digit() || matches!(c, '@' | '|' | ':' | '/' | ',')) {
        return false;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }

    words.iter().all(|word| {
        let mut chars = word.chars();
        let capitalized = chars
            .next()
            .map(|c| c.is_alphabetic() && c.is_uppercase())
            .unwrap_or(false);
        let rest_ok = chars.all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'));
        let heading = HEADING_WORDS.contains(&word.to_lowercase().as_str());
        capitalized && rest_ok && !heading
    })
}
