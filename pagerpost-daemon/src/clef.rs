//! Compact Log Event Format (CLEF) decoding.
//!
//! Each input line is one JSON object. Reserved keys start with `@`:
//!
//! | key   | meaning                                   |
//! |-------|-------------------------------------------|
//! | `@t`  | RFC 3339 timestamp                        |
//! | `@m`  | already rendered message                  |
//! | `@mt` | message template, rendered when no `@m`   |
//! | `@l`  | level name (defaults to `Information`)    |
//! | `@x`  | exception text                            |
//!
//! Every other key becomes an event property. A key starting with `@@`
//! is an escaped property name: `@@tag` becomes property `@tag`.
//! `@i`, `@r` and unknown reserved keys are ignored.

use std::collections::HashMap;
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use uuid::Uuid;

use pagerpost_core::event::{LogEvent, LogLevel, PropertyValue};

/// Decodes one CLEF line into a [`LogEvent`] with a fresh UUID v4 id.
pub fn parse_line(line: &str) -> Result<LogEvent> {
    let value: Value = serde_json::from_str(line).context("invalid JSON")?;
    let Value::Object(fields) = value else {
        bail!("CLEF event must be a JSON object");
    };

    let mut timestamp = None;
    let mut message = None;
    let mut template = None;
    let mut level = LogLevel::Information;
    let mut exception = None;
    let mut properties = HashMap::with_capacity(fields.len());

    for (key, value) in fields {
        if !key.starts_with('@') {
            properties.insert(key, PropertyValue::from(value));
            continue;
        }
        if let Some(escaped) = key.strip_prefix("@@") {
            properties.insert(format!("@{escaped}"), PropertyValue::from(value));
            continue;
        }
        match key.as_str() {
            "@t" => timestamp = Some(parse_timestamp(&expect_string(&key, value)?)?),
            "@m" => message = Some(expect_string(&key, value)?),
            "@mt" => template = Some(expect_string(&key, value)?),
            "@l" => {
                level = expect_string(&key, value)?
                    .parse()
                    .map_err(anyhow::Error::msg)?;
            }
            "@x" => exception = Some(expect_string(&key, value)?),
            _ => {}
        }
    }

    let rendered_message = message
        .or_else(|| template.map(|t| render_template(&t, &properties)))
        .unwrap_or_default();

    Ok(LogEvent {
        id: Uuid::new_v4().to_string(),
        timestamp: timestamp.unwrap_or_else(SystemTime::now),
        level,
        rendered_message,
        exception,
        properties,
    })
}

fn expect_string(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => bail!("'{key}' must be a string, got {other}"),
    }
}

fn parse_timestamp(text: &str) -> Result<SystemTime> {
    let parsed = chrono::DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("invalid '@t' timestamp '{text}'"))?;
    Ok(SystemTime::from(parsed))
}

/// Renders a message template by substituting `{Name}` holes.
///
/// Values are written with their plain text form (strings unquoted).
/// `{@Name}` and `{$Name}` capture hints, `,alignment` and `:format`
/// suffixes are accepted and ignored. `{{` and `}}` are literal braces.
/// Holes naming an absent property are left as written.
pub fn render_template(template: &str, properties: &HashMap<String, PropertyValue>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
        } else if let Some(end) = tail.find('}') {
            match render_hole(&tail[1..end], properties) {
                Some(text) => out.push_str(&text),
                None => out.push_str(&tail[..=end]),
            }
            rest = &tail[end + 1..];
        } else {
            // unterminated hole
            out.push_str(tail);
            rest = "";
        }
    }
    out.push_str(rest);
    out
}

fn render_hole(hole: &str, properties: &HashMap<String, PropertyValue>) -> Option<String> {
    let name = hole.strip_prefix(['@', '$']).unwrap_or(hole);
    let name = name.split([',', ':']).next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    properties.get(name).map(ToString::to_string)
}
