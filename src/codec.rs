//! Stateless conversions between payload maps and the wire formats.
//!
//! The remote service accepts a single-root XML document and answers in JSON
//! or XML. Payloads are modeled as [`serde_json::Map`] values; lists are
//! `Value::Array` entries and serialize as repeated sibling elements named
//! after their key, which is how the wire format represents "lists of
//! same-named elements".
//!
//! Also here: HTML detection and stripping for error pages served in front
//! of the real endpoint, and password masking for safe logging.

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// The marker substituted for password values in logged texts.
pub const PASSWORD_MASK: &str = "REMOVED FOR SECURITY";

/// The throwaway root element wrapping every request payload. The remote
/// service ignores its name; the XML format merely requires a single root.
const XML_ROOT: &str = "myxml";

/// Errors from the conversion routines.
///
/// JSON and XML failures share this one type so callers never need to
/// distinguish failure origin.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document is not well-formed XML.
    #[error("invalid XML at line {line}, column {column}: {message}")]
    Xml {
        /// 1-based line of the reported issue.
        line: usize,
        /// 1-based column of the reported issue.
        column: usize,
        /// The parser's description of the issue.
        message: String,
    },

    /// The document is not valid JSON.
    #[error("invalid JSON: {message}")]
    Json {
        /// The decoder's description of the issue.
        message: String,
    },

    /// The JSON document decoded to something other than an object.
    #[error("expected a JSON object, got {kind}")]
    NotAnObject {
        /// The JSON kind that was found instead.
        kind: &'static str,
    },

    /// A map key cannot be used as an XML element name.
    #[error("cannot serialize key '{name}' as an XML element name")]
    InvalidElementName {
        /// The offending key.
        name: String,
    },

    /// A list directly inside a list has no element name to repeat.
    #[error("nested list under key '{name}' cannot be represented in the XML wire format")]
    NestedList {
        /// The key owning the outer list.
        name: String,
    },
}

// ---------------------------------------------------------------------------
// map -> XML
// ---------------------------------------------------------------------------

/// Serializes a payload map to a single-root XML document.
///
/// Map keys become element names. A `Value::Array` under key `k` emits one
/// `<k>` element per item (repeated siblings, not indexed tags). Booleans
/// serialize as literal `true`/`false`, null as an empty element.
/// Backslashes are escaped as the numeric entity `&#92;` so they survive
/// transport un-mangled.
///
/// # Errors
///
/// Returns [`CodecError::InvalidElementName`] for keys that are not valid
/// element names and [`CodecError::NestedList`] for a list directly inside
/// a list.
///
/// # Example
///
/// ```rust
/// use serde_json::{json, Value};
///
/// let map = json!({"customer": {"email": "a@b.c", "invoice": {"line": [1, 2]}}});
/// let Value::Object(map) = map else { unreachable!() };
/// let xml = acumulus_api::codec::value_to_xml(&map).unwrap();
/// assert!(xml.contains("<line>1</line><line>2</line>"));
/// ```
pub fn value_to_xml(values: &Map<String, Value>) -> Result<String, CodecError> {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push('<');
    out.push_str(XML_ROOT);
    out.push('>');
    write_map(&mut out, values)?;
    out.push_str("</");
    out.push_str(XML_ROOT);
    out.push('>');
    Ok(out)
}

fn write_map(out: &mut String, map: &Map<String, Value>) -> Result<(), CodecError> {
    for (key, value) in map {
        write_keyed(out, key, value)?;
    }
    Ok(())
}

fn write_keyed(out: &mut String, key: &str, value: &Value) -> Result<(), CodecError> {
    if !is_valid_element_name(key) {
        return Err(CodecError::InvalidElementName {
            name: key.to_string(),
        });
    }
    match value {
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_)) {
                    return Err(CodecError::NestedList {
                        name: key.to_string(),
                    });
                }
                write_element(out, key, item)?;
            }
            Ok(())
        }
        other => write_element(out, key, other),
    }
}

fn write_element(out: &mut String, key: &str, value: &Value) -> Result<(), CodecError> {
    out.push('<');
    out.push_str(key);
    out.push('>');
    match value {
        Value::Object(map) => write_map(out, map)?,
        Value::String(text) => out.push_str(&escape_text(text)),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::Null => {}
        // Arrays are unrolled by the caller.
        Value::Array(_) => unreachable!("arrays are expanded into sibling elements"),
    }
    out.push_str("</");
    out.push_str(key);
    out.push('>');
    Ok(())
}

fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Entity-escapes text content. The backslash escape is a documented quirk
/// of the remote endpoint, which mangles raw backslashes in transit.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\\', "&#92;")
}

// ---------------------------------------------------------------------------
// XML -> map
// ---------------------------------------------------------------------------

/// Parses an XML document into a payload map.
///
/// The single root element is stripped; repeated sibling elements collapse
/// into a `Value::Array`; leaf elements become strings (XML has no native
/// scalar types). Element attributes are ignored, as the wire format does
/// not use them.
///
/// # Errors
///
/// Returns [`CodecError::Xml`] with line, column and the parser's message
/// if the document is not well-formed.
pub fn xml_to_value(xml: &str) -> Result<Map<String, Value>, CodecError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Locate the root element, then parse its content.
    loop {
        match reader.read_event().map_err(|e| xml_error(xml, &reader, &e))? {
            Event::Start(start) => {
                let root_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let root = parse_element(xml, &mut reader)?;
                return Ok(match root {
                    Value::Object(map) => map,
                    Value::String(text) if text.is_empty() => Map::new(),
                    other => {
                        // A bare-text root still yields a map.
                        let mut map = Map::new();
                        map.insert(root_name, other);
                        map
                    }
                });
            }
            Event::Empty(_) => return Ok(Map::new()),
            Event::Eof => {
                let (line, column) = line_column(xml, reader.buffer_position());
                return Err(CodecError::Xml {
                    line,
                    column,
                    message: "document has no root element".to_string(),
                });
            }
            Event::Text(text) => {
                let content = text.unescape().unwrap_or_default();
                if !content.trim().is_empty() {
                    let (line, column) = line_column(xml, reader.buffer_position());
                    return Err(CodecError::Xml {
                        line,
                        column,
                        message: "text content outside the root element".to_string(),
                    });
                }
            }
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }
}

/// Parses the content of the element whose `Start` event was just read,
/// up to and including its `End` event.
fn parse_element(input: &str, reader: &mut Reader<&[u8]>) -> Result<Value, CodecError> {
    let mut children = Map::new();
    let mut text = String::new();
    loop {
        match reader
            .read_event()
            .map_err(|e| xml_error(input, reader, &e))?
        {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let child = parse_element(input, reader)?;
                insert_child(&mut children, name, child);
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                insert_child(&mut children, name, Value::String(String::new()));
            }
            Event::Text(content) => {
                let unescaped = content
                    .unescape()
                    .map_err(|e| xml_error(input, reader, &e))?;
                text.push_str(&unescaped);
            }
            Event::CData(content) => {
                text.push_str(&String::from_utf8_lossy(&content));
            }
            Event::End(_) => break,
            Event::Eof => {
                let (line, column) = line_column(input, reader.buffer_position());
                return Err(CodecError::Xml {
                    line,
                    column,
                    message: "unexpected end of document inside an element".to_string(),
                });
            }
            _ => {}
        }
    }
    if children.is_empty() {
        Ok(Value::String(text))
    } else {
        // Mixed content: child elements win over interleaved text.
        Ok(Value::Object(children))
    }
}

/// Inserts a child value, collapsing repeated sibling names into an array.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        None => {
            children.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn xml_error(input: &str, reader: &Reader<&[u8]>, error: &quick_xml::Error) -> CodecError {
    let (line, column) = line_column(input, reader.buffer_position());
    CodecError::Xml {
        line,
        column,
        message: error.to_string(),
    }
}

fn line_column(input: &str, byte_position: usize) -> (usize, usize) {
    let position = byte_position.min(input.len());
    let prefix = &input.as_bytes()[..position];
    let line = prefix.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = prefix
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    (line, position - line_start + 1)
}

// ---------------------------------------------------------------------------
// JSON wrappers
// ---------------------------------------------------------------------------

/// Decodes a JSON document into a payload map.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON and
/// [`CodecError::NotAnObject`] when the document is valid JSON but not an
/// object.
pub fn json_to_value(json: &str) -> Result<Map<String, Value>, CodecError> {
    let value: Value = serde_json::from_str(json).map_err(|e| CodecError::Json {
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

/// Encodes a value as JSON.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if encoding fails.
pub fn value_to_json(value: &Value) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Json {
        message: e.to_string(),
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// HTML helpers
// ---------------------------------------------------------------------------

/// Returns `true` if `body` looks like an HTML page rather than an API
/// payload: its first non-whitespace bytes are, case-insensitively,
/// `<!doctype html`, `<html` or `<body`.
///
/// A proxy or web server error page standing in front of the real endpoint
/// is detected this way before any decode attempt.
#[must_use]
pub fn is_html_response(body: &str) -> bool {
    let prefix: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_lowercase();
    ["<!doctype html", "<html", "<body"]
        .iter()
        .any(|tag| prefix.starts_with(tag))
}

static BLOCK_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|div|li|ul|ol|h[1-6]|tr|table|blockquote|title)>|<br\s*/?>")
        .expect("block break pattern is valid")
});

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Reduces an HTML page to its plain text content.
///
/// Block-level closings become line breaks, remaining markup is stripped,
/// common entities are decoded and runs of blank lines collapse to one.
#[must_use]
pub fn html_to_plain_text(body: &str) -> String {
    let broken = BLOCK_BREAK_RE.replace_all(body, "\n");
    let stripped = TAG_RE.replace_all(&broken, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let mut lines = Vec::new();
    let mut last_blank = true;
    for line in decoded.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !last_blank {
                lines.push("");
            }
            last_blank = true;
        } else {
            lines.push(line);
            last_blank = false;
        }
    }
    lines.join("\n").trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Password masking
// ---------------------------------------------------------------------------

static XML_PASSWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<([a-z0-9_]*password[a-z0-9_]*)>.*?</([a-z0-9_]*password[a-z0-9_]*)>")
        .expect("XML password pattern is valid")
});

static JSON_PASSWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"([^"]*password[^"]*)"\s*:\s*"(?:[^"\\]|\\.)*""#)
        .expect("JSON password pattern is valid")
});

/// Replaces the value of any XML element or JSON key whose name contains
/// "password" (case-insensitive) with [`PASSWORD_MASK`].
///
/// Each occurrence is replaced independently (non-greedy matching), so two
/// adjacent password fields never merge into one masked span.
#[must_use]
pub fn mask_passwords(text: &str) -> String {
    let xml_replacement = format!("<${{1}}>{PASSWORD_MASK}</${{2}}>");
    let masked = XML_PASSWORD_RE.replace_all(text, xml_replacement.as_str());
    let json_replacement = format!("\"${{1}}\": \"{PASSWORD_MASK}\"");
    JSON_PASSWORD_RE
        .replace_all(&masked, json_replacement.as_str())
        .into_owned()
}
