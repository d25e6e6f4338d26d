//! Deterministic text rendering of [`Value`]s.
//!
//! Values render as JSON text in compact or pretty form:
//!
//! - Object keys in sorted order, so equal values render identically
//! - Floats always carry a fractional part; NaN and infinities render as `null`
//! - Timestamps as RFC 3339 strings, blobs as standard base64 strings
//!
//! # Examples
//!
//! ```
//! use clove_udf::Value;
//! use clove_udf::output::{to_json, to_json_pretty};
//!
//! let value = Value::Array(vec![Value::Integer(1), Value::from("two")]);
//!
//! assert_eq!(to_json(&value), r#"[1,"two"]"#);
//! assert_eq!(to_json_pretty(&value), "[\n  1,\n  \"two\"\n]");
//! ```

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::SecondsFormat;

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(n) => self.write_float(out, *n),
            Value::String(s) => self.write_string(out, s),
            Value::Timestamp(t) => {
                self.write_string(out, &t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Array(items) => self.write_array(out, items, indent),
            Value::Object(map) => self.write_object(out, map, indent),
            Value::Blob(bytes) => self.write_string(out, &STANDARD.encode(bytes)),
        }
    }

    fn write_array(&self, out: &mut String, items: &[Value], indent: usize) {
        if items.is_empty() {
            out.push_str("[]");
            return;
        }

        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_break(out, indent + 1);
            self.write_value(out, item, indent + 1);
        }
        self.write_break(out, indent);
        out.push(']');
    }

    fn write_object(&self, out: &mut String, map: &HashMap<String, Value>, indent: usize) {
        if map.is_empty() {
            out.push_str("{}");
            return;
        }

        // Sort keys for deterministic output
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        out.push('{');
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_break(out, indent + 1);
            self.write_string(out, key);
            out.push_str(if self.pretty { ": " } else { ":" });
            self.write_value(out, value, indent + 1);
        }
        self.write_break(out, indent);
        out.push('}');
    }

    fn write_float(&self, out: &mut String, n: f64) {
        // NaN and infinities have no JSON form
        if !n.is_finite() {
            out.push_str("null");
            return;
        }
        let text = n.to_string();
        out.push_str(&text);
        if !text.contains('.') {
            out.push_str(".0");
        }
    }

    fn write_break(&self, out: &mut String, level: usize) {
        if self.pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(level));
        }
    }

    fn write_string(&self, out: &mut String, s: &str) {
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
    }
}

/// Renders a Value as compact text with no extra whitespace.
///
/// ```
/// use clove_udf::Value;
/// use clove_udf::output::to_json;
/// use std::collections::HashMap;
///
/// let mut obj = HashMap::new();
/// obj.insert("name".to_string(), Value::from("Alice"));
/// obj.insert("age".to_string(), Value::Integer(30));
///
/// assert_eq!(to_json(&Value::Object(obj)), r#"{"age":30,"name":"Alice"}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Renders a Value with 2-space indentation, one element per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
