use std::fmt;

use data_encoding::HEXLOWER;

use super::{Property, ShareableValue};

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        item(f, v)?;
    }
    f.write_str("]")
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let var = if self.immutable { "" } else { "var " };
        write!(f, "{}:{}{};", self.name, var, self.value)
    }
}

impl fmt::Display for ShareableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Nat(v) => write!(f, "{v}"),
            Self::Nat8(v) => write!(f, "{v}"),
            Self::Nat16(v) => write!(f, "{v}"),
            Self::Nat32(v) => write!(f, "{v}"),
            Self::Nat64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Bytes { data, .. } => f.write_str(&HEXLOWER.encode(data)),
            Self::Principal(v) => write!(f, "{v}"),
            Self::Option(None) => f.write_str("null"),
            Self::Option(Some(v)) => write!(f, "{v}"),
            Self::Array { items, .. } | Self::Set(items) => {
                write_list(f, items, |f, v| write!(f, "{{{v}}}"))
            }
            Self::Map(entries) => write_list(f, entries, |f, (k, v)| write!(f, "{{{k}:{v}}}")),
            Self::ValueMap(entries) => {
                write_list(f, entries, |f, (k, v)| write!(f, "{{{k}:{v}}}"))
            }
            Self::Class(props) => {
                f.write_str("{")?;
                for (i, p) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str("}")
            }
            Self::Nats(vs) => write_list(f, vs, |f, v| write!(f, "{v}")),
            Self::Ints(vs) => write_list(f, vs, |f, v| write!(f, "{v}")),
            Self::Floats(vs) => write_list(f, vs, |f, v| write!(f, "{v}")),
        }
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn json_float(v: f64) -> String {
    // JSON has no representation for NaN or infinities
    if v.is_finite() {
        v.to_string()
    } else {
        "null".to_string()
    }
}

fn json_list<T>(items: &[T], item: impl Fn(&T) -> String) -> String {
    let parts: Vec<String> = items.iter().map(item).collect();
    format!("[{}]", parts.join(","))
}

impl ShareableValue {
    /// Renders the value as JSON text.
    ///
    /// Numbers stay numbers (arbitrary precision included), buffers are
    /// quoted lower-case hex, principals are quoted in their text form and
    /// records become objects. Value-keyed maps have no JSON object form
    /// and render as a list of `[key, value]` pairs.
    pub fn to_json(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Int8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Nat(v) => v.to_string(),
            Self::Nat8(v) => v.to_string(),
            Self::Nat16(v) => v.to_string(),
            Self::Nat32(v) => v.to_string(),
            Self::Nat64(v) => v.to_string(),
            Self::Float(v) => json_float(*v),
            Self::Bool(v) => v.to_string(),
            Self::Text(v) => json_string(v),
            Self::Bytes { data, .. } => format!("\"{}\"", HEXLOWER.encode(data)),
            Self::Principal(v) => format!("\"{v}\""),
            Self::Option(None) => "null".to_string(),
            Self::Option(Some(v)) => v.to_json(),
            Self::Array { items, .. } | Self::Set(items) => json_list(items, |v| v.to_json()),
            Self::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}:{}", json_string(k), v.to_json()))
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
            Self::ValueMap(entries) => json_list(entries, |(k, v)| {
                format!("[{},{}]", k.to_json(), v.to_json())
            }),
            Self::Class(props) => {
                let parts: Vec<String> = props
                    .iter()
                    .map(|p| format!("{}:{}", json_string(&p.name), p.value.to_json()))
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
            Self::Nats(vs) => json_list(vs, |v| v.to_string()),
            Self::Ints(vs) => json_list(vs, |v| v.to_string()),
            Self::Floats(vs) => json_list(vs, |v| json_float(*v)),
        }
    }
}
