//! Typed property descriptors from `GET /api/schema`.
//!
//! Each property kind owns its validation and its wire serialization; the
//! forms only hold raw [`FieldInput`]s and ask the kind to turn them into a
//! [`PropValue`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "name")]
pub enum PropKind {
    #[serde(rename = "boolean")]
    Boolean { default: bool },
    #[serde(rename = "integer")]
    Integer {
        #[serde(deserialize_with = "wide_int")]
        default: i128,
        #[serde(deserialize_with = "wide_int")]
        min: i128,
        #[serde(deserialize_with = "wide_int")]
        max: i128,
    },
    /// Labels only; the wire value is the member index.
    #[serde(rename = "integer-enum")]
    IntegerEnum { default: usize, members: Vec<String> },
    /// `(value, label)` pairs; the wire value is the member value.
    #[serde(rename = "string-enum")]
    StringEnum {
        default: usize,
        members: Vec<(String, String)>,
    },
    #[serde(rename = "string")]
    Text {
        #[serde(default)]
        default: String,
    },
}

// Bounds for unsigned properties go up to u64::MAX, past i64.
fn wide_int<'de, D: Deserializer<'de>>(de: D) -> Result<i128, D::Error> {
    let n = serde_json::Number::deserialize(de)?;
    if let Some(v) = n.as_i64() {
        Ok(v as i128)
    } else if let Some(v) = n.as_u64() {
        Ok(v as i128)
    } else {
        Err(serde::de::Error::custom(format!("not an integer: {n}")))
    }
}

/// A value as sent in `values` of create/modify requests.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Str(String),
}

impl PropValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropValue::Bool(b) => serde_json::Value::Bool(*b),
            PropValue::Int(n) => serde_json::Value::from(*n),
            PropValue::Uint(n) => serde_json::Value::from(*n),
            PropValue::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Raw editor state for one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldInput {
    Toggle(bool),
    Choice(usize),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("not a whole number")]
    NotInteger,
    #[error("must be between {min} and {max}")]
    OutOfRange { min: i128, max: i128 },
    #[error("no such option")]
    NoSuchMember,
    #[error("input does not match the property type")]
    Mismatch,
}

impl PropKind {
    pub fn default_input(&self) -> FieldInput {
        match self {
            PropKind::Boolean { default } => FieldInput::Toggle(*default),
            PropKind::Integer { default, .. } => FieldInput::Text(default.to_string()),
            PropKind::IntegerEnum { default, .. } | PropKind::StringEnum { default, .. } => {
                FieldInput::Choice(*default)
            }
            PropKind::Text { default } => FieldInput::Text(default.clone()),
        }
    }

    /// Editor state for a save's current metadata value; falls back to the
    /// default when the stored value does not fit the kind.
    pub fn input_from_value(&self, value: Option<&serde_json::Value>) -> FieldInput {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return self.default_input();
        };
        match self {
            PropKind::Boolean { .. } => match value {
                serde_json::Value::Bool(b) => FieldInput::Toggle(*b),
                serde_json::Value::String(s) => FieldInput::Toggle(s.trim() == "true"),
                _ => self.default_input(),
            },
            PropKind::Integer { .. } => match value {
                serde_json::Value::Number(n) => FieldInput::Text(n.to_string()),
                serde_json::Value::String(s) => FieldInput::Text(s.trim().to_string()),
                _ => self.default_input(),
            },
            PropKind::IntegerEnum { members, .. } => {
                let idx = match value {
                    serde_json::Value::Number(n) => n.as_u64().map(|n| n as usize),
                    serde_json::Value::String(s) => s.trim().parse::<usize>().ok(),
                    _ => None,
                };
                match idx {
                    Some(i) if i < members.len() => FieldInput::Choice(i),
                    _ => self.default_input(),
                }
            }
            PropKind::StringEnum { members, .. } => value
                .as_str()
                .and_then(|s| members.iter().position(|(v, _)| v == s))
                .map(FieldInput::Choice)
                .unwrap_or_else(|| self.default_input()),
            PropKind::Text { .. } => match value {
                serde_json::Value::String(s) => FieldInput::Text(s.clone()),
                other => FieldInput::Text(other.to_string()),
            },
        }
    }

    pub fn validate(&self, input: &FieldInput) -> Result<PropValue, FieldError> {
        match (self, input) {
            (PropKind::Boolean { .. }, FieldInput::Toggle(b)) => Ok(PropValue::Bool(*b)),
            (PropKind::Integer { min, max, .. }, FieldInput::Text(raw)) => {
                let raw = raw.trim();
                let digits = raw.strip_prefix('-').unwrap_or(raw);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(FieldError::NotInteger);
                }
                let n: i128 = raw.parse().map_err(|_| FieldError::NotInteger)?;
                if n < *min || n > *max {
                    return Err(FieldError::OutOfRange {
                        min: *min,
                        max: *max,
                    });
                }
                if let Ok(v) = i64::try_from(n)
                    && v < 0
                {
                    return Ok(PropValue::Int(v));
                }
                u64::try_from(n)
                    .map(PropValue::Uint)
                    .map_err(|_| FieldError::OutOfRange {
                        min: *min,
                        max: *max,
                    })
            }
            (PropKind::IntegerEnum { members, .. }, FieldInput::Choice(i)) => {
                if *i < members.len() {
                    Ok(PropValue::Uint(*i as u64))
                } else {
                    Err(FieldError::NoSuchMember)
                }
            }
            (PropKind::StringEnum { members, .. }, FieldInput::Choice(i)) => members
                .get(*i)
                .map(|(v, _)| PropValue::Str(v.clone()))
                .ok_or(FieldError::NoSuchMember),
            (PropKind::Text { .. }, FieldInput::Text(raw)) => {
                Ok(PropValue::Str(raw.trim().to_string()))
            }
            _ => Err(FieldError::Mismatch),
        }
    }

    /// Steps a toggle or choice; text inputs are left alone.
    pub fn cycle(&self, input: &mut FieldInput, forward: bool) {
        match (self, input) {
            (PropKind::Boolean { .. }, FieldInput::Toggle(b)) => *b = !*b,
            (PropKind::IntegerEnum { members, .. }, FieldInput::Choice(i)) => {
                *i = step(*i, members.len(), forward)
            }
            (PropKind::StringEnum { members, .. }, FieldInput::Choice(i)) => {
                *i = step(*i, members.len(), forward)
            }
            _ => {}
        }
    }

    pub fn display(&self, input: &FieldInput) -> String {
        match (self, input) {
            (PropKind::Boolean { .. }, FieldInput::Toggle(b)) => {
                let label = if *b { "yes" } else { "no" };
                label.to_string()
            }
            (PropKind::IntegerEnum { members, .. }, FieldInput::Choice(i)) => {
                members.get(*i).cloned().unwrap_or_default()
            }
            (PropKind::StringEnum { members, .. }, FieldInput::Choice(i)) => members
                .get(*i)
                .map(|(_, label)| label.clone())
                .unwrap_or_default(),
            (_, FieldInput::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, PropKind::Integer { .. } | PropKind::Text { .. })
    }
}

fn step(i: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (i + 1) % len
    } else {
        (i + len - 1) % len
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PropDescriptor {
    #[serde(skip)]
    pub key: String,
    pub access: Access,
    #[serde(rename = "type")]
    pub kind: PropKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub props: Vec<PropDescriptor>,
    pub create_properties: Vec<String>,
}

#[derive(Deserialize)]
struct SchemaWire {
    schema: BTreeMap<String, PropDescriptor>,
    #[serde(default)]
    create_properties: Vec<String>,
}

impl Schema {
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let wire: SchemaWire = serde_json::from_value(value)?;
        let props = wire
            .schema
            .into_iter()
            .map(|(key, mut prop)| {
                prop.key = key;
                prop
            })
            .collect();
        Ok(Self {
            props,
            create_properties: wire.create_properties,
        })
    }

    pub fn get(&self, key: &str) -> Option<&PropDescriptor> {
        self.props.iter().find(|p| p.key == key)
    }

    /// Properties offered when creating a save, in server order.
    pub fn create_fields(&self) -> Vec<PropDescriptor> {
        self.create_properties
            .iter()
            .filter_map(|k| self.get(k))
            .filter(|p| p.access == Access::Write)
            .cloned()
            .collect()
    }

    pub fn write_fields(&self) -> Vec<PropDescriptor> {
        self.props
            .iter()
            .filter(|p| p.access == Access::Write)
            .cloned()
            .collect()
    }
}
