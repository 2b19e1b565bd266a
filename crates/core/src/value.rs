//! Cell value codec.
//!
//! A cell on the wire is a `CellData` object keyed by channel
//! (`userEnteredValue`, `effectiveValue`, `formattedValue`). The first two hold
//! an `ExtendedValue` with exactly one kind tag; the formatted channel holds a
//! bare display string.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::address::RectRange;

/// Error raised while decoding a wire cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Kind tag is not one of the four known kinds
    UnknownKind(String),
    /// Payload has the wrong JSON type, or more than one tag is present
    Malformed(String),
    /// Expected a JSON object
    NotAnObject(String),
    /// Decode failure located at a cell
    InCell { cell: String, error: Box<ValueError> },
}

impl ValueError {
    /// Attach the cell where decoding failed.
    pub fn at(self, cell: &RectRange) -> Self {
        ValueError::InCell { cell: cell.to_string(), error: Box::new(self) }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::UnknownKind(tag) => write!(f, "Unknown value kind: {}", tag),
            ValueError::Malformed(msg) => write!(f, "Malformed cell value: {}", msg),
            ValueError::NotAnObject(found) => write!(f, "Expected a cell object, found {}", found),
            ValueError::InCell { cell, error } => write!(f, "{} (at {})", error, cell),
        }
    }
}

impl std::error::Error for ValueError {}

// ============================================================================
// Native values
// ============================================================================

/// Numeric cell content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// `None` for NaN and infinities, which have no JSON form.
    fn to_json(self) -> Option<Json> {
        match self {
            Number::Int(i) => Some(Json::from(i)),
            Number::Float(f) => serde_json::Number::from_f64(f).map(Json::Number),
        }
    }

    fn from_json(n: &serde_json::Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Number::Int(i));
        }
        n.as_f64().map(Number::Float)
    }

    /// Numeric text as the service's user-entered channel may send it.
    fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Number::Int(i));
            }
        }
        trimmed.parse::<f64>().ok().map(Number::Float)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// A native cell value. Empty cells are represented as `None` by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    /// Formula source, including the leading `=`
    Formula(String),
    Number(Number),
    Bool(bool),
}

impl Value {
    /// Classify a JSON scalar into a value. `null` is an empty cell.
    pub fn classify(raw: &Json) -> Option<Value> {
        match raw {
            Json::Null => None,
            Json::String(s) => Some(Value::from(s.as_str())),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => Number::from_json(n).map(Value::Number),
            other => Some(Value::Text(other.to_string())),
        }
    }

    /// The kind tag this value encodes with.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Text(_) => Kind::String,
            Value::Formula(_) => Kind::Formula,
            Value::Number(_) => Kind::Number,
            Value::Bool(_) => Kind::Boolean,
        }
    }

    /// Text as the formatted channel shows it.
    pub fn display(&self) -> String {
        self.to_string()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Formula(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
        }
    }
}

fn is_formula(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('=')
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        if is_formula(s) {
            Value::Formula(s.to_string())
        } else {
            Value::Text(s.to_string())
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        if is_formula(&s) {
            Value::Formula(s)
        } else {
            Value::Text(s)
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::Int(i as i64))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Number(Number::Int(i as i64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

// ============================================================================
// Kinds and channels
// ============================================================================

/// Declared scalar kind of a typed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Number,
    Boolean,
    Formula,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::String, Kind::Number, Kind::Boolean, Kind::Formula];

    pub fn wire_key(self) -> &'static str {
        match self {
            Kind::String => "stringValue",
            Kind::Number => "numberValue",
            Kind::Boolean => "boolValue",
            Kind::Formula => "formulaValue",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.wire_key() == key)
    }
}

/// Which of a cell's value channels is read or written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    UserEntered,
    #[default]
    Effective,
    Formatted,
}

impl Channel {
    pub fn value_key(self) -> &'static str {
        match self {
            Channel::UserEntered => "userEnteredValue",
            Channel::Effective => "effectiveValue",
            Channel::Formatted => "formattedValue",
        }
    }

    /// Whether values on this channel carry a kind tag.
    pub fn carries_kind(self) -> bool {
        !matches!(self, Channel::Formatted)
    }
}

// ============================================================================
// Typed cells
// ============================================================================

/// One channel of one cell in wire terms.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedCell {
    channel: Channel,
    kind: Option<Kind>,
    payload: Json,
}

impl TypedCell {
    /// Tag a native value for `channel`. A non-finite float is sent as its
    /// text (`NaN`, `inf`, `-inf`) under `stringValue`.
    pub fn encode(value: &Value, channel: Channel) -> Self {
        if !channel.carries_kind() {
            return Self { channel, kind: None, payload: Json::String(value.display()) };
        }
        let (kind, payload) = match value {
            Value::Text(s) | Value::Formula(s) => (value.kind(), Json::String(s.clone())),
            Value::Number(n) => match n.to_json() {
                Some(json) => (Kind::Number, json),
                None => (Kind::String, Json::String(n.to_string())),
            },
            Value::Bool(b) => (Kind::Boolean, Json::Bool(*b)),
        };
        Self { channel, kind: Some(kind), payload }
    }

    /// Read `channel` out of a `CellData` object. `Ok(None)` when the cell has
    /// nothing on that channel.
    pub fn parse(cell: &Json, channel: Channel) -> Result<Option<Self>, ValueError> {
        let obj = cell.as_object().ok_or_else(|| ValueError::NotAnObject(type_name(cell)))?;
        let Some(raw) = obj.get(channel.value_key()) else {
            return Ok(None);
        };

        if !channel.carries_kind() {
            return match raw {
                Json::Null => Ok(None),
                Json::String(_) => Ok(Some(Self { channel, kind: None, payload: raw.clone() })),
                other => Err(ValueError::Malformed(format!(
                    "{} must be a string, found {}",
                    channel.value_key(),
                    type_name(other)
                ))),
            };
        }

        let ext = raw.as_object().ok_or_else(|| ValueError::NotAnObject(type_name(raw)))?;
        let mut entries = ext.iter();
        let Some((tag, payload)) = entries.next() else {
            return Ok(None);
        };
        if entries.next().is_some() {
            return Err(ValueError::Malformed(format!(
                "{} has more than one kind tag",
                channel.value_key()
            )));
        }
        let kind = Kind::from_wire_key(tag).ok_or_else(|| ValueError::UnknownKind(tag.clone()))?;
        Ok(Some(Self { channel, kind: Some(kind), payload: payload.clone() }))
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    pub fn payload(&self) -> &Json {
        &self.payload
    }

    /// The `CellData` object holding this cell.
    pub fn to_wire(&self) -> Json {
        let inner = match self.kind {
            Some(kind) => {
                let mut ext = Map::new();
                ext.insert(kind.wire_key().to_string(), self.payload.clone());
                Json::Object(ext)
            }
            None => self.payload.clone(),
        };
        let mut obj = Map::new();
        obj.insert(self.channel.value_key().to_string(), inner);
        Json::Object(obj)
    }

    /// Convert to a native value.
    pub fn decode(&self) -> Result<Value, ValueError> {
        let Some(kind) = self.kind else {
            return match &self.payload {
                Json::String(s) => Ok(Value::Text(s.clone())),
                other => Err(ValueError::Malformed(format!("display text expected, found {}", type_name(other)))),
            };
        };

        let lenient = self.channel == Channel::UserEntered;
        let wrong = || {
            ValueError::Malformed(format!("{} holds {}", kind.wire_key(), type_name(&self.payload)))
        };

        match (kind, &self.payload) {
            (Kind::String, Json::String(s)) => Ok(Value::Text(s.clone())),
            (Kind::Formula, Json::String(s)) => Ok(Value::Formula(s.clone())),
            (Kind::Number, Json::Number(n)) => Number::from_json(n).map(Value::Number).ok_or_else(wrong),
            (Kind::Number, Json::String(s)) if lenient => Number::parse(s)
                .map(Value::Number)
                .ok_or_else(|| ValueError::Malformed(format!("{:?} is not a number", s))),
            (Kind::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (Kind::Boolean, Json::String(s)) if lenient => Ok(Value::Bool(!s.eq_ignore_ascii_case("false"))),
            _ => Err(wrong()),
        }
    }
}

/// Encode a value as a `CellData` object. An empty cell is `{}`.
pub fn encode(value: Option<&Value>, channel: Channel) -> Json {
    match value {
        Some(v) => TypedCell::encode(v, channel).to_wire(),
        None => Json::Object(Map::new()),
    }
}

/// Decode the `channel` of a `CellData` object.
pub fn decode(cell: &Json, channel: Channel) -> Result<Option<Value>, ValueError> {
    match TypedCell::parse(cell, channel)? {
        Some(typed) => typed.decode().map(Some),
        None => Ok(None),
    }
}

fn type_name(v: &Json) -> String {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
    .to_string()
}
