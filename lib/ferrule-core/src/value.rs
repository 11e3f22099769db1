//! Argument values: multipart payloads and dynamically typed arguments.

use std::fmt;

use bytes::Bytes;

use crate::Part;

/// Raw value of a multipart part, kept as provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    /// Absent value; the part is not sent.
    Null,
    /// Text payload.
    Text(String),
    /// Binary payload.
    Bytes(Bytes),
    /// Payload with file metadata.
    File(Part),
}

impl PartValue {
    /// Returns `true` for [`PartValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Encodable part, `None` for null values.
    #[must_use]
    pub fn to_part(&self) -> Option<Part> {
        match self {
            Self::Null => None,
            Self::Text(text) => Some(Part::text(text.clone())),
            Self::Bytes(data) => Some(Part::bytes(data.clone())),
            Self::File(part) => Some(part.clone()),
        }
    }
}

/// Conversion of a parameter value into a multipart payload.
///
/// Text-like values stay text, byte buffers stay binary; anything else
/// implementing `Display` can be wrapped with [`PartValue::Text`] manually.
pub trait ToPartValue {
    /// Convert to a part payload.
    fn to_part_value(&self) -> PartValue;
}

impl ToPartValue for PartValue {
    fn to_part_value(&self) -> PartValue {
        self.clone()
    }
}

impl ToPartValue for Part {
    fn to_part_value(&self) -> PartValue {
        PartValue::File(self.clone())
    }
}

impl ToPartValue for str {
    fn to_part_value(&self) -> PartValue {
        PartValue::Text(self.to_string())
    }
}

impl ToPartValue for String {
    fn to_part_value(&self) -> PartValue {
        PartValue::Text(self.clone())
    }
}

impl ToPartValue for Bytes {
    fn to_part_value(&self) -> PartValue {
        PartValue::Bytes(self.clone())
    }
}

impl ToPartValue for Vec<u8> {
    fn to_part_value(&self) -> PartValue {
        PartValue::Bytes(Bytes::copy_from_slice(self))
    }
}

impl ToPartValue for [u8] {
    fn to_part_value(&self) -> PartValue {
        PartValue::Bytes(Bytes::copy_from_slice(self))
    }
}

impl<T: ToPartValue> ToPartValue for Option<T> {
    fn to_part_value(&self) -> PartValue {
        self.as_ref().map_or(PartValue::Null, ToPartValue::to_part_value)
    }
}

impl<T: ToPartValue + ?Sized> ToPartValue for &T {
    fn to_part_value(&self) -> PartValue {
        (**self).to_part_value()
    }
}

macro_rules! display_part_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToPartValue for $ty {
                fn to_part_value(&self) -> PartValue {
                    PartValue::Text(self.to_string())
                }
            }
        )*
    };
}

display_part_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

/// A dynamically typed argument, used when a call is assembled from a
/// [`MethodSchema`](crate::MethodSchema) instead of generated code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// Text.
    Text(String),
    /// Binary data.
    Bytes(Bytes),
    /// Any JSON value; strings display without quotes.
    Json(serde_json::Value),
    /// Ordered key/value entries, for map roles.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Returns `true` for [`Value::Null`] and JSON `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(serde_json::Value::Null))
    }

    /// Map entries, also accepting a JSON object.
    #[must_use]
    pub fn entries(&self) -> Option<Vec<(String, Value)>> {
        match self {
            Self::Map(entries) => Some(entries.clone()),
            Self::Json(serde_json::Value::Object(object)) => Some(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::Json(value.clone())))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// JSON form of the value, used for bodies.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Bytes(data) => serde_json::Value::Array(
                data.iter().map(|b| serde_json::Value::from(*b)).collect(),
            ),
            Self::Json(value) => value.clone(),
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(text) => f.write_str(text),
            Self::Bytes(data) => f.write_str(&String::from_utf8_lossy(data)),
            Self::Json(serde_json::Value::String(text)) => f.write_str(text),
            Self::Json(value) => write!(f, "{value}"),
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl ToPartValue for Value {
    fn to_part_value(&self) -> PartValue {
        match self {
            Self::Null | Self::Json(serde_json::Value::Null) => PartValue::Null,
            Self::Bytes(data) => PartValue::Bytes(data.clone()),
            other => PartValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! json_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_value_from!(bool, i32, i64, u32, u64, f64);
