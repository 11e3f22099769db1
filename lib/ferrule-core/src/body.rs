//! Body codecs.

use bytes::Bytes;

use crate::Result;

/// Content type of an encoded request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `application/octet-stream`
    OctetStream,
}

impl ContentType {
    /// MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// ```
/// use ferrule_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({"name": "Alice"})).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// # Errors
///
/// Returns an error if form serialization fails.
///
/// ```
/// use std::collections::BTreeMap;
/// use ferrule_core::to_form;
///
/// let fields = BTreeMap::from([("password", "s3cret"), ("username", "alice")]);
/// let bytes = to_form(&fields).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"password=s3cret&username=alice");
/// ```
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`](crate::Error::JsonDeserialization)
/// carrying the path of the offending field.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize an already parsed JSON value with path-aware error messages.
///
/// # Errors
///
/// Same as [`from_json`].
pub fn from_json_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn content_type_as_str() {
        assert_eq!(ContentType::Json.to_string(), "application/json");
        assert_eq!(
            ContentType::FormUrlEncoded.as_str(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn form_escapes_values() {
        let fields = BTreeMap::from([("q".to_string(), "a b&c".to_string())]);
        let bytes = to_form(&fields).expect("serialize");
        assert_eq!(bytes.as_ref(), b"q=a+b%26c");
    }

    #[test]
    fn from_json_missing_field_reports_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Address {
            #[allow(dead_code)]
            city: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            address: Address,
        }

        let err = from_json::<User>(br#"{"address":{}}"#).expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("address"), "missing path in: {msg}");
        assert!(msg.contains("city"), "missing field in: {msg}");
    }

    #[test]
    fn from_json_value_typed() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            name: String,
        }

        let user: User = from_json_value(serde_json::json!({"name": "Ada"})).expect("decode");
        assert_eq!(
            user,
            User {
                name: "Ada".to_string()
            }
        );

        let err = from_json_value::<User>(serde_json::json!({"name": 3})).expect_err("type");
        assert!(err.to_string().contains("name"));
    }
}
