//! HTTP verbs.

use std::borrow::Cow;

use derive_more::Display;

/// HTTP verb of an endpoint.
///
/// `Custom` carries verbs declared through the generic `#[http]` marker that
/// are not part of the fixed set (e.g. `PROPFIND`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Verb {
    /// GET, the default when no verb marker is present.
    #[display("GET")]
    Get,
    /// POST.
    #[display("POST")]
    Post,
    /// PUT.
    #[display("PUT")]
    Put,
    /// DELETE.
    #[display("DELETE")]
    Delete,
    /// PATCH.
    #[display("PATCH")]
    Patch,
    /// HEAD.
    #[display("HEAD")]
    Head,
    /// OPTIONS.
    #[display("OPTIONS")]
    Options,
    /// Any other verb, stored upper-cased.
    #[display("{_0}")]
    Custom(Cow<'static, str>),
}

impl Verb {
    /// Parse a verb name, case-insensitively.
    ///
    /// A blank name yields [`Verb::Get`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return Self::Get;
        }
        match name.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            other => Self::Custom(Cow::Owned(other.to_string())),
        }
    }

    /// Wire name of the verb.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Custom(name) => &**name,
        }
    }

    /// Whether a request body is permitted when no explicit override exists.
    #[must_use]
    pub const fn permits_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }

    /// Returns `true` if the verb is safe (does not modify resources).
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }

    /// Returns `true` if the verb is idempotent.
    #[must_use]
    pub const fn is_idempotent(&self) -> bool {
        matches!(
            self,
            Self::Get | Self::Head | Self::Options | Self::Put | Self::Delete
        )
    }
}

impl TryFrom<&Verb> for http::Method {
    type Error = crate::Error;

    fn try_from(verb: &Verb) -> Result<Self, Self::Error> {
        Ok(match verb {
            Verb::Get => Self::GET,
            Verb::Post => Self::POST,
            Verb::Put => Self::PUT,
            Verb::Delete => Self::DELETE,
            Verb::Patch => Self::PATCH,
            Verb::Head => Self::HEAD,
            Verb::Options => Self::OPTIONS,
            Verb::Custom(name) => Self::from_bytes(name.as_bytes())
                .map_err(|_| crate::Error::invalid_request(format!("invalid HTTP verb: {name}")))?,
        })
    }
}

impl From<http::Method> for Verb {
    fn from(method: http::Method) -> Self {
        Self::parse(method.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_parse() {
        assert_eq!(Verb::parse("get"), Verb::Get);
        assert_eq!(Verb::parse(" Post "), Verb::Post);
        assert_eq!(Verb::parse(""), Verb::Get);
        assert_eq!(Verb::parse("propfind"), Verb::Custom("PROPFIND".into()));
    }

    #[test]
    fn verb_display() {
        assert_eq!(Verb::Delete.to_string(), "DELETE");
        assert_eq!(Verb::Custom("REPORT".into()).to_string(), "REPORT");
        assert_eq!(Verb::Options.as_str(), "OPTIONS");
    }

    #[test]
    fn verb_permits_body() {
        assert!(Verb::Post.permits_body());
        assert!(Verb::Put.permits_body());
        assert!(Verb::Patch.permits_body());
        assert!(Verb::Delete.permits_body());
        assert!(!Verb::Get.permits_body());
        assert!(!Verb::Head.permits_body());
        assert!(!Verb::Options.permits_body());
        assert!(!Verb::Custom("PROPFIND".into()).permits_body());
    }

    #[test]
    fn verb_is_safe() {
        assert!(Verb::Get.is_safe());
        assert!(Verb::Head.is_safe());
        assert!(!Verb::Post.is_safe());
        assert!(Verb::Put.is_idempotent());
        assert!(!Verb::Patch.is_idempotent());
    }

    #[test]
    fn verb_into_http() {
        assert_eq!(
            http::Method::try_from(&Verb::Get).expect("GET"),
            http::Method::GET
        );
        let custom = http::Method::try_from(&Verb::Custom("PROPFIND".into())).expect("custom");
        assert_eq!(custom.as_str(), "PROPFIND");
        assert!(http::Method::try_from(&Verb::Custom("BAD VERB".into())).is_err());
    }

    #[test]
    fn verb_from_http() {
        assert_eq!(Verb::from(http::Method::PATCH), Verb::Patch);
    }
}
