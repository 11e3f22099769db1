//! HTTP information resolved from method markers.

use std::borrow::Cow;

use crate::{Diagnostic, DiagnosticKind, MethodMarker, Verb};

/// Request body encoding of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// No dedicated encoding; a body parameter is sent as JSON.
    #[default]
    None,
    /// `application/x-www-form-urlencoded` fields.
    FormUrlEncoded,
    /// `multipart/form-data` parts.
    Multipart,
    /// Both markers present: fields and parts are both collected and the
    /// transport picks one.
    FormAndMultipart,
}

impl Encoding {
    /// Whether form fields are collected.
    #[must_use]
    pub const fn accepts_fields(self) -> bool {
        matches!(self, Self::FormUrlEncoded | Self::FormAndMultipart)
    }

    /// Whether multipart parts are collected.
    #[must_use]
    pub const fn accepts_parts(self) -> bool {
        matches!(self, Self::Multipart | Self::FormAndMultipart)
    }
}

/// Resolved HTTP information for one endpoint method.
///
/// Generated code builds this as a literal, hence the `Cow` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDeclaration {
    /// HTTP verb.
    pub verb: Verb,
    /// Path template, possibly holding `{name}` placeholders.
    pub path_template: Cow<'static, str>,
    /// Whether a body parameter is honored.
    pub body_permitted: bool,
    /// Body encoding.
    pub encoding: Encoding,
    /// Whether the reply is handed back as raw bytes.
    pub streaming: bool,
    /// Headers from `#[headers]`, in declaration order.
    pub static_headers: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl Default for EndpointDeclaration {
    fn default() -> Self {
        Self {
            verb: Verb::Get,
            path_template: Cow::Borrowed(""),
            body_permitted: false,
            encoding: Encoding::None,
            streaming: false,
            static_headers: Vec::new(),
        }
    }
}

/// Resolve the endpoint described by `markers`.
///
/// Problems are pushed to `diagnostics` under `target`; resolution itself
/// never fails.
pub fn resolve_endpoint(
    markers: &[MethodMarker],
    target: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> EndpointDeclaration {
    let (verb, path, body_permitted) = resolve_verb(markers);

    let form = markers.contains(&MethodMarker::FormUrlEncoded);
    let multipart = markers.contains(&MethodMarker::Multipart);
    let encoding = match (form, multipart) {
        (true, true) => {
            diagnostics.push(Diagnostic::new(DiagnosticKind::ConflictingEncodings, target));
            Encoding::FormAndMultipart
        }
        (true, false) => Encoding::FormUrlEncoded,
        (false, true) => Encoding::Multipart,
        (false, false) => Encoding::None,
    };

    let static_headers = markers
        .iter()
        .filter_map(|marker| match marker {
            MethodMarker::Headers(entries) => Some(entries),
            _ => None,
        })
        .flatten()
        .filter_map(|raw| match parse_static_header(raw) {
            Ok((key, value)) => Some((Cow::Owned(key), Cow::Owned(value))),
            Err(kind) => {
                diagnostics.push(Diagnostic::new(kind, target));
                None
            }
        })
        .collect();

    EndpointDeclaration {
        verb,
        path_template: Cow::Owned(path),
        body_permitted,
        encoding,
        streaming: markers.contains(&MethodMarker::Streaming),
        static_headers,
    }
}

/// The generic marker wins; then GET > POST > PUT > DELETE > PATCH > HEAD > OPTIONS.
fn resolve_verb(markers: &[MethodMarker]) -> (Verb, String, bool) {
    if let Some((method, path, has_body)) = markers.iter().find_map(|marker| match marker {
        MethodMarker::Http {
            method,
            path,
            has_body,
        } => Some((method, path, *has_body)),
        _ => None,
    }) {
        return (Verb::parse(method), path.clone(), has_body);
    }

    let by_priority: [(Verb, fn(&MethodMarker) -> Option<&String>); 7] = [
        (Verb::Get, |m| match m {
            MethodMarker::Get(p) => Some(p),
            _ => None,
        }),
        (Verb::Post, |m| match m {
            MethodMarker::Post(p) => Some(p),
            _ => None,
        }),
        (Verb::Put, |m| match m {
            MethodMarker::Put(p) => Some(p),
            _ => None,
        }),
        (Verb::Delete, |m| match m {
            MethodMarker::Delete(p) => Some(p),
            _ => None,
        }),
        (Verb::Patch, |m| match m {
            MethodMarker::Patch(p) => Some(p),
            _ => None,
        }),
        (Verb::Head, |m| match m {
            MethodMarker::Head(p) => Some(p),
            _ => None,
        }),
        (Verb::Options, |m| match m {
            MethodMarker::Options(p) => Some(p),
            _ => None,
        }),
    ];

    for (verb, select) in by_priority {
        if let Some(path) = markers.iter().find_map(select) {
            let permitted = verb.permits_body();
            return (verb, path.clone(), permitted);
        }
    }

    (Verb::Get, String::new(), false)
}

/// Split a `Key: Value` header entry at its first colon.
///
/// # Errors
///
/// Returns [`DiagnosticKind::MalformedHeader`] when there is no colon, or
/// the colon is the first or last character, and
/// [`DiagnosticKind::BlankHeaderKey`] when the key is only whitespace.
pub fn parse_static_header(raw: &str) -> Result<(String, String), DiagnosticKind> {
    let malformed = || DiagnosticKind::MalformedHeader {
        raw: raw.to_string(),
    };
    let idx = raw.find(':').ok_or_else(malformed)?;
    if idx == 0 || idx + 1 == raw.len() {
        return Err(malformed());
    }

    let (key, value) = (raw[..idx].trim(), raw[idx + 1..].trim());
    if key.is_empty() {
        return Err(DiagnosticKind::BlankHeaderKey {
            raw: raw.to_string(),
        });
    }
    Ok((key.to_string(), value.to_string()))
}
