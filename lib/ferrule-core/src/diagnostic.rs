//! Declaration-time diagnostics.

use derive_more::Display;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Severity {
    /// Advisory; generation proceeds.
    #[display("warning")]
    Warning,
    /// Generation for the affected scope is aborted.
    #[display("error")]
    Fatal,
}

/// What was found wrong with a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DiagnosticKind {
    /// The method declares no return type.
    #[display("method return type missing")]
    MissingReturnType,
    /// The method is not `async`.
    #[display("endpoint methods must be `async`")]
    NotAsync,
    /// The annotated item is not a pure contract.
    #[display("`{name}` must be a trait with body-less methods only")]
    NotAnInterface {
        /// Item name.
        name: String,
    },
    /// A field/field map parameter on a non form-encoded method.
    #[display("`#[field]`/`#[field_map]` should be used with `#[form_url_encoded]`")]
    FieldWithoutFormEncoding,
    /// A part/part map parameter on a non multipart method.
    #[display("`#[part]`/`#[part_map]` should be used with `#[multipart]`")]
    PartWithoutMultipart,
    /// A body parameter on a form-encoded or multipart method.
    #[display("`#[body]` should not be used with `#[multipart]` or `#[form_url_encoded]`")]
    BodyWithEncoding,
    /// A body parameter on a verb that does not permit one.
    #[display("`#[body]` is not supported by this HTTP method")]
    BodyNotPermitted,
    /// A static header with no usable colon.
    #[display("malformed header `{raw}`, expected `Key: Value`")]
    MalformedHeader {
        /// Header entry as written.
        raw: String,
    },
    /// A static header whose key is blank.
    #[display("header `{raw}` has a blank key")]
    BlankHeaderKey {
        /// Header entry as written.
        raw: String,
    },
    /// Both form-urlencoded and multipart markers are present.
    #[display(
        "`#[form_url_encoded]` and `#[multipart]` are mutually exclusive, parts take precedence"
    )]
    ConflictingEncodings,
}

impl DiagnosticKind {
    /// Severity attached to this kind.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingReturnType | Self::NotAsync | Self::NotAnInterface { .. } => {
                Severity::Fatal
            }
            _ => Severity::Warning,
        }
    }
}

/// A diagnostic attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{severity} in `{target}`: {kind}")]
pub struct Diagnostic {
    /// Severity, derived from the kind.
    pub severity: Severity,
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Method (or interface) the diagnostic refers to.
    pub target: String,
}

impl Diagnostic {
    /// Create a diagnostic for `target`.
    #[must_use]
    pub fn new(kind: DiagnosticKind, target: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            target: target.into(),
        }
    }

    /// Returns `true` if this diagnostic aborts generation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn severity_by_kind() {
        assert!(DiagnosticKind::NotAsync.severity() == Severity::Fatal);
        assert!(DiagnosticKind::MissingReturnType.severity() == Severity::Fatal);
        assert!(DiagnosticKind::BodyNotPermitted.severity() == Severity::Warning);
        assert!(DiagnosticKind::ConflictingEncodings.severity() == Severity::Warning);
    }

    #[test]
    fn diagnostic_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::MalformedHeader {
                raw: "NoColonHere".into(),
            },
            "list_users",
        );
        assert!(!diagnostic.is_fatal());
        assert_snapshot!(diagnostic, @"warning in `list_users`: malformed header `NoColonHere`, expected `Key: Value`");

        let diagnostic = Diagnostic::new(DiagnosticKind::NotAsync, "get_user");
        assert!(diagnostic.is_fatal());
        assert_snapshot!(diagnostic, @"error in `get_user`: endpoint methods must be `async`");
    }
}
