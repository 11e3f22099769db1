//! Declaration analysis: markers in, validated method schemas out.

use crate::{
    Diagnostic, DiagnosticKind, Encoding, EndpointDeclaration, MethodMarker, ParameterBinding,
    ParameterDeclaration, Role, bind_parameters, resolve_endpoint,
};

/// A method as declared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodDeclaration {
    /// Method identifier.
    pub name: String,
    /// Method markers in attribute order.
    pub markers: Vec<MethodMarker>,
    /// Parameters in signature order, receiver excluded.
    pub parameters: Vec<ParameterDeclaration>,
    /// Whether a return type is written.
    pub has_return_type: bool,
    /// Whether the method is `async`.
    pub is_async: bool,
}

/// Everything needed to generate or drive one endpoint method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSchema {
    /// Method identifier.
    pub name: String,
    /// Resolved HTTP information.
    pub endpoint: EndpointDeclaration,
    /// Bindings of the marked parameters, in signature order.
    pub bindings: Vec<ParameterBinding>,
    /// Number of declared parameters, receiver excluded.
    pub arity: usize,
    /// Signature index of the first body parameter.
    pub body_parameter: Option<usize>,
    /// Advisory diagnostics.
    pub warnings: Vec<Diagnostic>,
}

impl MethodSchema {
    /// Whether the body parameter will be serialized.
    #[must_use]
    pub fn sends_body(&self) -> bool {
        self.body_parameter.is_some()
            && self.endpoint.body_permitted
            && self.endpoint.encoding == Encoding::None
    }
}

/// Analyze one method.
///
/// # Errors
///
/// Returns every diagnostic found (warnings included) when at least one is
/// fatal.
pub fn analyze_method(method: &MethodDeclaration) -> Result<MethodSchema, Vec<Diagnostic>> {
    let target = method.name.as_str();
    let mut diagnostics = Vec::new();

    if !method.has_return_type {
        diagnostics.push(Diagnostic::new(DiagnosticKind::MissingReturnType, target));
    }
    if !method.is_async {
        diagnostics.push(Diagnostic::new(DiagnosticKind::NotAsync, target));
    }

    let endpoint = resolve_endpoint(&method.markers, target, &mut diagnostics);
    let bindings = bind_parameters(&method.parameters);

    let any = |pred: fn(&Role) -> bool| bindings.iter().any(|b| b.roles.iter().any(pred));
    let body_parameter = bindings.iter().find(|b| b.is_body()).map(|b| b.index);

    if any(|r| matches!(r, Role::Field(_) | Role::FieldMap))
        && !endpoint.encoding.accepts_fields()
    {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::FieldWithoutFormEncoding,
            target,
        ));
    }
    if any(|r| matches!(r, Role::Part(_) | Role::PartMap))
        && !endpoint.encoding.accepts_parts()
    {
        diagnostics.push(Diagnostic::new(DiagnosticKind::PartWithoutMultipart, target));
    }
    if body_parameter.is_some() {
        if endpoint.encoding != Encoding::None {
            diagnostics.push(Diagnostic::new(DiagnosticKind::BodyWithEncoding, target));
        }
        if !endpoint.body_permitted {
            diagnostics.push(Diagnostic::new(DiagnosticKind::BodyNotPermitted, target));
        }
    }

    if diagnostics.iter().any(Diagnostic::is_fatal) {
        return Err(diagnostics);
    }

    Ok(MethodSchema {
        name: method.name.clone(),
        endpoint,
        bindings,
        arity: method.parameters.len(),
        body_parameter,
        warnings: diagnostics,
    })
}

/// A container of endpoint methods as declared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDeclaration {
    /// Container identifier.
    pub name: String,
    /// Whether the container is a pure contract (a trait of body-less methods).
    pub is_contract: bool,
    /// Declared methods.
    pub methods: Vec<MethodDeclaration>,
}

/// Result of analyzing a whole interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSchema {
    /// Container identifier.
    pub name: String,
    /// Schemas of the methods that passed analysis.
    pub methods: Vec<MethodSchema>,
    /// Diagnostics of every method, fatal ones included.
    pub diagnostics: Vec<Diagnostic>,
}

impl InterfaceSchema {
    /// Whether any method failed analysis.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Analyze every method of an interface.
///
/// A fatal method diagnostic drops that method only.
///
/// # Errors
///
/// Returns [`DiagnosticKind::NotAnInterface`] when the container is not a
/// pure contract; nothing is generated for it.
pub fn analyze_interface(interface: &InterfaceDeclaration) -> Result<InterfaceSchema, Diagnostic> {
    if !interface.is_contract {
        return Err(Diagnostic::new(
            DiagnosticKind::NotAnInterface {
                name: interface.name.clone(),
            },
            interface.name.as_str(),
        ));
    }

    let mut methods = Vec::with_capacity(interface.methods.len());
    let mut diagnostics = Vec::new();
    for method in &interface.methods {
        match analyze_method(method) {
            Ok(schema) => {
                diagnostics.extend(schema.warnings.iter().cloned());
                methods.push(schema);
            }
            Err(found) => diagnostics.extend(found),
        }
    }

    tracing::debug!(
        interface = %interface.name,
        methods = methods.len(),
        diagnostics = diagnostics.len(),
        "interface analyzed"
    );

    Ok(InterfaceSchema {
        name: interface.name.clone(),
        methods,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;
    use crate::ParamMarker;

    fn method(
        name: &str,
        markers: Vec<MethodMarker>,
        params: Vec<ParameterDeclaration>,
    ) -> MethodDeclaration {
        MethodDeclaration {
            name: name.into(),
            markers,
            parameters: params,
            has_return_type: true,
            is_async: true,
        }
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind.clone()).collect()
    }

    #[test]
    fn missing_return_type_is_fatal() {
        let mut decl = method("ping", vec![MethodMarker::Get("/ping".into())], vec![]);
        decl.has_return_type = false;
        decl.is_async = false;
        let_assert!(Err(diagnostics) = analyze_method(&decl));
        check!(
            kinds(&diagnostics) == vec![DiagnosticKind::MissingReturnType, DiagnosticKind::NotAsync]
        );
    }

    #[test]
    fn field_without_form_warns() {
        let decl = method(
            "login",
            vec![MethodMarker::Post("/login".into())],
            vec![ParameterDeclaration::new("user", vec![ParamMarker::Field(None)])],
        );
        let_assert!(Ok(schema) = analyze_method(&decl));
        check!(kinds(&schema.warnings) == vec![DiagnosticKind::FieldWithoutFormEncoding]);
    }

    #[test]
    fn body_with_multipart_warns() {
        let decl = method(
            "upload",
            vec![MethodMarker::Post("/upload".into()), MethodMarker::Multipart],
            vec![
                ParameterDeclaration::new("file", vec![ParamMarker::Part(None)]),
                ParameterDeclaration::new("meta", vec![ParamMarker::Body]),
            ],
        );
        let_assert!(Ok(schema) = analyze_method(&decl));
        check!(kinds(&schema.warnings) == vec![DiagnosticKind::BodyWithEncoding]);
        check!(schema.body_parameter == Some(1));
        check!(!schema.sends_body());
    }

    #[test]
    fn body_on_get_warns() {
        let decl = method(
            "search",
            vec![MethodMarker::Get("/search".into())],
            vec![ParameterDeclaration::new("filter", vec![ParamMarker::Body])],
        );
        let_assert!(Ok(schema) = analyze_method(&decl));
        check!(kinds(&schema.warnings) == vec![DiagnosticKind::BodyNotPermitted]);
    }

    #[test]
    fn first_body_parameter_is_used() {
        let decl = method(
            "create",
            vec![MethodMarker::Post("/users".into())],
            vec![
                ParameterDeclaration::new("id", vec![ParamMarker::Header(None)]),
                ParameterDeclaration::new("user", vec![ParamMarker::Body]),
                ParameterDeclaration::new("other", vec![ParamMarker::Body]),
            ],
        );
        let_assert!(Ok(schema) = analyze_method(&decl));
        check!(schema.body_parameter == Some(1));
        check!(schema.sends_body());
        check!(schema.arity == 3);
    }

    #[test]
    fn non_contract_is_rejected() {
        let interface = InterfaceDeclaration {
            name: "UserApi".into(),
            is_contract: false,
            methods: vec![],
        };
        let_assert!(Err(diagnostic) = analyze_interface(&interface));
        check!(diagnostic.is_fatal());
        check!(diagnostic.target == "UserApi");
    }

    #[test]
    fn fatal_method_does_not_stop_others() {
        let mut broken = method("broken", vec![], vec![]);
        broken.is_async = false;
        let interface = InterfaceDeclaration {
            name: "UserApi".into(),
            is_contract: true,
            methods: vec![broken, method("list", vec![MethodMarker::Get("/users".into())], vec![])],
        };
        let_assert!(Ok(schema) = analyze_interface(&interface));
        check!(schema.methods.len() == 1);
        check!(schema.methods[0].name == "list");
        check!(schema.has_fatal());
        check!(schema.diagnostics[0].target == "broken");
    }
}
