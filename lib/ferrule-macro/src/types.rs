//! Type inspection helpers.

use syn::visit_mut::{self, VisitMut};
use syn::{GenericArgument, Lifetime, PathArguments, Type};

/// Name of the lifetime every rewritten method is bound to.
pub(crate) const LIFETIME: &str = "'ferrule";

pub(crate) fn lifetime() -> Lifetime {
    Lifetime::new(LIFETIME, proc_macro2::Span::call_site())
}

/// Strip references, groups and parentheses.
fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => peel(&reference.elem),
        Type::Paren(paren) => peel(&paren.elem),
        Type::Group(group) => peel(&group.elem),
        other => other,
    }
}

fn type_args(ty: &Type) -> Option<(String, Vec<&Type>)> {
    let Type::Path(path) = peel(ty) else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let args = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Some((segment.ident.to_string(), args))
}

/// Whether `ty` is `Option<_>`, possibly behind references.
pub(crate) fn is_option(ty: &Type) -> bool {
    type_args(ty).is_some_and(|(name, args)| name == "Option" && args.len() == 1)
}

/// `T` of a `Result<T>` or `Result<T, E>` return type.
pub(crate) fn result_ok_type(ty: &Type) -> Option<&Type> {
    let (name, args) = type_args(ty)?;
    if name == "Result" {
        args.first().copied()
    } else {
        None
    }
}

/// Whether the values of a map-like type are `Option<_>`.
///
/// Understands `HashMap<K, V>`-style types and sequences of `(K, V)` pairs,
/// optionally wrapped in an outer `Option`.
pub(crate) fn map_values_are_optional(ty: &Type) -> bool {
    if let Some(("Option", [inner])) = type_args(ty)
        .as_ref()
        .map(|(name, args)| (name.as_str(), args.as_slice()))
    {
        return map_values_are_optional(inner);
    }

    let pair_value = |ty: &Type| match peel(ty) {
        Type::Tuple(tuple) if tuple.elems.len() == 2 => {
            tuple.elems.iter().nth(1).is_some_and(is_option)
        }
        _ => false,
    };

    match peel(ty) {
        Type::Slice(slice) => pair_value(&slice.elem),
        Type::Array(array) => pair_value(&array.elem),
        _ => match type_args(ty).map(|(_, args)| args).as_deref() {
            Some([_, value, ..]) => is_option(value),
            Some([pair]) => pair_value(pair),
            _ => false,
        },
    }
}

/// Whether `ty` is an `impl Trait`, possibly behind references.
pub(crate) fn is_impl_trait(ty: &Type) -> bool {
    matches!(peel(ty), Type::ImplTrait(_))
}

/// Ties elided and `'_` lifetimes to `'ferrule`.
pub(crate) struct BindElided;

impl VisitMut for BindElided {
    fn visit_type_reference_mut(&mut self, reference: &mut syn::TypeReference) {
        if reference.lifetime.is_none() {
            reference.lifetime = Some(lifetime());
        }
        visit_mut::visit_type_reference_mut(self, reference);
    }

    fn visit_lifetime_mut(&mut self, lt: &mut Lifetime) {
        if lt.ident == "_" {
            *lt = lifetime();
        }
    }

    // Lifetimes inside `dyn Fn(&T)` are higher-ranked; leave them elided.
    fn visit_parenthesized_generic_arguments_mut(
        &mut self,
        _: &mut syn::ParenthesizedGenericArguments,
    ) {
    }
}
