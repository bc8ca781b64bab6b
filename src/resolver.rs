use crate::{
    context::{ResolutionContext, Scope},
    implicit::ImplicitObject,
    value::Value,
};

/// Resolves a bare identifier.
///
/// Implicit objects win; otherwise page, request, session (only when a
/// session exists) and application scope are searched in that order.
/// `None` means unresolved, which evaluation treats as null.
pub fn resolve_identifier(name: &str, ctx: &dyn ResolutionContext) -> Option<Value> {
    if let Some(obj) = ImplicitObject::lookup(name) {
        return Some(obj.resolve(ctx));
    }
    find_in_scopes(name, ctx)
}

/// Scope-chain lookup only, skipping implicit objects.
pub fn find_in_scopes(name: &str, ctx: &dyn ResolutionContext) -> Option<Value> {
    Scope::SEARCH_ORDER
        .into_iter()
        .filter(|scope| *scope != Scope::Session || ctx.has_session())
        .find_map(|scope| ctx.attribute(scope, name))
}
