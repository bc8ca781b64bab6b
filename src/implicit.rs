//! The fixed set of implicit objects available to every expression.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    context::{MultiValueMap, ResolutionContext, Scope},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImplicitObject {
    /// The page context itself
    PageContext,
    /// Page scope attributes
    Page,
    /// Request scope attributes
    Request,
    /// Session scope attributes (empty without a session)
    Session,
    /// Application scope attributes
    Application,
    /// Request parameter name → first value
    Param,
    /// Request parameter name → all values
    Params,
    /// Header name → first value
    Header,
    /// Header name → all values
    Headers,
    /// Init parameter name → value
    InitParam,
    /// Cookie name → cookie
    Cookie,
}

impl ImplicitObject {
    pub const ALL: [ImplicitObject; 11] = [
        ImplicitObject::PageContext,
        ImplicitObject::Page,
        ImplicitObject::Request,
        ImplicitObject::Session,
        ImplicitObject::Application,
        ImplicitObject::Param,
        ImplicitObject::Params,
        ImplicitObject::Header,
        ImplicitObject::Headers,
        ImplicitObject::InitParam,
        ImplicitObject::Cookie,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ImplicitObject::PageContext => "pageContext",
            ImplicitObject::Page => "page",
            ImplicitObject::Request => "request",
            ImplicitObject::Session => "session",
            ImplicitObject::Application => "application",
            ImplicitObject::Param => "param",
            ImplicitObject::Params => "params",
            ImplicitObject::Header => "header",
            ImplicitObject::Headers => "headers",
            ImplicitObject::InitParam => "initParam",
            ImplicitObject::Cookie => "cookie",
        }
    }

    /// Looks `name` up in the registry.
    pub fn lookup(name: &str) -> Option<ImplicitObject> {
        REGISTRY.get(name).copied()
    }

    /// Produces the object's value for one evaluation.
    pub fn resolve(self, ctx: &dyn ResolutionContext) -> Value {
        match self {
            ImplicitObject::PageContext => ctx.page_context(),
            ImplicitObject::Page => scope_map(ctx, Scope::Page),
            ImplicitObject::Request => scope_map(ctx, Scope::Request),
            ImplicitObject::Session => scope_map(ctx, Scope::Session),
            ImplicitObject::Application => scope_map(ctx, Scope::Application),
            ImplicitObject::Param => first_values(ctx.parameters()),
            ImplicitObject::Params => all_values(ctx.parameters()),
            ImplicitObject::Header => first_values(ctx.headers()),
            ImplicitObject::Headers => all_values(ctx.headers()),
            ImplicitObject::InitParam => Value::Object(
                ctx.init_parameters()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            ),
            ImplicitObject::Cookie => {
                let mut cookies = HashMap::new();
                // the first cookie sent under a name wins
                for cookie in ctx.cookies() {
                    cookies
                        .entry(cookie.name.clone())
                        .or_insert_with(|| Value::bean(cookie.clone()));
                }
                Value::Object(cookies)
            }
        }
    }
}

static REGISTRY: Lazy<HashMap<&'static str, ImplicitObject>> =
    Lazy::new(|| ImplicitObject::ALL.iter().map(|obj| (obj.name(), *obj)).collect());

fn scope_map(ctx: &dyn ResolutionContext, scope: Scope) -> Value {
    Value::Object(ctx.scope_attributes(scope).unwrap_or_default())
}

fn first_values(map: &MultiValueMap) -> Value {
    Value::Object(
        map.iter()
            .filter_map(|(name, values)| {
                values
                    .first()
                    .map(|first| (name.clone(), Value::from(first.as_str())))
            })
            .collect(),
    )
}

fn all_values(map: &MultiValueMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(name, values)| {
                let values = values.iter().map(|v| Value::from(v.as_str())).collect();
                (name.clone(), Value::Array(values))
            })
            .collect(),
    )
}
