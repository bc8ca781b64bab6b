//! JSON <-> Value conversion and page context loading

use std::collections::HashMap;

use crate::{Cookie, PageContext, Scope, Value};

use super::CliError;

/// Convert serde_json::Value to Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert Value to serde_json::Value. Beans render as their type name.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => {
            serde_json::Value::Object(obj.into_iter().map(|(k, v)| (k, value_to_json(v))).collect())
        }
        Value::Bean(bean) => serde_json::Value::String(bean.type_name().to_string()),
    }
}

fn scalar_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `"a"` or `["a", "b"]` → ordered values
fn multi_values(v: &serde_json::Value) -> Vec<String> {
    match v {
        serde_json::Value::Array(items) => items.iter().map(scalar_text).collect(),
        other => vec![scalar_text(other)],
    }
}

fn object_section<'a>(
    root: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<&'a serde_json::Map<String, serde_json::Value>>, CliError> {
    match root.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(CliError::Context(format!("'{}' must be an object", key))),
    }
}

/// Builds a page context from the JSON document accepted by `check`.
///
/// Recognised keys: `page`, `request`, `session`, `application`, `query`,
/// `params`, `headers`, `cookies`, `initParams`. A `session` key holding an
/// object (even an empty one) starts a session.
pub fn context_from_json(doc: serde_json::Value) -> Result<PageContext, CliError> {
    let serde_json::Value::Object(root) = doc else {
        return Err(CliError::Context("context must be a JSON object".to_string()));
    };

    let mut ctx = PageContext::new();

    if object_section(&root, "session")?.is_some() {
        ctx.start_session("cli-session");
    }

    for scope in Scope::SEARCH_ORDER {
        if let Some(attrs) = object_section(&root, scope.name())? {
            for (name, value) in attrs {
                ctx.set_attribute(scope, name.clone(), json_to_value(value.clone()))
                    .map_err(|e| CliError::Context(e.to_string()))?;
            }
        }
    }

    if let Some(query) = root.get("query").and_then(|q| q.as_str()) {
        ctx.set_query_string(query);
    }

    if let Some(params) = object_section(&root, "params")? {
        for (name, values) in params {
            for value in multi_values(values) {
                ctx.add_parameter(name.clone(), value);
            }
        }
    }

    if let Some(headers) = object_section(&root, "headers")? {
        for (name, values) in headers {
            for value in multi_values(values) {
                ctx.add_header(name.clone(), value);
            }
        }
    }

    if let Some(cookies) = object_section(&root, "cookies")? {
        for (name, value) in cookies {
            ctx.add_cookie(Cookie::new(name.clone(), scalar_text(value)));
        }
    }

    if let Some(init) = object_section(&root, "initParams")? {
        for (name, value) in init {
            ctx.set_init_parameter(name.clone(), scalar_text(value));
        }
    }

    Ok(ctx)
}

/// Init parameters from the context document, for engine configuration.
pub fn init_parameters(doc: &serde_json::Value) -> HashMap<String, String> {
    doc.get("initParams")
        .and_then(|p| p.as_object())
        .map(|map| map.iter().map(|(k, v)| (k.clone(), scalar_text(v))).collect())
        .unwrap_or_default()
}
