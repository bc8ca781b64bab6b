// tests/implicit_objects.rs
//
// Implicit objects and scoped attribute lookup.

use jstl_el::{
    ContextError, Cookie, DiagnosticKind, Evaluation, PageContext, RequestInfo, Scope, Value,
    evaluate, parse_expression, resolve_identifier,
};
use pretty_assertions::assert_eq;

fn eval_in(ctx: &PageContext, src: &str) -> Evaluation {
    evaluate(&parse_expression(src).unwrap(), ctx)
}

fn value_in(ctx: &PageContext, src: &str) -> Value {
    let result = eval_in(ctx, src);
    assert!(
        result.is_clean(),
        "Unexpected diagnostics for {}: {:?}",
        src,
        result.diagnostics
    );
    result.value
}

// ============================================================================
// Request parameters and headers
// ============================================================================

#[test]
fn test_param_and_params() {
    let mut ctx = PageContext::new();
    ctx.set_query_string("x=1&x=2&q=hello+world");

    assert_eq!(value_in(&ctx, "param.x"), Value::from("1"));
    assert_eq!(value_in(&ctx, "params.x"), Value::from(vec!["1", "2"]));
    assert_eq!(value_in(&ctx, "params['x'][1]"), Value::from("2"));
    assert_eq!(value_in(&ctx, "param.q"), Value::from("hello world"));
    assert_eq!(value_in(&ctx, "param.missing"), Value::Null);
}

#[test]
fn test_param_numeric_comparison() {
    let mut ctx = PageContext::new();
    ctx.add_parameter("id", "5");
    assert_eq!(value_in(&ctx, "param.id == 5"), Value::Boolean(true));
    assert_eq!(value_in(&ctx, "param.id + 1"), Value::Integer(6));
}

#[test]
fn test_percent_decoding() {
    let mut ctx = PageContext::new();
    ctx.set_query_string("name=%C3%A9t%C3%A9&sym=a%26b");
    assert_eq!(value_in(&ctx, "param.name"), Value::from("été"));
    assert_eq!(value_in(&ctx, "param.sym"), Value::from("a&b"));
}

#[test]
fn test_header_and_headers() {
    let mut ctx = PageContext::new();
    ctx.add_header("Accept", "text/html");
    ctx.add_header("Accept", "application/json");

    assert_eq!(value_in(&ctx, "header.Accept"), Value::from("text/html"));
    assert_eq!(
        value_in(&ctx, "headers['Accept']"),
        Value::from(vec!["text/html", "application/json"])
    );
    assert_eq!(value_in(&ctx, "header['User-Agent']"), Value::Null);
}

#[test]
fn test_empty_request_maps() {
    let ctx = PageContext::new();
    assert_eq!(value_in(&ctx, "empty param"), Value::Boolean(true));
    assert_eq!(value_in(&ctx, "empty headers"), Value::Boolean(true));
    assert_eq!(value_in(&ctx, "empty cookie"), Value::Boolean(true));
}

// ============================================================================
// Cookies and init parameters
// ============================================================================

#[test]
fn test_cookie() {
    let mut ctx = PageContext::new();
    ctx.add_cookie(Cookie::new("id", "42"));
    ctx.add_cookie(Cookie::new("id", "99"));
    ctx.add_cookie(Cookie {
        secure: true,
        max_age: 3600,
        ..Cookie::new("theme", "dark")
    });

    assert_eq!(value_in(&ctx, "cookie.id.value"), Value::from("42"));
    assert_eq!(value_in(&ctx, "cookie.id.name"), Value::from("id"));
    assert_eq!(value_in(&ctx, "cookie.id.maxAge"), Value::Integer(-1));
    assert_eq!(value_in(&ctx, "cookie.id.path"), Value::Null);
    assert_eq!(value_in(&ctx, "cookie.theme.secure"), Value::Boolean(true));
    assert_eq!(value_in(&ctx, "cookie.theme.maxAge / 60"), Value::Integer(60));
    assert_eq!(value_in(&ctx, "cookie.missing.value"), Value::Null);
}

#[test]
fn test_cookie_unknown_property() {
    let mut ctx = PageContext::new();
    ctx.add_cookie(Cookie::new("id", "42"));

    let result = eval_in(&ctx, "cookie.id.flavour");
    assert_eq!(result.value, Value::Null);
    assert_eq!(result.count(DiagnosticKind::PropertyAccessFailure), 1);
}

#[test]
fn test_init_param() {
    let mut ctx = PageContext::new();
    ctx.set_init_parameter("siteName", "Example");
    assert_eq!(value_in(&ctx, "initParam.siteName"), Value::from("Example"));
    assert_eq!(value_in(&ctx, "initParam['other']"), Value::Null);
}

// ============================================================================
// pageContext
// ============================================================================

#[test]
fn test_page_context_request() {
    let mut ctx = PageContext::new().with_request_info(RequestInfo {
        method: "POST".to_string(),
        request_uri: "/shop/cart".to_string(),
        context_path: "/shop".to_string(),
        ..RequestInfo::default()
    });
    ctx.set_query_string("step=2");

    assert_eq!(value_in(&ctx, "pageContext.request.method"), Value::from("POST"));
    assert_eq!(value_in(&ctx, "pageContext.request.contextPath"), Value::from("/shop"));
    assert_eq!(value_in(&ctx, "pageContext.request.queryString"), Value::from("step=2"));
    assert_eq!(value_in(&ctx, "pageContext.request.remoteUser"), Value::Null);
}

#[test]
fn test_page_context_session() {
    let mut ctx = PageContext::new();
    assert_eq!(value_in(&ctx, "pageContext.session"), Value::Null);
    assert_eq!(value_in(&ctx, "pageContext.session.id"), Value::Null);

    ctx.start_session("abc123");
    assert_eq!(value_in(&ctx, "pageContext.session.id"), Value::from("abc123"));
}

#[test]
fn test_page_context_unknown_property() {
    let ctx = PageContext::new();
    let result = eval_in(&ctx, "pageContext.response");
    assert_eq!(result.value, Value::Null);
    assert_eq!(result.count(DiagnosticKind::PropertyAccessFailure), 1);
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_scope_search_order() {
    let mut ctx = PageContext::new();
    ctx.start_session("s1");
    ctx.set_attribute(Scope::Application, "v", Value::from("app")).unwrap();
    ctx.set_attribute(Scope::Session, "v", Value::from("sess")).unwrap();
    ctx.set_attribute(Scope::Request, "v", Value::from("req")).unwrap();
    assert_eq!(value_in(&ctx, "v"), Value::from("req"));

    ctx.set_attribute(Scope::Page, "v", Value::from("page")).unwrap();
    assert_eq!(value_in(&ctx, "v"), Value::from("page"));

    ctx.remove_attribute(Scope::Page, "v");
    ctx.remove_attribute(Scope::Request, "v");
    assert_eq!(value_in(&ctx, "v"), Value::from("sess"));

    ctx.remove_attribute(Scope::Session, "v");
    assert_eq!(value_in(&ctx, "v"), Value::from("app"));

    ctx.remove_attribute_everywhere("v");
    assert_eq!(value_in(&ctx, "v"), Value::Null);
}

#[test]
fn test_scope_objects() {
    let mut ctx = PageContext::new();
    ctx.start_session("s1");
    ctx.set_attribute(Scope::Page, "v", Value::Integer(1)).unwrap();
    ctx.set_attribute(Scope::Session, "v", Value::Integer(3)).unwrap();

    assert_eq!(value_in(&ctx, "page.v"), Value::Integer(1));
    assert_eq!(value_in(&ctx, "request.v"), Value::Null);
    assert_eq!(value_in(&ctx, "session.v"), Value::Integer(3));
    assert_eq!(value_in(&ctx, "application['v']"), Value::Null);
}

#[test]
fn test_without_session() {
    let mut ctx = PageContext::new();
    ctx.set_attribute(Scope::Application, "v", Value::from("app")).unwrap();

    assert_eq!(value_in(&ctx, "empty session"), Value::Boolean(true));
    assert_eq!(value_in(&ctx, "session.v"), Value::Null);
    assert_eq!(value_in(&ctx, "v"), Value::from("app"));

    let err = ctx
        .set_attribute(Scope::Session, "v", Value::from("sess"))
        .unwrap_err();
    assert_eq!(err, ContextError::NoSession("v".to_string()));
}

#[test]
fn test_invalidated_session_hides_attributes() {
    let mut ctx = PageContext::new();
    ctx.start_session("s1");
    ctx.set_attribute(Scope::Session, "cart", Value::from(vec![1i64, 2])).unwrap();
    assert_eq!(value_in(&ctx, "empty cart"), Value::Boolean(false));

    ctx.invalidate_session();
    assert_eq!(value_in(&ctx, "empty cart"), Value::Boolean(true));
    assert_eq!(resolve_identifier("cart", &ctx), None);
}

#[test]
fn test_null_attribute_removes() {
    let mut ctx = PageContext::new();
    ctx.set_attribute(Scope::Request, "v", Value::from("req")).unwrap();
    ctx.set_attribute(Scope::Page, "v", Value::from("page")).unwrap();
    ctx.set_attribute(Scope::Page, "v", Value::Null).unwrap();
    assert_eq!(value_in(&ctx, "v"), Value::from("req"));
}

#[test]
fn test_implicit_names_shadow_attributes() {
    let mut ctx = PageContext::new();
    ctx.set_attribute(Scope::Page, "param", Value::from("shadow")).unwrap();
    ctx.add_parameter("a", "1");

    assert_eq!(value_in(&ctx, "param.a"), Value::from("1"));
    assert_eq!(value_in(&ctx, "page.param"), Value::from("shadow"));
    assert!(matches!(resolve_identifier("param", &ctx), Some(Value::Object(_))));
}

#[test]
fn test_scope_from_str() {
    assert_eq!("Session".parse::<Scope>().unwrap(), Scope::Session);
    assert_eq!("page".parse::<Scope>().unwrap(), Scope::Page);
    assert_eq!(
        "global".parse::<Scope>().unwrap_err(),
        ContextError::UnknownScope("global".to_string())
    );
}
