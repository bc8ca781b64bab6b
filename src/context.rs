//! Host-side resolution context.
//!
//! The evaluator only sees the [`ResolutionContext`] trait: four scoped
//! attribute stores plus the request parameters, headers, cookies and
//! container init parameters behind the implicit objects. [`PageContext`]
//! is an in-memory implementation used by the CLI, tests, and hosts that
//! do not bring their own.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use thiserror::Error;
use url::form_urlencoded;

use crate::value::{Bean, PropertyError, Value};

/// Name → ordered values, for request parameters and headers.
pub type MultiValueMap = HashMap<String, Vec<String>>;

/// Attribute scopes in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Page,
    Request,
    Session,
    Application,
}

impl Scope {
    /// Search order for bare identifiers.
    pub const SEARCH_ORDER: [Scope; 4] = [Scope::Page, Scope::Request, Scope::Session, Scope::Application];

    pub fn name(self) -> &'static str {
        match self {
            Scope::Page => "page",
            Scope::Request => "request",
            Scope::Session => "session",
            Scope::Application => "application",
        }
    }
}

impl FromStr for Scope {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(Scope::Page),
            "request" => Ok(Scope::Request),
            "session" => Ok(Scope::Session),
            "application" => Ok(Scope::Application),
            _ => Err(ContextError::UnknownScope(s.to_string())),
        }
    }
}

/// Errors raised by host stores, never by evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("cannot store '{0}' in session scope: no session exists")]
    NoSession(String),

    #[error("unknown scope '{0}'")]
    UnknownScope(String),
}

/// What an expression can read from its host.
///
/// One context is used per evaluation and is never retained by the parsed
/// expression.
pub trait ResolutionContext {
    /// Attribute `name` in `scope`, if present.
    fn attribute(&self, scope: Scope, name: &str) -> Option<Value>;

    /// Snapshot of every attribute in `scope`. `None` for session scope when
    /// no session exists.
    fn scope_attributes(&self, scope: Scope) -> Option<HashMap<String, Value>>;

    fn has_session(&self) -> bool;

    /// Request parameters, values in submission order.
    fn parameters(&self) -> &MultiValueMap;

    /// Request headers, values in arrival order.
    fn headers(&self) -> &MultiValueMap;

    fn cookies(&self) -> &[Cookie];

    /// Container init parameters.
    fn init_parameters(&self) -> &HashMap<String, String>;

    /// The `pageContext` implicit object.
    fn page_context(&self) -> Value;
}

/// A request cookie, readable as a bean (`cookie.id.value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    /// Seconds; negative means a browser-session cookie
    pub max_age: i64,
    pub secure: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: -1,
            secure: false,
        }
    }
}

impl Bean for Cookie {
    fn type_name(&self) -> &str {
        "Cookie"
    }

    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        match name {
            "name" => Ok(Value::from(self.name.as_str())),
            "value" => Ok(Value::from(self.value.as_str())),
            "path" => Ok(Value::from(self.path.clone())),
            "domain" => Ok(Value::from(self.domain.clone())),
            "maxAge" => Ok(Value::Integer(self.max_age)),
            "secure" => Ok(Value::Boolean(self.secure)),
            _ => Err(PropertyError::NotFound),
        }
    }
}

/// Request line details, exposed as `pageContext.request`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    pub method: String,
    pub request_uri: String,
    pub context_path: String,
    pub query_string: Option<String>,
    pub remote_user: Option<String>,
    pub protocol: String,
}

impl Default for RequestInfo {
    fn default() -> Self {
        RequestInfo {
            method: "GET".to_string(),
            request_uri: "/".to_string(),
            context_path: String::new(),
            query_string: None,
            remote_user: None,
            protocol: "HTTP/1.1".to_string(),
        }
    }
}

impl Bean for RequestInfo {
    fn type_name(&self) -> &str {
        "HttpServletRequest"
    }

    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        match name {
            "method" => Ok(Value::from(self.method.as_str())),
            "requestURI" => Ok(Value::from(self.request_uri.as_str())),
            "contextPath" => Ok(Value::from(self.context_path.as_str())),
            "queryString" => Ok(Value::from(self.query_string.clone())),
            "remoteUser" => Ok(Value::from(self.remote_user.clone())),
            "protocol" => Ok(Value::from(self.protocol.as_str())),
            _ => Err(PropertyError::NotFound),
        }
    }
}

struct SessionInfo {
    id: String,
}

impl Bean for SessionInfo {
    fn type_name(&self) -> &str {
        "HttpSession"
    }

    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        match name {
            "id" => Ok(Value::from(self.id.as_str())),
            _ => Err(PropertyError::NotFound),
        }
    }
}

/// Snapshot handed out as the `pageContext` implicit object.
struct PageContextBean {
    request: Arc<RequestInfo>,
    session_id: Option<String>,
}

impl Bean for PageContextBean {
    fn type_name(&self) -> &str {
        "PageContext"
    }

    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        match name {
            "request" => Ok(Value::Bean(self.request.clone())),
            "session" => Ok(match &self.session_id {
                Some(id) => Value::bean(SessionInfo { id: id.clone() }),
                None => Value::Null,
            }),
            _ => Err(PropertyError::NotFound),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Session {
    id: String,
    attributes: HashMap<String, Value>,
}

/// In-memory page context.
///
/// # Examples
///
/// ```
/// use jstl_el::{PageContext, Scope, Value};
///
/// let mut ctx = PageContext::new();
/// ctx.set_attribute(Scope::Request, "user", Value::from("alice")).unwrap();
/// ctx.set_query_string("x=1&x=2");
///
/// assert_eq!(ctx.find_attribute("user"), Some(&Value::from("alice")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    page: HashMap<String, Value>,
    request: HashMap<String, Value>,
    session: Option<Session>,
    application: HashMap<String, Value>,
    request_info: Arc<RequestInfo>,
    parameters: MultiValueMap,
    headers: MultiValueMap,
    cookies: Vec<Cookie>,
    init_parameters: HashMap<String, String>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_info(mut self, info: RequestInfo) -> Self {
        self.request_info = Arc::new(info);
        self
    }

    fn store(&self, scope: Scope) -> Option<&HashMap<String, Value>> {
        match scope {
            Scope::Page => Some(&self.page),
            Scope::Request => Some(&self.request),
            Scope::Session => self.session.as_ref().map(|s| &s.attributes),
            Scope::Application => Some(&self.application),
        }
    }

    fn store_mut(&mut self, scope: Scope) -> Option<&mut HashMap<String, Value>> {
        match scope {
            Scope::Page => Some(&mut self.page),
            Scope::Request => Some(&mut self.request),
            Scope::Session => self.session.as_mut().map(|s| &mut s.attributes),
            Scope::Application => Some(&mut self.application),
        }
    }

    /// Stores `value` under `name`. Storing `Null` removes the attribute.
    pub fn set_attribute(
        &mut self,
        scope: Scope,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), ContextError> {
        let name = name.into();
        let Some(store) = self.store_mut(scope) else {
            return Err(ContextError::NoSession(name));
        };
        if value.is_null() {
            store.remove(&name);
        } else {
            store.insert(name, value);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, scope: Scope, name: &str) -> Option<Value> {
        self.store_mut(scope).and_then(|store| store.remove(name))
    }

    /// Removes `name` from every scope.
    pub fn remove_attribute_everywhere(&mut self, name: &str) {
        for scope in Scope::SEARCH_ORDER {
            self.remove_attribute(scope, name);
        }
    }

    /// First attribute named `name` in page, request, session, application order.
    pub fn find_attribute(&self, name: &str) -> Option<&Value> {
        Scope::SEARCH_ORDER
            .iter()
            .filter_map(|scope| self.store(*scope))
            .find_map(|store| store.get(name))
    }

    pub fn start_session(&mut self, id: impl Into<String>) {
        self.session = Some(Session {
            id: id.into(),
            attributes: HashMap::new(),
        });
    }

    pub fn invalidate_session(&mut self) {
        self.session = None;
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.entry(name.into()).or_default().push(value.into());
    }

    /// Appends the parameters of a URL-encoded query string, keeping the
    /// order of repeated names.
    pub fn set_query_string(&mut self, query: &str) {
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            self.add_parameter(name, value);
        }
        Arc::make_mut(&mut self.request_info).query_string = Some(query.to_string());
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.entry(name.into()).or_default().push(value.into());
    }

    pub fn add_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    pub fn set_init_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.init_parameters.insert(name.into(), value.into());
    }
}

impl ResolutionContext for PageContext {
    fn attribute(&self, scope: Scope, name: &str) -> Option<Value> {
        self.store(scope).and_then(|store| store.get(name)).cloned()
    }

    fn scope_attributes(&self, scope: Scope) -> Option<HashMap<String, Value>> {
        self.store(scope).cloned()
    }

    fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn parameters(&self) -> &MultiValueMap {
        &self.parameters
    }

    fn headers(&self) -> &MultiValueMap {
        &self.headers
    }

    fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    fn init_parameters(&self) -> &HashMap<String, String> {
        &self.init_parameters
    }

    fn page_context(&self) -> Value {
        Value::bean(PageContextBean {
            request: self.request_info.clone(),
            session_id: self.session.as_ref().map(|s| s.id.clone()),
        })
    }
}
