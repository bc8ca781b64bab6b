pub mod ast;
pub mod cache;
pub mod cli;
pub mod coercion;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod evaluator;
pub mod implicit;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{BinOp, Expr, SpannedToken, Token, UnaryOp};
pub use cache::{CacheStats, ExpressionCache};
pub use config::EngineConfig;
pub use context::{ContextError, Cookie, PageContext, RequestInfo, ResolutionContext, Scope};
pub use diagnostics::{Diagnostic, DiagnosticKind, EvalError, Evaluation};
pub use engine::{ElError, ExpressionEngine};
pub use evaluator::{Evaluator, evaluate};
pub use implicit::ImplicitObject;
pub use lexer::{LexError, Lexer, tokenize};
pub use parser::{ParseError, Parser, Template, TemplatePart, parse_expression, parse_template};
pub use resolver::resolve_identifier;
pub use value::{Bean, PropertyError, Value};
