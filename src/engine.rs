use std::sync::Arc;

use thiserror::Error;

use crate::{
    cache::{CacheStats, ExpressionCache},
    config::EngineConfig,
    context::ResolutionContext,
    diagnostics::{EvalError, Evaluation},
    evaluator::Evaluator,
    parser::{ParseError, Template},
};

/// Errors surfaced to the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvalError),
}

/// Parses attribute text through a shared cache and evaluates it.
///
/// One engine is meant to live for the whole process and be shared by the
/// threads rendering pages.
///
/// # Examples
///
/// ```
/// use jstl_el::{ExpressionEngine, PageContext, Scope, Value};
///
/// let engine = ExpressionEngine::default();
/// let mut ctx = PageContext::new();
/// ctx.set_attribute(Scope::Request, "name", Value::from("World")).unwrap();
///
/// let result = engine.evaluate("Hello ${name}!", &ctx).unwrap();
/// assert_eq!(result.value, Value::from("Hello World!"));
/// ```
pub struct ExpressionEngine {
    config: EngineConfig,
    cache: ExpressionCache,
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        ExpressionEngine::new(EngineConfig::default())
    }
}

impl ExpressionEngine {
    pub fn new(config: EngineConfig) -> Self {
        ExpressionEngine {
            cache: ExpressionCache::new(config.cache_capacity),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses `text`, reusing a cached tree when the same text was seen.
    pub fn parse(&self, text: &str) -> Result<Arc<Template>, ParseError> {
        self.cache.get_or_parse(text)
    }

    /// Parses and evaluates `text`. Only syntax errors fail, unless the
    /// engine is in strict mode.
    pub fn evaluate(&self, text: &str, ctx: &dyn ResolutionContext) -> Result<Evaluation, ElError> {
        let template = self.parse(text)?;
        self.evaluate_parsed(&template, ctx)
    }

    pub fn evaluate_parsed(
        &self,
        template: &Template,
        ctx: &dyn ResolutionContext,
    ) -> Result<Evaluation, ElError> {
        Ok(Evaluator::new(ctx)
            .strict(self.config.strict)
            .evaluate_template(template)?)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
