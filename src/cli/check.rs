//! Evaluate an expression against a JSON-described page context

use crate::{Diagnostic, EngineConfig, ExpressionEngine};

use super::{CliError, context_from_json, init_parameters, value_to_json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Template text, e.g. `${param.id}` or `Hello ${user.name}`
    pub expression: String,
    /// Page context as JSON
    pub context: Option<String>,
    /// Fail on the first recoverable evaluation problem
    pub strict: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Evaluated; diagnostics are the recoverable problems met on the way
    Success {
        output: serde_json::Value,
        diagnostics: Vec<Diagnostic>,
    },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let doc: serde_json::Value = match &options.context {
        Some(text) => serde_json::from_str(text)?,
        None => serde_json::Value::Object(Default::default()),
    };

    let config = EngineConfig::from_init_parameters(&init_parameters(&doc))
        .with_strict(options.strict)
        .with_cache_capacity(0);
    let engine = ExpressionEngine::new(config);

    let template = engine.parse(&options.expression)?;
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let ctx = context_from_json(doc)?;
    let evaluation = engine.evaluate_parsed(&template, &ctx)?;

    Ok(CheckResult::Success {
        output: value_to_json(evaluation.value),
        diagnostics: evaluation.diagnostics,
    })
}
