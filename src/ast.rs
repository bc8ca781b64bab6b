//! # JSTL Expression Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the expression
//! language embedded in tag attributes as `${...}`.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, access, operations)
//! - **[operators]** - Binary and prefix operators
//!
//! ## Quick Start
//!
//! ```text
//! ${param.id == 5 && not empty session.user}
//! ```
//!
//! ## Core Concepts
//!
//! ### Name Resolution
//!
//! A bare identifier is first matched against the implicit objects
//! (`param`, `header`, `cookie`, ...). Anything else is looked up as an
//! attribute in page, request, session and application scope, in that order.
//!
//! ### Access
//!
//! `a.b` and `a["b"]` are the same node. The runtime type of `a` decides
//! the meaning:
//!
//! - **Mapping** → lookup by key (missing keys are null)
//! - **List** → integer index (out of range is null)
//! - **Bean** → property getter by name (a missing property is a logged
//!   recoverable failure)
//!
//! ### Precedence
//!
//! From loosest to tightest: `?:`, `||`, `&&`, `== !=`, `< > <= >=`,
//! `+ -`, `* / %`, prefix `- ! empty`, then `.`/`[]` access.
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::{SpannedToken, Token};
pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
