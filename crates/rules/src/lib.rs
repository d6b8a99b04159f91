//! Tonggwan Rules - Regulation rules as data
//!
//! A rule pairs a serializable condition tree with the risk outcome
//! and explanation to report when it matches:
//! - `Condition`: tagged AST with `all`/`any`/`not` combinators
//! - `RuleDefinition` / `RuleLibrary`: the ordered rule set
//! - `RuleEvaluator`: pure matcher over a shipment context

pub mod evaluator;
pub mod types;

pub use evaluator::{RuleContext, RuleEvaluator};
pub use types::{Condition, LibraryError, RuleBuilder, RuleDefinition, RuleLibrary};
