//! # Iterant - Block Iteration for Template Renderers
//!
//! `iterant` implements the `each` block helper: given a value bound in the
//! current render scope, it repeats a block once per element of a sequence,
//! or once per field of a record, and renders every repetition in a child
//! scope carrying iteration metadata.
//!
//! Parsing templates and rendering blocks belong to the surrounding
//! renderer. This crate only orchestrates repetition and variable injection
//! around the block callbacks it is given.
//!
//! ## Core Concepts
//!
//! - [`Scope`]: Immutable node in the rendering-context tree, with parent fallback
//! - [`ScopeBuilder`]: Creates and releases child scopes; [`ScopeGuard`] releases on drop
//! - [`Options`]: Per-call scope, blocks and collaborators
//! - [`EachHelper`]: Classifies the value ([`Shape`]) and drives the iteration
//! - [`HelperRegistry`]: Helpers by name, with `each` built in
//! - [`EachConfig`]: Metadata variable names and marker strings
//!
//! ## Metadata
//!
//! | Sequence step | Record step |
//! |---------------|-------------|
//! | `@index`, `@index_1` | `@key` |
//! | `@first`, `@last` | `@first` |
//! | `@odd`, `@even` | |
//!
//! Markers are strings: `"first"`, `"last"`, `"odd"`, `"even"` when the
//! condition holds, `""` otherwise.
//!
//! ## Quick Start
//!
//! ```rust
//! use iterant::{EachHelper, Options, Result, Scope};
//! use minijinja::Value;
//! use std::rc::Rc;
//!
//! let root = Scope::root(Value::UNDEFINED);
//! let mut options = Options::new(root, |scope: &Rc<Scope>| -> Result<String> {
//!     let sep = if scope.get("@last").map_or(false, |v| v.is_true()) { "" } else { ", " };
//!     Ok(format!("{}{}", scope.this(), sep))
//! })
//! .inverse(|_: &Rc<Scope>| -> Result<String> { Ok("(none)".into()) });
//!
//! let each = EachHelper::new();
//! let output = each.apply(&Value::from(vec!["red", "green", "blue"]), &mut options).unwrap();
//! assert_eq!(output, "red, green, blue");
//!
//! let empty = each.apply(&Value::from(Vec::<Value>::new()), &mut options).unwrap();
//! assert_eq!(empty, "(none)");
//! ```
//!
//! ## Templates
//!
//! With [`template::TemplateBlock`], the block can be a MiniJinja template;
//! see the [`template`] module.

mod config;
mod each;
mod error;
mod options;
mod registry;
mod scope;
pub mod template;

pub use config::{EachConfig, Markers, VarNames};
pub use each::{EachHelper, Shape};
pub use error::{RenderError, Result};
pub use options::{Block, EmptyBlock, Falsiness, FieldEnumerator, MapFields, Options, Truthiness};
pub use registry::{Helper, HelperRegistry};
pub use scope::{Scope, ScopeBuilder, ScopeGuard, TreeScopeBuilder};
pub use template::{render_each, scope_context, TemplateBlock};
