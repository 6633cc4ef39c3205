//! Render options and the collaborators a helper consumes.
//!
//! [`Options`] carries everything a helper needs from the surrounding
//! renderer for a single call:
//!
//! 1. The current [`Scope`]
//! 2. The main block and the inverse ("else") block, both [`Block`]s
//! 3. A [`Falsiness`] predicate, used to pick the inverse block
//! 4. A [`FieldEnumerator`], used to walk record-like values
//! 5. A [`ScopeBuilder`] that creates and releases child scopes
//!
//! Each collaborator is a trait with a blanket implementation for closures,
//! so callers can pass a plain closure wherever a collaborator is expected:
//!
//! ```rust
//! use iterant::{Options, Result, Scope};
//! use minijinja::Value;
//! use std::rc::Rc;
//!
//! let root = Scope::root(Value::UNDEFINED);
//! let options = Options::new(root, |scope: &Rc<Scope>| -> Result<String> {
//!     Ok(scope.this().to_string())
//! })
//! .inverse(|_: &Rc<Scope>| -> Result<String> { Ok("nothing".into()) })
//! .falsiness(|value: &Value| value.len() == Some(0));
//! ```
//!
//! # Single-Threaded Design
//!
//! Scopes are reference counted with `Rc`, and none of the collaborators
//! require `Send + Sync`. A render call runs to completion on one thread.

use crate::error::{RenderError, Result};
use crate::scope::{Scope, ScopeBuilder, TreeScopeBuilder};
use minijinja::value::ValueKind;
use minijinja::Value;
use std::rc::Rc;

/// A renderable block, invoked once per iteration step.
pub trait Block {
    /// Renders the block against `scope`.
    fn render(&mut self, scope: &Rc<Scope>) -> Result<String>;
}

impl<F> Block for F
where
    F: FnMut(&Rc<Scope>) -> Result<String>,
{
    fn render(&mut self, scope: &Rc<Scope>) -> Result<String> {
        (self)(scope)
    }
}

/// A block that renders nothing. Used when no inverse block is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBlock;

impl Block for EmptyBlock {
    fn render(&mut self, _scope: &Rc<Scope>) -> Result<String> {
        Ok(String::new())
    }
}

/// Decides whether a sequence should render the inverse block instead.
pub trait Falsiness {
    fn is_falsy(&self, value: &Value) -> bool;
}

impl<F> Falsiness for F
where
    F: Fn(&Value) -> bool,
{
    fn is_falsy(&self, value: &Value) -> bool {
        (self)(value)
    }
}

/// MiniJinja's own truthiness: a value is falsy when it is not true.
///
/// Empty sequences and maps, empty strings, zero, `false`, `none` and
/// `undefined` are falsy. Lazy iterables of unknown length are truthy; if
/// one turns out empty, `each` still renders the inverse block.
#[derive(Debug, Clone, Copy, Default)]
pub struct Truthiness;

impl Falsiness for Truthiness {
    fn is_falsy(&self, value: &Value) -> bool {
        !value.is_true()
    }
}

/// Enumerates the `(key, value)` fields of a record-like value.
///
/// Implementations decide the order. Callers must not reorder the result.
pub trait FieldEnumerator {
    fn fields(&self, value: &Value) -> Result<Vec<(String, Value)>>;
}

impl<F> FieldEnumerator for F
where
    F: Fn(&Value) -> Result<Vec<(String, Value)>>,
{
    fn fields(&self, value: &Value) -> Result<Vec<(String, Value)>> {
        (self)(value)
    }
}

/// Enumerates map-like MiniJinja values in the order the value yields keys.
///
/// Anything that is not a map fails with [`RenderError::NotEnumerable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MapFields;

impl FieldEnumerator for MapFields {
    fn fields(&self, value: &Value) -> Result<Vec<(String, Value)>> {
        if value.kind() != ValueKind::Map {
            return Err(RenderError::NotEnumerable { kind: value.kind() });
        }
        value
            .try_iter()?
            .map(|key| -> Result<(String, Value)> {
                let field = value.get_item(&key)?;
                let name = match key.as_str() {
                    Some(s) => s.to_string(),
                    None => key.to_string(),
                };
                Ok((name, field))
            })
            .collect()
    }
}

/// Per-call options handed to a helper.
pub struct Options<'a> {
    pub(crate) scope: Rc<Scope>,
    pub(crate) block: Box<dyn Block + 'a>,
    pub(crate) inverse: Box<dyn Block + 'a>,
    pub(crate) falsiness: Box<dyn Falsiness + 'a>,
    pub(crate) fields: Box<dyn FieldEnumerator + 'a>,
    pub(crate) scopes: Box<dyn ScopeBuilder + 'a>,
}

impl<'a> Options<'a> {
    /// Creates options for rendering `block` under `scope`.
    ///
    /// Defaults: an empty inverse block, [`Truthiness`], [`MapFields`] and
    /// [`TreeScopeBuilder`].
    pub fn new(scope: Rc<Scope>, block: impl Block + 'a) -> Self {
        Self {
            scope,
            block: Box::new(block),
            inverse: Box::new(EmptyBlock),
            falsiness: Box::new(Truthiness),
            fields: Box::new(MapFields),
            scopes: Box::new(TreeScopeBuilder),
        }
    }

    /// Sets the block rendered when a sequence is falsy.
    pub fn inverse(mut self, block: impl Block + 'a) -> Self {
        self.inverse = Box::new(block);
        self
    }

    /// Sets the falsiness predicate.
    pub fn falsiness(mut self, falsiness: impl Falsiness + 'a) -> Self {
        self.falsiness = Box::new(falsiness);
        self
    }

    /// Sets the field enumerator used for records.
    pub fn fields(mut self, fields: impl FieldEnumerator + 'a) -> Self {
        self.fields = Box::new(fields);
        self
    }

    /// Sets the scope builder.
    pub fn scope_builder(mut self, scopes: impl ScopeBuilder + 'a) -> Self {
        self.scopes = Box::new(scopes);
        self
    }

    /// The scope the helper was invoked in.
    pub fn scope(&self) -> &Rc<Scope> {
        &self.scope
    }

    /// Renders the main block against `scope`.
    pub fn render_block(&mut self, scope: &Rc<Scope>) -> Result<String> {
        self.block.render(scope)
    }

    /// Renders the inverse block against the current scope.
    pub fn render_inverse(&mut self) -> Result<String> {
        self.inverse.render(&self.scope)
    }

    pub fn is_falsy(&self, value: &Value) -> bool {
        self.falsiness.is_falsy(value)
    }

    pub fn fields_of(&self, value: &Value) -> Result<Vec<(String, Value)>> {
        self.fields.fields(value)
    }
}

impl std::fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
