//! Rendering scopes and their lifecycle.
//!
//! A [`Scope`] is a node in a tree of rendering contexts. It carries the
//! current value (`this`) and a set of named variables, and falls back to its
//! parent for names it does not define. Scopes are immutable once built.
//!
//! Iteration creates one child scope per step through a [`ScopeBuilder`] and
//! hands it out through a [`ScopeGuard`], which releases the scope when the
//! step ends, whether the block succeeded, failed, or panicked.
//!
//! # Example
//!
//! ```rust
//! use iterant::{Scope, ScopeBuilder, TreeScopeBuilder};
//! use minijinja::Value;
//!
//! let root = Scope::root(Value::from("root"));
//! let builder = TreeScopeBuilder;
//! let child = builder.build(
//!     &root,
//!     Value::from("element"),
//!     vec![("@index".to_string(), Value::from(0))],
//! );
//!
//! assert_eq!(child.this(), &Value::from("element"));
//! assert_eq!(child.get("@index"), Some(&Value::from(0)));
//! builder.release(child);
//! ```

use minijinja::Value;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

/// A node in the rendering-context tree.
#[derive(Debug)]
pub struct Scope {
    parent: Option<Rc<Scope>>,
    this: Value,
    vars: HashMap<String, Value>,
}

impl Scope {
    /// Creates a root scope with no variables.
    pub fn root(this: Value) -> Rc<Scope> {
        Self::root_with(this, Vec::new())
    }

    /// Creates a root scope with the given variables.
    pub fn root_with(this: Value, variables: Vec<(String, Value)>) -> Rc<Scope> {
        Rc::new(Scope {
            parent: None,
            this,
            vars: collect_vars(variables),
        })
    }

    /// Creates a child of `parent`.
    ///
    /// Variables are applied in order, so a later entry shadows an earlier
    /// one with the same name.
    pub fn child(parent: &Rc<Scope>, this: Value, variables: Vec<(String, Value)>) -> Scope {
        Scope {
            parent: Some(Rc::clone(parent)),
            this,
            vars: collect_vars(variables),
        }
    }

    /// The current value bound at this node.
    pub fn this(&self) -> &Value {
        &self.this
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Looks up a variable, falling through to the parent chain on a miss.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ancestors().find_map(|scope| scope.vars.get(name))
    }

    /// Looks up a variable defined on this node only.
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Names defined on this node (unordered).
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(|s| s.as_str())
    }

    /// Number of ancestors above this node; zero for a root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Iterates from this node up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref())
    }
}

fn collect_vars(variables: Vec<(String, Value)>) -> HashMap<String, Value> {
    // HashMap::insert keeps the last value for a repeated key.
    let mut vars = HashMap::with_capacity(variables.len());
    for (name, value) in variables {
        vars.insert(name, value);
    }
    vars
}

/// Builds and releases child scopes.
///
/// Every scope returned by [`build`](Self::build) during iteration is passed
/// back to [`release`](Self::release) exactly once, after the block that
/// used it returns.
pub trait ScopeBuilder {
    /// Creates a child of `parent` bound to `value` with `variables` injected.
    fn build(
        &self,
        parent: &Rc<Scope>,
        value: Value,
        variables: Vec<(String, Value)>,
    ) -> Rc<Scope>;

    /// Releases a scope produced by [`build`](Self::build).
    fn release(&self, scope: Rc<Scope>);
}

/// The default builder: plain parent-linked scopes, released by dropping.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeScopeBuilder;

impl ScopeBuilder for TreeScopeBuilder {
    fn build(
        &self,
        parent: &Rc<Scope>,
        value: Value,
        variables: Vec<(String, Value)>,
    ) -> Rc<Scope> {
        let scope = Rc::new(Scope::child(parent, value, variables));
        tracing::trace!(depth = scope.depth(), "built scope");
        scope
    }

    fn release(&self, scope: Rc<Scope>) {
        tracing::trace!(depth = scope.depth(), "released scope");
        drop(scope);
    }
}

/// A child scope that is released when the guard goes out of scope.
///
/// The guard only lends the scope out by reference, so nothing can read it
/// after release.
pub struct ScopeGuard<'b> {
    builder: &'b dyn ScopeBuilder,
    parent: Rc<Scope>,
    scope: Rc<Scope>,
}

impl<'b> ScopeGuard<'b> {
    /// Builds a child scope through `builder`.
    pub fn new(
        builder: &'b dyn ScopeBuilder,
        parent: &Rc<Scope>,
        value: Value,
        variables: Vec<(String, Value)>,
    ) -> Self {
        let scope = builder.build(parent, value, variables);
        Self {
            builder,
            parent: Rc::clone(parent),
            scope,
        }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Rc<Scope>;

    fn deref(&self) -> &Rc<Scope> {
        &self.scope
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // The parent stands in for the released scope until the guard is gone.
        let scope = std::mem::replace(&mut self.scope, Rc::clone(&self.parent));
        self.builder.release(scope);
    }
}
