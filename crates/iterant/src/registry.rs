//! Named helper registration.
//!
//! The surrounding renderer looks helpers up by name. [`HelperRegistry`]
//! stores them as `Rc<dyn Helper>`, so the registry is cheap to clone and
//! the helpers themselves stay immutable.
//!
//! # Example
//!
//! ```rust
//! use iterant::{HelperRegistry, Options, Result, Scope};
//! use minijinja::Value;
//! use std::rc::Rc;
//!
//! let registry = HelperRegistry::with_builtins();
//!
//! let root = Scope::root(Value::UNDEFINED);
//! let mut options = Options::new(root, |scope: &Rc<Scope>| -> Result<String> {
//!     Ok(scope.this().to_string())
//! });
//!
//! let output = registry
//!     .apply("each", &Value::from(vec![1, 2, 3]), &mut options)
//!     .unwrap();
//! assert_eq!(output, "123");
//! ```

use minijinja::Value;
use std::collections::HashMap;
use std::rc::Rc;

use crate::each::EachHelper;
use crate::error::{RenderError, Result};
use crate::options::Options;

/// A block helper callable by name from a template.
pub trait Helper {
    /// Applies the helper to the bound `value`.
    fn apply(&self, value: &Value, options: &mut Options<'_>) -> Result<String>;
}

/// Blanket implementation for closures.
impl<F> Helper for F
where
    F: Fn(&Value, &mut Options<'_>) -> Result<String>,
{
    fn apply(&self, value: &Value, options: &mut Options<'_>) -> Result<String> {
        (self)(value, options)
    }
}

impl Helper for EachHelper {
    fn apply(&self, value: &Value, options: &mut Options<'_>) -> Result<String> {
        EachHelper::apply(self, value, options)
    }
}

/// Storage for named helpers.
#[derive(Default, Clone)]
pub struct HelperRegistry {
    helpers: HashMap<String, Rc<dyn Helper>>,
}

impl HelperRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `each` registered under [`EachHelper::NAME`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EachHelper::NAME, EachHelper::new());
        registry
    }

    /// Registers a helper, replacing any helper with the same name.
    pub fn register<H: Helper + 'static>(&mut self, name: impl Into<String>, helper: H) {
        self.helpers.insert(name.into(), Rc::new(helper));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Helper>> {
        self.helpers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Applies the helper registered under `name`.
    pub fn apply(&self, name: &str, value: &Value, options: &mut Options<'_>) -> Result<String> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| RenderError::HelperNotFound(name.to_string()))?;
        helper.apply(value, options)
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Names of all registered helpers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(|s| s.as_str())
    }
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}
