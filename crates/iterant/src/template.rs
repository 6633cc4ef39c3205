//! MiniJinja-backed blocks.
//!
//! [`TemplateBlock`] renders a template registered in a MiniJinja
//! [`Environment`] against an iteration scope, so the body of an `each`
//! can be an ordinary template:
//!
//! ```rust
//! use iterant::template::render_each;
//! use minijinja::{Environment, Value};
//!
//! let mut env = Environment::new();
//! env.add_template("row", "{{ index_1 }}. {{ name }}{% if not last %}, {% endif %}")
//!     .unwrap();
//!
//! let people = Value::from_serialize(vec![
//!     std::collections::BTreeMap::from([("name", "Ada")]),
//!     std::collections::BTreeMap::from([("name", "Grace")]),
//! ]);
//!
//! let output = render_each(&env, "row", None, &people).unwrap();
//! assert_eq!(output, "1. Ada, 2. Grace");
//! ```
//!
//! ## Template Context
//!
//! The scope chain is flattened into a single map, nearer scopes shadowing
//! farther ones:
//!
//! - `this`: the scope's current value
//! - fields of any map-valued `this` along the chain, by name
//! - every scope variable, with a leading `@` removed (`@index` → `index`),
//!   since `@` is not valid in a MiniJinja identifier
//!
//! Because variables are applied after fields at each level, `index` or
//! `key` always refer to iteration metadata even when the element has a
//! field of the same name. The field is still reachable as `this.index`.

use minijinja::value::ValueKind;
use minijinja::{Environment, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::each::EachHelper;
use crate::error::Result;
use crate::options::{Block, FieldEnumerator, MapFields, Options};
use crate::scope::Scope;

/// A block backed by a named MiniJinja template.
pub struct TemplateBlock<'e, 's> {
    env: &'e Environment<'s>,
    name: String,
}

impl<'e, 's> TemplateBlock<'e, 's> {
    /// Creates a block that renders the template `name` from `env`.
    ///
    /// The template is looked up on every render, so it may be added to the
    /// environment after the block is created.
    pub fn new(env: &'e Environment<'s>, name: impl Into<String>) -> Self {
        Self {
            env,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Block for TemplateBlock<'_, '_> {
    fn render(&mut self, scope: &Rc<Scope>) -> Result<String> {
        let template = self.env.get_template(&self.name)?;
        Ok(template.render(scope_context(scope)?)?)
    }
}

impl std::fmt::Debug for TemplateBlock<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateBlock")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Flattens a scope chain into a MiniJinja context map.
pub fn scope_context(scope: &Scope) -> Result<BTreeMap<String, Value>> {
    let chain: Vec<&Scope> = scope.ancestors().collect();
    let mut context = BTreeMap::new();

    // Root first, so nearer scopes overwrite.
    for node in chain.into_iter().rev() {
        if node.this().kind() == ValueKind::Map {
            context.extend(MapFields.fields(node.this())?);
        }
        for name in node.local_names() {
            if let Some(value) = node.get_local(name) {
                let bare = name.strip_prefix('@').unwrap_or(name);
                context.insert(bare.to_string(), value.clone());
            }
        }
    }

    context.insert("this".to_string(), scope.this().clone());
    Ok(context)
}

/// Runs `each` over `value` with the `body` template as the block.
///
/// `inverse`, if given, names the template rendered for a falsy sequence.
pub fn render_each(
    env: &Environment<'_>,
    body: &str,
    inverse: Option<&str>,
    value: &Value,
) -> Result<String> {
    let root = Scope::root(Value::UNDEFINED);
    let mut options = Options::new(root, TemplateBlock::new(env, body));
    if let Some(inverse) = inverse {
        options = options.inverse(TemplateBlock::new(env, inverse));
    }
    EachHelper::new().apply(value, &mut options)
}
