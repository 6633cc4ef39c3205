//! The `each` helper.
//!
//! `each` repeats a block once per element of a sequence, or once per field
//! of a record, rendering every repetition in a fresh child scope with
//! iteration metadata injected.
//!
//! ## Dispatch
//!
//! The bound value is classified once into a [`Shape`]:
//!
//! | Shape | MiniJinja kinds | Behavior |
//! |-------|-----------------|----------|
//! | `Absent` | `undefined`, `none` | empty output, nothing rendered |
//! | `Sequence` | `seq`, `iterable` | one step per element |
//! | `Record` | everything else | one step per enumerated field |
//!
//! ## Sequences
//!
//! A falsy sequence renders the inverse block once and nothing else. So
//! does a sequence whose traversal yields no element, whatever the
//! falsiness predicate said: lazy iterables of unknown length are only
//! known to be empty once the first element is peeked.
//! Otherwise the sequence is walked in a single forward pass. Whether an
//! element is the last one is found by peeking at the traversal, so lazy
//! one-shot iterators work and are never rewound.
//!
//! ## Records
//!
//! Fields come from the [`FieldEnumerator`](crate::FieldEnumerator) in
//! whatever order it yields them. Records get `@key` and `@first` only:
//! there is no falsiness check, no inverse block, and no `@last` or parity
//! metadata.
//!
//! ## Example
//!
//! ```rust
//! use iterant::{EachHelper, Options, Result, Scope};
//! use minijinja::Value;
//! use std::rc::Rc;
//!
//! let root = Scope::root(Value::UNDEFINED);
//! let mut options = Options::new(root, |scope: &Rc<Scope>| -> Result<String> {
//!     let index_1 = scope.get("@index_1").cloned().unwrap_or_default();
//!     Ok(format!("{}. {}\n", index_1, scope.this()))
//! });
//!
//! let items = Value::from(vec!["apples", "pears"]);
//! let output = EachHelper::new().apply(&items, &mut options).unwrap();
//! assert_eq!(output, "1. apples\n2. pears\n");
//! ```

use minijinja::value::ValueKind;
use minijinja::Value;

use crate::config::EachConfig;
use crate::error::Result;
use crate::options::Options;
use crate::scope::ScopeGuard;

/// Classification of a bound value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'v> {
    /// No value is bound.
    Absent,
    /// An ordered, possibly lazy, single-pass collection.
    Sequence(&'v Value),
    /// Anything else, treated as a set of named fields.
    Record(&'v Value),
}

impl<'v> Shape<'v> {
    /// Classifies `value`.
    pub fn of(value: &'v Value) -> Self {
        match value.kind() {
            ValueKind::Undefined | ValueKind::None => Shape::Absent,
            ValueKind::Seq | ValueKind::Iterable => Shape::Sequence(value),
            _ => Shape::Record(value),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Absent => "absent",
            Shape::Sequence(_) => "sequence",
            Shape::Record(_) => "record",
        }
    }
}

/// Iterates a block over sequences and records.
///
/// The helper holds only immutable configuration and can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct EachHelper {
    config: EachConfig,
}

impl EachHelper {
    /// The name `each` is registered under.
    pub const NAME: &'static str = "each";

    /// Creates a helper with the default variable names and markers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EachConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EachConfig {
        &self.config
    }

    /// Renders the block of `options` once per element or field of `value`.
    pub fn apply(&self, value: &Value, options: &mut Options<'_>) -> Result<String> {
        let shape = Shape::of(value);
        tracing::debug!(shape = shape.name(), kind = ?value.kind(), "each");

        match shape {
            Shape::Absent => Ok(String::new()),
            Shape::Sequence(sequence) => self.render_sequence(sequence, options),
            Shape::Record(record) => self.render_record(record, options),
        }
    }

    /// Renders a sequence value, or the inverse block if it is falsy.
    pub fn render_sequence(&self, sequence: &Value, options: &mut Options<'_>) -> Result<String> {
        if options.is_falsy(sequence) {
            tracing::trace!("falsy sequence, rendering inverse block");
            return options.render_inverse();
        }

        let mut items = sequence.try_iter()?.peekable();
        if items.peek().is_none() {
            tracing::trace!("empty traversal, rendering inverse block");
            return options.render_inverse();
        }
        self.render_items(items, options)
    }

    /// Renders one step per item in a single forward pass.
    ///
    /// No falsiness check is made here; an empty iterator renders nothing.
    pub fn render_items<I>(&self, items: I, options: &mut Options<'_>) -> Result<String>
    where
        I: IntoIterator<Item = Value>,
    {
        let vars = &self.config.vars;
        let markers = &self.config.markers;

        let mut items = items.into_iter().peekable();
        let steps = std::iter::from_fn(move || {
            let element = items.next()?;
            let last = items.peek().is_none();
            Some((element, last))
        });

        steps.enumerate().try_fold(
            String::new(),
            |mut output, (index, (element, last))| -> Result<String> {
                let even = index % 2 == 0;
                tracing::trace!(index, last, "sequence step");

                let metadata = vec![
                    (vars.index.clone(), Value::from(index)),
                    (vars.first.clone(), marker(index == 0, &markers.first)),
                    (vars.last.clone(), marker(last, &markers.last)),
                    (vars.odd.clone(), marker(!even, &markers.odd)),
                    (vars.even.clone(), marker(even, &markers.even)),
                    (vars.index_1.clone(), Value::from(index + 1)),
                ];
                output.push_str(&render_step(options, element, metadata)?);
                Ok(output)
            },
        )
    }

    /// Renders one step per enumerated field of `record`.
    pub fn render_record(&self, record: &Value, options: &mut Options<'_>) -> Result<String> {
        let vars = &self.config.vars;
        let markers = &self.config.markers;
        let fields = options.fields_of(record)?;
        tracing::trace!(fields = fields.len(), "record");

        fields.into_iter().enumerate().try_fold(
            String::new(),
            |mut output, (index, (key, value))| -> Result<String> {
                let metadata = vec![
                    (vars.key.clone(), Value::from(key)),
                    (vars.first.clone(), marker(index == 0, &markers.first)),
                ];
                output.push_str(&render_step(options, value, metadata)?);
                Ok(output)
            },
        )
    }
}

fn marker(holds: bool, marker: &str) -> Value {
    Value::from(if holds { marker } else { "" })
}

/// Builds the step's scope, renders the block in it, and releases it.
fn render_step(
    options: &mut Options<'_>,
    value: Value,
    metadata: Vec<(String, Value)>,
) -> Result<String> {
    let Options {
        scope,
        block,
        scopes,
        ..
    } = options;
    let child = ScopeGuard::new(&**scopes, scope, value, metadata);
    block.render(&child)
}
