//! Scenario tests for the `each` helper, driven through the public API.

use iterant::{
    EachHelper, HelperRegistry, Options, RenderError, Result, Scope, ScopeBuilder,
    TreeScopeBuilder,
};
use minijinja::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ============================================================================
// Test helpers
// ============================================================================

/// Counts builds and releases, and tracks how many scopes are live.
#[derive(Default)]
struct Ledger {
    built: Cell<usize>,
    released: Cell<usize>,
}

impl Ledger {
    fn live(&self) -> usize {
        self.built.get() - self.released.get()
    }
}

struct CountingBuilder<'l>(&'l Ledger);

impl ScopeBuilder for CountingBuilder<'_> {
    fn build(
        &self,
        parent: &Rc<Scope>,
        value: Value,
        variables: Vec<(String, Value)>,
    ) -> Rc<Scope> {
        self.0.built.set(self.0.built.get() + 1);
        TreeScopeBuilder.build(parent, value, variables)
    }

    fn release(&self, scope: Rc<Scope>) {
        self.0.released.set(self.0.released.get() + 1);
        TreeScopeBuilder.release(scope);
    }
}

/// What a block saw on one invocation.
#[derive(Debug, Clone, PartialEq)]
struct Step {
    this: Value,
    index: Option<Value>,
    first: Option<Value>,
    last: Option<Value>,
    odd: Option<Value>,
    even: Option<Value>,
    index_1: Option<Value>,
    key: Option<Value>,
}

impl Step {
    fn capture(scope: &Scope) -> Self {
        let var = |name: &str| scope.get(name).cloned();
        Step {
            this: scope.this().clone(),
            index: var("@index"),
            first: var("@first"),
            last: var("@last"),
            odd: var("@odd"),
            even: var("@even"),
            index_1: var("@index_1"),
            key: var("@key"),
        }
    }
}

fn root() -> Rc<Scope> {
    Scope::root(Value::UNDEFINED)
}

fn some(s: &str) -> Option<Value> {
    Some(Value::from(s))
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn sequence_of_three() {
    let steps = RefCell::new(Vec::new());
    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        steps.borrow_mut().push(Step::capture(scope));
        Ok(String::new())
    });

    EachHelper::new()
        .apply(&Value::from(vec!["a", "b", "c"]), &mut options)
        .unwrap();
    drop(options);

    let steps = steps.into_inner();
    let expected = [
        ("a", 0, "first", "", "", "even", 1),
        ("b", 1, "", "", "odd", "", 2),
        ("c", 2, "", "last", "", "even", 3),
    ];
    assert_eq!(steps.len(), expected.len());
    for (step, (this, index, first, last, odd, even, index_1)) in steps.iter().zip(expected) {
        assert_eq!(step.this, Value::from(this));
        assert_eq!(step.index, Some(Value::from(index)));
        assert_eq!(step.first, some(first));
        assert_eq!(step.last, some(last));
        assert_eq!(step.odd, some(odd));
        assert_eq!(step.even, some(even));
        assert_eq!(step.index_1, Some(Value::from(index_1)));
        assert_eq!(step.key, None);
    }
}

#[test]
fn empty_sequence_renders_inverse_once() {
    let main = Cell::new(0);
    let inverse = Cell::new(0);
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        main.set(main.get() + 1);
        Ok("main".into())
    })
    .inverse(|_: &Rc<Scope>| -> Result<String> {
        inverse.set(inverse.get() + 1);
        Ok("inverse".into())
    });

    let output = EachHelper::new()
        .apply(&Value::from(Vec::<Value>::new()), &mut options)
        .unwrap();

    assert_eq!(output, "inverse");
    assert_eq!(main.get(), 0);
    assert_eq!(inverse.get(), 1);
}

#[test]
fn inverse_sees_the_calling_scope() {
    let root = Scope::root_with(
        Value::from("outer"),
        vec![("title".to_string(), Value::from("Inbox"))],
    );
    let mut options = Options::new(root, |_: &Rc<Scope>| -> Result<String> { Ok(String::new()) })
        .inverse(|scope: &Rc<Scope>| -> Result<String> {
            Ok(format!("{} is empty", scope.get("title").unwrap()))
        });

    let output = EachHelper::new()
        .apply(&Value::from(Vec::<Value>::new()), &mut options)
        .unwrap();
    assert_eq!(output, "Inbox is empty");
}

#[test]
fn lazy_iterator_is_consumed_once() {
    let pulled = Rc::new(Cell::new(0));
    let source = (0..4).map(Value::from);

    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        Ok(format!("{}{} ", scope.this(), scope.get("@last").unwrap()))
    });

    let counter = Rc::clone(&pulled);
    let counted = source.inspect(move |_| counter.set(counter.get() + 1));
    let output = EachHelper::new().render_items(counted, &mut options).unwrap();

    assert_eq!(output, "0 1 2 3last ");
    assert_eq!(pulled.get(), 4);
}

#[test]
fn block_sees_parent_variables() {
    let root = Scope::root_with(
        Value::UNDEFINED,
        vec![("unit".to_string(), Value::from("kg"))],
    );
    let mut options = Options::new(root, |scope: &Rc<Scope>| -> Result<String> {
        Ok(format!("{}{} ", scope.this(), scope.get("unit").unwrap()))
    });

    let output = EachHelper::new()
        .apply(&Value::from(vec![3, 5]), &mut options)
        .unwrap();
    assert_eq!(output, "3kg 5kg ");
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn record_of_two_fields() {
    let steps = RefCell::new(Vec::new());
    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        steps.borrow_mut().push(Step::capture(scope));
        Ok(String::new())
    });

    let record = Value::from_serialize(serde_json::json!({"x": 1, "y": 2}));
    EachHelper::new().apply(&record, &mut options).unwrap();
    drop(options);

    let steps = steps.into_inner();
    assert_eq!(steps.len(), 2);

    assert_eq!(steps[0].key, some("x"));
    assert_eq!(steps[0].first, some("first"));
    assert_eq!(steps[0].this, Value::from(1));

    assert_eq!(steps[1].key, some("y"));
    assert_eq!(steps[1].first, some(""));
    assert_eq!(steps[1].this, Value::from(2));

    for step in &steps {
        assert_eq!(step.last, None);
        assert_eq!(step.odd, None);
        assert_eq!(step.even, None);
        assert_eq!(step.index, None);
        assert_eq!(step.index_1, None);
    }
}

#[test]
fn enumeration_failure_propagates() {
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        Ok("never".into())
    })
    .fields(|_: &Value| -> Result<Vec<(String, Value)>> {
        Err(RenderError::Block("no properties".into()))
    });

    let err = EachHelper::new()
        .apply(&Value::from(1.5), &mut options)
        .unwrap_err();
    assert!(err.to_string().contains("no properties"));
}

// ============================================================================
// Scope lifecycle
// ============================================================================

#[test]
fn every_scope_is_released_before_return() {
    let ledger = Ledger::default();
    let max_live = Cell::new(0);
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        max_live.set(max_live.get().max(ledger.live()));
        Ok(String::new())
    })
    .scope_builder(CountingBuilder(&ledger));

    EachHelper::new()
        .apply(&Value::from(vec![1, 2, 3, 4, 5]), &mut options)
        .unwrap();

    assert_eq!(ledger.built.get(), 5);
    assert_eq!(ledger.released.get(), 5);
    // Each step releases its scope before the next is built.
    assert_eq!(max_live.get(), 1);
}

#[test]
fn failing_step_still_releases_its_scope() {
    let ledger = Ledger::default();
    let calls = Cell::new(0);
    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        calls.set(calls.get() + 1);
        if scope.this() == &Value::from("bad") {
            return Err(RenderError::Block("bad element".into()));
        }
        Ok(String::new())
    })
    .scope_builder(CountingBuilder(&ledger));

    let err = EachHelper::new()
        .apply(&Value::from(vec!["ok", "bad", "unreached"]), &mut options)
        .unwrap_err();

    assert!(matches!(err, RenderError::Block(_)));
    assert_eq!(calls.get(), 2);
    assert_eq!(ledger.built.get(), 2);
    assert_eq!(ledger.released.get(), 2);
}

#[test]
fn falsy_and_absent_build_no_scopes() {
    let ledger = Ledger::default();
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        Ok(String::new())
    })
    .scope_builder(CountingBuilder(&ledger));

    let each = EachHelper::new();
    each.apply(&Value::UNDEFINED, &mut options).unwrap();
    each.apply(&Value::from(()), &mut options).unwrap();
    each.apply(&Value::from(Vec::<Value>::new()), &mut options).unwrap();

    assert_eq!(ledger.built.get(), 0);
    assert_eq!(ledger.released.get(), 0);
}

#[test]
fn record_steps_are_released() {
    let ledger = Ledger::default();
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        Ok(String::new())
    })
    .scope_builder(CountingBuilder(&ledger));

    let record = Value::from_serialize(serde_json::json!({"a": 1, "b": 2, "c": 3}));
    EachHelper::new().apply(&record, &mut options).unwrap();

    assert_eq!(ledger.built.get(), 3);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn failing_record_field_still_releases_its_scope() {
    let ledger = Ledger::default();
    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        if scope.get("@key") == Some(&Value::from("b")) {
            return Err(RenderError::Block("bad field".into()));
        }
        Ok(String::new())
    })
    .scope_builder(CountingBuilder(&ledger));

    let record = Value::from_serialize(serde_json::json!({"a": 1, "b": 2, "c": 3}));
    let err = EachHelper::new().apply(&record, &mut options).unwrap_err();

    assert!(matches!(err, RenderError::Block(_)));
    assert_eq!(ledger.built.get(), 2);
    assert_eq!(ledger.released.get(), 2);
}

#[test]
fn empty_lazy_sequence_renders_inverse_once() {
    let inverse = Cell::new(0);
    let mut options = Options::new(root(), |_: &Rc<Scope>| -> Result<String> {
        Ok("main".into())
    })
    .inverse(|_: &Rc<Scope>| -> Result<String> {
        inverse.set(inverse.get() + 1);
        Ok("<empty>".into())
    });

    let lazy = Value::make_one_shot_iterator(Vec::<Value>::new().into_iter());
    let output = EachHelper::new().apply(&lazy, &mut options).unwrap();
    drop(options);

    assert_eq!(output, "<empty>");
    assert_eq!(inverse.get(), 1);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn each_through_registry() {
    let registry = HelperRegistry::with_builtins();
    let mut options = Options::new(root(), |scope: &Rc<Scope>| -> Result<String> {
        Ok(format!("<{}>", scope.this()))
    });

    let output = registry
        .apply(EachHelper::NAME, &Value::from(vec!["p", "q"]), &mut options)
        .unwrap();
    assert_eq!(output, "<p><q>");
}
