//! Integration tests for the script runner.
//!
//! These tests parse source code and execute it through the evaluator to verify
//! context binding and delegation end to end.

extern crate protobind;

use pretty_assertions::assert_eq;

use protobind::runner::api::run_script;
use protobind::runner::config::RealmConfig;
use protobind::runner::ds::error::JErrorType;
use protobind::runner::ds::value::JsValue;
use protobind::runner::eval::types::EvalContext;

/// Helper to run code in a fresh context, returning the final value and the console lines.
fn run_js(code: &str) -> Result<(JsValue, Vec<String>), JErrorType> {
    let mut ctx = EvalContext::new();
    let value = run_script(code, &mut ctx)?;
    Ok((value, ctx.take_output()))
}

fn output_of(code: &str) -> Vec<String> {
    run_js(code).unwrap().1
}

fn value_of(code: &str) -> JsValue {
    run_js(code).unwrap().0
}

const PERSON_AND_CHILD: &str = r#"
function Person(name) {
  this.name = name;
}
Person.prototype.speak = function () {
  return 'Hello, my name is ' + this.name;
};

function Child(name) {
  Person.call(this, name);
  this.isChild = true;
}
Child.prototype = Object.create(Person.prototype);
Child.prototype.constructor = Child;

var fred = new Person('Fred');
var pebbles = new Child('Pebbles');
"#;

// ============================================================================
// Global fallback
// ============================================================================

#[test]
fn test_bare_call_logs_global_sentinel() {
    let (value, output) = run_js(
        r#"
        function sayName(name) {
          console.log(this);
          return name;
        }
        sayName("D'Artagnan");
        "#,
    )
    .unwrap();
    assert_eq!(output, vec!["Object [global]".to_string()]);
    assert_eq!(value, JsValue::from("D'Artagnan"));
}

#[test]
fn test_context_writes_from_bare_calls_land_on_global() {
    let (value, _) = run_js(
        "function setIt() { this.leaked = 5; }
         setIt();
         [leaked, globalThis.leaked, global.leaked]",
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "5,5,5");
}

#[test]
fn test_top_level_declarations_are_global_properties() {
    assert_eq!(
        value_of("var a = 1; function f() {} [globalThis.a, typeof globalThis.f]").to_js_string(),
        "1,function"
    );
    assert_eq!(
        value_of("let hidden = 1; typeof globalThis.hidden"),
        JsValue::from("undefined")
    );
}

#[test]
fn test_custom_global_name() {
    let mut ctx = EvalContext::with_config(RealmConfig {
        global_name: "window".to_string(),
        ..RealmConfig::default()
    });
    let value = run_script("window === this && typeof global", &mut ctx).unwrap();
    assert_eq!(value, JsValue::from("undefined"));
}

// ============================================================================
// Receiver binding
// ============================================================================

#[test]
fn test_receiver_call_sees_receiver() {
    let (value, _) = run_js(
        "var fred = { name: 'Fred', speak: function () { return this.name; } };
         var detached = fred.speak;
         [fred.speak(), detached()]",
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "Fred,");
}

#[test]
fn test_method_shorthand_and_chaining() {
    assert_eq!(
        value_of(
            "var counter = { count: 0, inc() { this.count += 1; return this; } };
             counter.inc().inc().count"
        ),
        JsValue::from(2.0)
    );
}

// ============================================================================
// Explicit override
// ============================================================================

#[test]
fn test_call_and_apply_override_receiver() {
    let (value, _) = run_js(
        "var a = { n: 'a', f: function (suffix) { return this.n + (suffix || ''); } };
         var b = { n: 'b' };
         [a.f.call(b), a.f.apply(b, ['!']), a.f()]",
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "b,b!,a");
}

#[test]
fn test_explicit_nullish_context_falls_back_to_global() {
    assert_eq!(
        value_of(
            "function who() { return this; }
             who.call(null) === globalThis && who.call(undefined) === globalThis && who.apply() === globalThis"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_bind_beats_receiver_and_call() {
    let (value, _) = run_js(
        "var a = { n: 'a', f: function () { return this.n; } };
         var b = { n: 'b' };
         var g = a.f.bind(b);
         var c = { n: 'c', g: g };
         [g(), c.g(), g.call(a), g.name]",
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "b,b,b,bound f");
}

#[test]
fn test_bind_prepends_arguments() {
    assert_eq!(
        value_of(
            "function add(a, b) { return a + b; }
             var addTen = add.bind(null, 10);
             addTen(5)"
        ),
        JsValue::from(15.0)
    );
}

#[test]
fn test_apply_rejects_non_array_arguments() {
    assert!(matches!(
        run_js("function f() {} f.apply(null, 5)"),
        Err(JErrorType::TypeError(_))
    ));
}

// ============================================================================
// Lexical callables
// ============================================================================

#[test]
fn test_arrow_context_is_fixed_at_creation() {
    let (value, _) = run_js(
        "var obj = {
           name: 'outer',
           make: function () { return () => this.name; }
         };
         var arrow = obj.make();
         var other = { name: 'other', arrow: arrow };
         [arrow(), other.arrow(), arrow.call(other), arrow.bind(other)()]",
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "outer,outer,outer,outer");
}

#[test]
fn test_arguments_only_in_plain_functions() {
    assert_eq!(
        output_of(
            "function count() { return arguments.length; }
             var topLevelArrow = () => typeof arguments;
             function outer() { var inner = () => arguments.length; return inner(9); }
             console.log(count(1, 2, 3), topLevelArrow(), outer('a', 'b'));"
        ),
        vec!["3 undefined 2".to_string()]
    );
}

// ============================================================================
// Construction and delegation
// ============================================================================

#[test]
fn test_person_and_child() {
    let code = format!(
        "{}
        Child.prototype.play = function () {{ return this.name + ' plays'; }};
        console.log(pebbles.speak());
        console.log(pebbles.isChild);
        console.log(fred.isChild);
        console.log(typeof fred.play);
        console.log(pebbles.play());
        console.log(pebbles instanceof Person, pebbles instanceof Child, fred instanceof Child);
        console.log(fred);
        console.log(pebbles);",
        PERSON_AND_CHILD
    );
    assert_eq!(
        output_of(&code),
        vec![
            "Hello, my name is Pebbles",
            "true",
            "undefined",
            "undefined",
            "Pebbles plays",
            "true true false",
            "Person { name: 'Fred' }",
            "Child { name: 'Pebbles', isChild: true }",
        ]
    );
}

#[test]
fn test_person_and_child_with_attribute_objects() {
    let code = r#"
        function Person(attributes) {
          this.age = attributes.age;
          this.name = attributes.name;
          this.homeTown = attributes.homeTown;
        }
        Person.prototype.speak = function () {
          return `Hello, my name is ${this.name}`;
        };

        function Child(childAttributes) {
          Person.call(this, childAttributes);
          this.isChild = childAttributes.isChild;
        }
        Child.prototype = Object.create(Person.prototype);
        Child.prototype.constructor = Child;

        var fred = new Person({age: 35, name: 'Fred', homeTown: 'Bedrock'});
        var pebbles = new Child({age: 3, name: 'Pebbles', homeTown: 'Bedrock', isChild: true});
        Child.prototype.checkIfChild = function () { return this.isChild; };

        console.log(fred.speak());
        console.log(pebbles.speak());
        console.log(pebbles.age, pebbles.homeTown, pebbles.checkIfChild());
        console.log(`${Object.keys(pebbles)}`);
        console.log(Object.getPrototypeOf(pebbles) === Child.prototype);
        console.log(typeof fred.checkIfChild, fred.isChild);
        console.log(fred);
    "#;
    assert_eq!(
        output_of(code),
        vec![
            "Hello, my name is Fred",
            "Hello, my name is Pebbles",
            "3 Bedrock true",
            "age,name,homeTown,isChild",
            "true",
            "undefined undefined",
            "Person { age: 35, name: 'Fred', homeTown: 'Bedrock' }",
        ]
    );
}

#[test]
fn test_prototype_reads_are_live() {
    let code = format!(
        "{}
        var before = fred.wave;
        Person.prototype.wave = function () {{ return 'bye ' + this.name; }};
        [typeof before, fred.wave(), pebbles.wave()]",
        PERSON_AND_CHILD
    );
    assert_eq!(value_of(&code).to_js_string(), "undefined,bye Fred,bye Pebbles");
}

#[test]
fn test_get_prototype_of_follows_construction() {
    let code = format!(
        "{}
        [Object.getPrototypeOf(pebbles) === Child.prototype,
         Object.getPrototypeOf(fred) === Person.prototype,
         Object.getPrototypeOf(Person.prototype) === Object.prototype,
         Object.getPrototypeOf(Object.prototype)]",
        PERSON_AND_CHILD
    );
    assert_eq!(value_of(&code).to_js_string(), "true,true,true,");
}

#[test]
fn test_writes_shadow_instead_of_mutating_delegate() {
    assert_eq!(
        output_of(
            "var p = { x: 1 };
             var c = Object.create(p);
             c.x = 2;
             console.log(p.x, c.x, c.hasOwnProperty('x'), Object.keys(p).length);"
        ),
        vec!["1 2 true 1".to_string()]
    );
}

#[test]
fn test_constructor_returning_object_replaces_instance() {
    assert_eq!(
        output_of(
            "function Factory() { this.a = 1; return { b: 2 }; }
             function Plain() { this.a = 1; return 5; }
             var f = new Factory();
             var p = new Plain();
             console.log(f.a, f.b, f instanceof Factory, p.a);"
        ),
        vec!["undefined 2 false 1".to_string()]
    );
}

#[test]
fn test_non_object_prototype_falls_back_to_object_prototype() {
    assert_eq!(
        value_of(
            "function Odd() {}
             Odd.prototype = 5;
             Object.getPrototypeOf(new Odd()) === Object.prototype"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_bound_constructor_uses_target_prototype() {
    assert_eq!(
        output_of(
            "function Point(x) { this.x = x; }
             var Bound = Point.bind({ x: 'ignored' }, 7);
             var p = new Bound();
             console.log(p.x, p instanceof Point, p instanceof Bound);"
        ),
        vec!["7 true true".to_string()]
    );
}

#[test]
fn test_object_constructor() {
    assert_eq!(
        value_of(
            "var o = { k: 1 };
             [Object(o) === o, typeof new Object(), Object.keys(new Object()).length]"
        )
        .to_js_string(),
        "true,object,0"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_new_on_non_constructors() {
    let err = run_js("var arrow = () => 1; new arrow();").unwrap_err();
    assert_eq!(err, JErrorType::NotConstructible("arrow".to_string()));
    assert_eq!(err.to_string(), "Uncaught type error: arrow is not a constructor.");

    assert!(matches!(
        run_js("new console.log()"),
        Err(JErrorType::NotConstructible(ref name)) if name == "console.log"
    ));
    assert!(matches!(
        run_js("var n = 1; new n()"),
        Err(JErrorType::NotConstructible(_))
    ));
}

#[test]
fn test_set_prototype_of_rejects_cycles() {
    let mut ctx = EvalContext::new();
    run_script("var a = {}; var b = Object.create(a);", &mut ctx).unwrap();
    assert!(matches!(
        run_script("Object.setPrototypeOf(a, b)", &mut ctx),
        Err(JErrorType::DelegateCycle(_))
    ));
    assert_eq!(
        run_script("Object.getPrototypeOf(a) === Object.prototype", &mut ctx).unwrap(),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_calling_non_function() {
    assert_eq!(
        run_js("var o = {}; o.missing()").unwrap_err(),
        JErrorType::TypeError("o.missing is not a function".to_string())
    );
}

#[test]
fn test_reading_from_undefined() {
    assert_eq!(
        run_js("var u; u.x").unwrap_err(),
        JErrorType::TypeError("Cannot read properties of undefined (reading 'x')".to_string())
    );
}

#[test]
fn test_undeclared_reference() {
    assert_eq!(
        run_js("nothing + 1").unwrap_err(),
        JErrorType::ReferenceError("nothing is not defined".to_string())
    );
    assert_eq!(value_of("typeof nothing"), JsValue::from("undefined"));
}

#[test]
fn test_const_reassignment() {
    assert!(matches!(
        run_js("const k = 1; k = 2;"),
        Err(JErrorType::TypeError(_))
    ));
}

#[test]
fn test_runaway_recursion() {
    let mut ctx = EvalContext::with_config(RealmConfig {
        max_call_depth: 40,
        ..RealmConfig::default()
    });
    assert!(matches!(
        run_script("function r() { return r(); } r()", &mut ctx),
        Err(JErrorType::RangeError(_))
    ));
    assert_eq!(ctx.call_depth(), 0);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_templates_and_compound_assignment() {
    assert_eq!(
        value_of("var s = 'a'; s += 'b'; var n = 10; n -= 4; `${s}${n}!`"),
        JsValue::from("ab6!")
    );
}

#[test]
fn test_console_formatting() {
    assert_eq!(
        output_of(
            "console.log({ name: 'Fred', age: 35 }, function named() {}, () => 1, [1, 'two']);
             console.info(Object.create(null));"
        ),
        vec![
            "{ name: 'Fred', age: 35 } [Function: named] [Function (anonymous)] [ 1, 'two' ]"
                .to_string(),
            "[Object: null prototype] {}".to_string(),
        ]
    );
}

#[test]
fn test_object_to_string_tags() {
    assert_eq!(
        value_of(
            "var ts = Object.prototype.toString;
             [ts.call([]), ts.call({}), ts.call(ts), ts.call(null)]"
        )
        .to_js_string(),
        "[object Array],[object Object],[object Function],[object global]"
    );
}

#[test]
fn test_array_writes_at_extreme_indices() {
    assert_eq!(
        value_of(
            "var a = [];
             a['18446744073709551615'] = 1;
             a[4294967294] = 2;
             a[1] = 'x';
             [a.length, a['18446744073709551615'], a[4294967294], a[1]]"
        )
        .to_js_string(),
        "4294967295,1,2,x"
    );
}

#[test]
fn test_string_index_reads_are_canonical() {
    assert_eq!(
        value_of("['abc'['+1'], 'abc'['1'], 'abc'['01'], 'abc'.length]").to_js_string(),
        ",b,,3"
    );
}

#[test]
fn test_global_names_see_object_prototype() {
    assert_eq!(
        value_of(
            "var x = 1;
             [hasOwnProperty('x'), hasOwnProperty('nope'), typeof toString, toString()]"
        )
        .to_js_string(),
        "true,false,function,[object global]"
    );
    assert_eq!(
        value_of(
            "toString = 5;
             [toString, globalThis.hasOwnProperty('toString'), typeof Object.prototype.toString]"
        )
        .to_js_string(),
        "5,true,function"
    );
}

#[test]
fn test_conditionals_and_equality() {
    assert_eq!(
        value_of(
            "function pick(x) { if (x === 1) { return 'one'; } else if (x == '2') return 'two'; return x > 2 ? 'many' : 'none'; }
             [pick(1), pick(2), pick(5), pick(0), null == undefined, null === undefined]"
        )
        .to_js_string(),
        "one,two,many,none,true,false"
    );
}
