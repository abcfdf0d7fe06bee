use pretty_assertions::assert_eq;

use rox::ast::Stmt;
use rox::error::LoxError;
use rox::parser::Parser;
use rox::resolver::{Locals, Resolver};
use rox::scanner::scan_tokens;

fn program(source: &str) -> Vec<Stmt> {
    let (tokens, errors) = scan_tokens(source);
    assert!(errors.is_empty(), "unexpected lexical errors: {:?}", errors);
    Parser::new(tokens).parse().unwrap()
}

fn resolve(source: &str) -> Result<Locals, Vec<LoxError>> {
    let statements = program(source);
    Resolver::new().resolve(&statements)
}

fn errors(source: &str) -> Vec<String> {
    resolve(source)
        .unwrap_err()
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn distances(source: &str) -> Vec<usize> {
    let mut distances: Vec<usize> = resolve(source).unwrap().into_values().collect();
    distances.sort_unstable();
    distances
}

#[test]
fn globals_are_left_out_of_the_table() {
    assert_eq!(distances("var g = 1; print g; g = 2;"), Vec::<usize>::new());
}

#[test]
fn block_locals_record_scope_distance() {
    assert_eq!(distances("{ var a = 1; { print a; } }"), vec![1]);
    assert_eq!(distances("{ var a = 1; a = 2; }"), vec![0]);
}

#[test]
fn closures_see_enclosing_parameters() {
    assert_eq!(distances("fun f(x) { fun g() { return x; } }"), vec![1]);
}

#[test]
fn innermost_declaration_wins() {
    assert_eq!(distances("{ var a = 1; { var a = 2; print a; } }"), vec![0]);
}

#[test]
fn super_and_this_live_outside_the_method_scope() {
    assert_eq!(
        distances("class A { m() {} } class B < A { m() { super.m(); return this; } }"),
        vec![1, 2]
    );
}

#[test]
fn global_self_reference_in_initializer_is_allowed() {
    assert!(resolve("var a = a;").is_ok());
}

#[test]
fn local_self_reference_in_initializer_is_an_error() {
    assert_eq!(
        errors("{ var a = a; }"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn redeclaring_a_local_is_an_error() {
    assert_eq!(
        errors("{ var a = 1; var a = 2; }"),
        vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
    assert_eq!(
        errors("fun f(a, a) {}"),
        vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn redeclaring_a_global_is_allowed() {
    assert!(resolve("var a = 1; var a = 2;").is_ok());
}

#[test]
fn return_rules() {
    assert_eq!(
        errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
    assert_eq!(
        errors("class A { init() { return 1; } }"),
        vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
    );
    assert!(resolve("class A { init() { return; } }").is_ok());
    assert!(resolve("fun f() { return 1; }").is_ok());
}

#[test]
fn this_outside_a_class_is_an_error() {
    assert_eq!(
        errors("print this;"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
    assert_eq!(
        errors("fun f() { return this; }"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
}

#[test]
fn class_cannot_inherit_from_itself() {
    assert_eq!(
        errors("class A < A {}"),
        vec!["[line 1] Error at 'A': A class can't inherit from itself."]
    );
}

#[test]
fn super_misuse_is_an_error() {
    assert_eq!(
        errors("super.f();"),
        vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
    );
    assert_eq!(
        errors("class A { f() { super.f(); } }"),
        vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn every_error_is_reported_in_one_pass() {
    assert_eq!(
        errors("return 1;\nprint this;\n{ var b = b; }"),
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'b': Can't read local variable in its own initializer.",
        ]
    );
}
