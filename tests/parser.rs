use pretty_assertions::assert_eq;

use rox::ast::{Expr, ExprId, Stmt};
use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::parser::Parser;
use rox::scanner::scan_tokens;

fn parser(source: &str) -> Parser {
    let (tokens, errors) = scan_tokens(source);
    assert!(errors.is_empty(), "unexpected lexical errors: {:?}", errors);
    Parser::new(tokens)
}

fn parse(source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
    parser(source).parse()
}

fn printed(source: &str) -> String {
    AstPrinter::print_program(&parse(source).unwrap())
}

fn messages(errors: &[LoxError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

#[test]
fn binary_operators_respect_precedence_and_associativity() {
    assert_eq!(printed("1 - 2 - 3;"), "(; (- (- 1.0 2.0) 3.0))");
    assert_eq!(printed("1 + 2 * 3 < 4 == true;"), "(; (== (< (+ 1.0 (* 2.0 3.0)) 4.0) true))");
    assert_eq!(printed("!!false;"), "(; (! (! false)))");
}

#[test]
fn logical_operators_bind_looser_than_equality() {
    assert_eq!(
        printed("a or b and c == d;"),
        "(; (or a (and b (== c d))))"
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 1;"), "(; (= a (= b 1.0)))");
    assert_eq!(printed("p.x = q.y;"), "(; (= (. p x) (. q y)))");
}

#[test]
fn calls_chain_with_property_access() {
    assert_eq!(
        printed("a.b(1, \"two\")(c).d;"),
        "(; (. (call (call (. a b) 1.0 two) c) d))"
    );
}

#[test]
fn if_else_binds_to_nearest_if() {
    assert_eq!(
        printed("if (a) if (b) print 1; else print 2;"),
        "(if a (if-else b (print 1.0) (print 2.0)))"
    );
}

#[test]
fn function_and_return_declarations() {
    assert_eq!(
        printed("fun add(a, b) { return a + b; } fun nop() { return; }"),
        "(fun add(a b) (return (+ a b)))\n(fun nop() (return))"
    );
}

#[test]
fn for_loop_without_clauses_becomes_bare_while() {
    assert_eq!(printed("for (;;) print 1;"), "(while true (print 1.0))");
}

#[test]
fn for_loop_with_expression_initializer_keeps_block() {
    assert_eq!(
        printed("for (i = 0; i < 2;) print i;"),
        "(block (; (= i 0.0)) (while (< i 2.0) (print i)))"
    );
}

#[test]
fn reports_every_error_after_synchronizing() {
    let errors = parse("print ;\nvar = 1;\nprint 2;").unwrap_err();

    assert_eq!(
        messages(&errors),
        vec![
            "[line 1] Error at ';': Expect expression.",
            "[line 2] Error at '=': Expect variable name.",
        ]
    );
}

#[test]
fn missing_semicolon_is_reported_at_end() {
    let errors = parse("print 1").unwrap_err();

    assert_eq!(messages(&errors), vec!["[line 1] Error at end: Expect ';' after value."]);
}

#[test]
fn invalid_assignment_target_does_not_stop_the_parse() {
    let errors = parse("a + b = c; print ;").unwrap_err();

    assert_eq!(
        messages(&errors),
        vec![
            "[line 1] Error at '=': Invalid assignment target.",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn too_many_arguments_is_reported_once_per_extra_argument() {
    let args = vec!["0"; 256].join(", ");
    let errors = parse(&format!("f({});", args)).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .to_string()
        .ends_with("Error at '0': Can't have more than 255 arguments."));
}

#[test]
fn too_many_parameters_is_reported() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let errors = parse(&format!("fun f({}) {{}}", params.join(", "))).unwrap_err();

    assert_eq!(
        messages(&errors),
        vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
    );
}

#[test]
fn super_requires_a_method_name() {
    let errors = parse("super;").unwrap_err();

    assert_eq!(messages(&errors), vec!["[line 1] Error at ';': Expect '.' after 'super'."]);
}

#[test]
fn repl_accepts_trailing_expression() {
    let (statements, expr) = parser("var a = 1; a + 2").parse_repl().unwrap();

    assert_eq!(statements.len(), 1);
    assert_eq!(expr.as_ref().map(AstPrinter::print).as_deref(), Some("(+ a 2.0)"));
}

#[test]
fn repl_without_trailing_expression() {
    let (statements, expr) = parser("print 1;").parse_repl().unwrap();

    assert_eq!(statements.len(), 1);
    assert!(expr.is_none());
}

#[test]
fn repl_expression_must_reach_end_of_input() {
    let errors = parser("1 2").parse_repl().unwrap_err();

    assert_eq!(messages(&errors), vec!["[line 1] Error at '2': Expect end of expression."]);
}

#[test]
fn repl_reports_the_expression_error() {
    let errors = parser("1 +").parse_repl().unwrap_err();

    assert_eq!(messages(&errors), vec!["[line 1] Error at end: Expect expression."]);
}

#[test]
fn expression_ids_are_unique_and_continue_across_parsers() {
    let mut first = parser("a; b;");
    let statements = first.parse().unwrap();

    let ids: Vec<ExprId> = statements
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let next = first.next_id();
    let expr = parser("c").with_first_id(next).parse_expression().unwrap();

    match expr {
        Expr::Variable { id, .. } => assert!(id.0 >= next),
        other => panic!("expected a variable, got {:?}", other),
    }
}
