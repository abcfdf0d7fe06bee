use pretty_assertions::assert_eq;

use rox::error::{RunError, EX_DATAERR, EX_SOFTWARE};
use rox::output::Output;
use rox::value::Value;
use rox::Lox;

fn lox() -> Lox {
    Lox::with_output(Output::buffer())
}

/// Runs `source` and returns everything it printed.
fn run(source: &str) -> String {
    let mut lox = lox();
    if let Err(e) = lox.run(source) {
        panic!("unexpected failure: {}\noutput so far:\n{}", e, lox.output().captured());
    }
    lox.output().captured().to_string()
}

/// Runs `source`, expecting a failure; returns the printed output and error.
fn run_err(source: &str) -> (String, RunError) {
    let mut lox = lox();
    let err = lox.run(source).unwrap_err();
    (lox.output().captured().to_string(), err)
}

#[test]
fn arithmetic_and_number_formatting() {
    assert_eq!(
        run("print 1 + 2 * 3; print 7 / 2; print -(4 - 6); print 10 / 4 * 2;"),
        "7\n3.5\n2\n5\n"
    );
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(run("print 1 / 0; print -1 / 0; print 0 / 0;"), "Infinity\n-Infinity\nNaN\n");
}

#[test]
fn string_concatenation_and_equality() {
    assert_eq!(
        run("var a = \"foo\"; print a + \"bar\"; print a == \"foo\"; print \"1\" == 1; print nil == nil;"),
        "foobar\ntrue\nfalse\ntrue\n"
    );
}

#[test]
fn mixed_addition_is_a_runtime_error() {
    let (output, err) = run_err("print \"before\";\nprint \"a\" + 1;\nprint \"after\";");

    assert_eq!(output, "before\n");
    assert_eq!(
        err.to_string(),
        "Operands must be two numbers or two strings.\n[line 2]"
    );
    assert_eq!(err.exit_code(), EX_SOFTWARE);
}

#[test]
fn comparison_requires_numbers() {
    let (_, err) = run_err("print 1 < \"2\";");
    assert_eq!(err.to_string(), "Operands must be numbers.\n[line 1]");

    let (_, err) = run_err("print -true;");
    assert_eq!(err.to_string(), "Operand must be a number.\n[line 1]");
}

#[test]
fn only_nil_and_false_are_falsey() {
    assert_eq!(
        run("print !nil; print !false; print !0; print !\"\"; if (0) print \"zero is true\";"),
        "true\ntrue\nfalse\nfalse\nzero is true\n"
    );
}

#[test]
fn logical_operators_short_circuit_and_return_operands() {
    assert_eq!(
        run(
            "print nil or \"yes\"; print 0 and 2; print false and undefined; print 1 or undefined;"
        ),
        "yes\n2\nfalse\n1\n"
    );
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let (_, err) = run_err("print ghost;");
    assert_eq!(err.to_string(), "Undefined variable 'ghost'.\n[line 1]");

    let (_, err) = run_err("ghost = 1;");
    assert_eq!(err.to_string(), "Undefined variable 'ghost'.\n[line 1]");
}

#[test]
fn uninitialized_variable_is_nil() {
    assert_eq!(run("var a; print a;"), "nil\n");
}

#[test]
fn blocks_shadow_and_restore() {
    assert_eq!(
        run("var a = \"outer\"; { var a = \"inner\"; print a; } print a;"),
        "inner\nouter\n"
    );
}

#[test]
fn environment_is_restored_after_runtime_error_in_block() {
    let mut lox = lox();
    assert!(lox.run("var a = \"global\"; { var a = \"local\"; print nil + 1; }").is_err());

    lox.run("print a;").unwrap();
    assert_eq!(lox.output().captured(), "global\n");
}

#[test]
fn while_and_for_loops() {
    assert_eq!(
        run("var i = 0; while (i < 3) { print i; i = i + 1; } for (var j = 0; j < 2; j = j + 1) print j;"),
        "0\n1\n2\n0\n1\n"
    );
}

#[test]
fn for_loop_variable_is_scoped_to_the_loop() {
    let (output, err) = run_err("for (var i = 0; i < 1; i = i + 1) {} print i;");

    assert_eq!(output, "");
    assert_eq!(err.to_string(), "Undefined variable 'i'.\n[line 1]");
}

#[test]
fn closures_capture_their_environment() {
    let source = r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                print i;
            }
            return count;
        }

        var counter = makeCounter();
        counter();
        counter();
    "#;

    assert_eq!(run(source), "1\n2\n");
}

#[test]
fn resolution_is_lexical_not_dynamic() {
    let source = r#"
        var a = "global";
        {
            fun showA() {
                print a;
            }

            showA();
            var a = "block";
            showA();
        }
    "#;

    assert_eq!(run(source), "global\nglobal\n");
}

#[test]
fn recursion_and_return_values() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
    "#;

    assert_eq!(run(source), "55\n");
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(run("fun f() {} print f();"), "nil\n");
}

#[test]
fn callables_display_their_kind() {
    assert_eq!(
        run("fun f() {} class C {} print f; print clock; print C; print C();"),
        "<fn f>\n<native fn>\nC\nC instance\n"
    );
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(run("print clock() > 0;"), "true\n");
}

#[test]
fn arity_is_checked() {
    let (_, err) = run_err("fun f(a, b) {}\nf(1);");
    assert_eq!(err.to_string(), "Expected 2 arguments but got 1.\n[line 2]");
}

#[test]
fn only_functions_and_classes_are_callable() {
    let (_, err) = run_err("\"str\"();");
    assert_eq!(err.to_string(), "Can only call functions and classes.\n[line 1]");
}

#[test]
fn classes_fields_and_methods() {
    let source = r#"
        class Point {
            init(x, y) {
                this.x = x;
                this.y = y;
            }

            sum() {
                return this.x + this.y;
            }
        }

        var p = Point(1, 2);
        print p.sum();
        p.x = 10;
        print p.sum();

        var m = p.sum;
        print m();
    "#;

    assert_eq!(run(source), "3\n12\n12\n");
}

#[test]
fn fields_shadow_methods() {
    assert_eq!(
        run("class A { f() { return \"method\"; } } var a = A(); a.f = \"field\"; print a.f;"),
        "field\n"
    );
}

#[test]
fn initializer_returns_this() {
    let source = r#"
        class Foo {
            init() {
                this.n = 1;
                return;
            }
        }

        var foo = Foo();
        print foo.init() == foo;
        print foo.n;
    "#;

    assert_eq!(run(source), "true\n1\n");
}

#[test]
fn inheritance_and_super_calls() {
    let source = r#"
        class Doughnut {
            cook() {
                print "Fry until golden brown.";
            }
        }

        class BostonCream < Doughnut {
            cook() {
                super.cook();
                print "Pipe full of custard and coat with chocolate.";
            }
        }

        BostonCream().cook();
    "#;

    assert_eq!(
        run(source),
        "Fry until golden brown.\nPipe full of custard and coat with chocolate.\n"
    );
}

#[test]
fn super_binds_to_the_declaring_class() {
    let source = r#"
        class A {
            method() { print "A method"; }
        }

        class B < A {
            method() { print "B method"; }
            test() { super.method(); }
        }

        class C < B {}

        C().test();
    "#;

    assert_eq!(run(source), "A method\n");
}

#[test]
fn inherited_initializer_sets_arity() {
    let source = r#"
        class A { init(v) { this.v = v; } }
        class B < A {}
        print B(7).v;
    "#;

    assert_eq!(run(source), "7\n");
}

#[test]
fn property_errors() {
    let (_, err) = run_err("class A {} print A().missing;");
    assert_eq!(err.to_string(), "Undefined property 'missing'.\n[line 1]");

    let (_, err) = run_err("print 1 .x;");
    assert_eq!(err.to_string(), "Only instances have properties.\n[line 1]");

    let (_, err) = run_err("var s = \"s\"; s.x = 1;");
    assert_eq!(err.to_string(), "Only instances have fields.\n[line 1]");
}

#[test]
fn superclass_must_be_a_class() {
    let (_, err) = run_err("var NotAClass = 1; class B < NotAClass {}");
    assert_eq!(err.to_string(), "Superclass must be a class.\n[line 1]");
}

#[test]
fn instances_and_functions_compare_by_identity() {
    assert_eq!(
        run("class A {} var a = A(); var b = A(); print a == a; print a == b; fun f() {} print f == f;"),
        "true\nfalse\ntrue\n"
    );
}

#[test]
fn static_errors_withhold_execution() {
    let (output, err) = run_err("print \"never\";\nprint ;\nreturn 1;");

    assert_eq!(output, "");
    assert_eq!(err.exit_code(), EX_DATAERR);
    assert_eq!(
        err.to_string(),
        "[line 2] Error at ';': Expect expression."
    );
}

#[test]
fn resolver_errors_are_all_reported() {
    let (output, err) = run_err("print \"never\";\nreturn 1;\n{ var a = a; }");

    assert_eq!(output, "");
    assert_eq!(
        err.to_string(),
        "[line 2] Error at 'return': Can't return from top-level code.\n\
         [line 3] Error at 'a': Can't read local variable in its own initializer."
    );
}

#[test]
fn lexical_errors_come_before_parse_errors() {
    let (_, err) = run_err("print @;");

    assert_eq!(err.exit_code(), EX_DATAERR);
    assert_eq!(
        err.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn evaluate_returns_the_value() {
    let mut lox = lox();

    assert_eq!(lox.evaluate("(1 + 2) * 3").unwrap(), Value::Number(9.0));
    assert_eq!(lox.evaluate("\"a\" + \"b\"").unwrap().to_string(), "ab");
    assert_eq!(lox.evaluate("1 + nil").unwrap_err().exit_code(), EX_SOFTWARE);
}

#[test]
fn repl_echoes_expressions_and_keeps_state() {
    let mut lox = lox();

    lox.run_prompt("var a = 1;").unwrap();
    lox.run_prompt("a + 1").unwrap();
    lox.run_prompt("fun inc() { a = a + 1; return a; }").unwrap();
    lox.run_prompt("inc()").unwrap();
    lox.run_prompt("print inc();").unwrap();

    assert_eq!(lox.output().captured(), "2\n2\n3\n");
}

#[test]
fn repl_closures_survive_across_lines() {
    let mut lox = lox();

    lox.run_prompt("fun make() { var n = 0; fun next() { n = n + 1; return n; } return next; }")
        .unwrap();
    lox.run_prompt("var next = make();").unwrap();
    lox.run_prompt("next();").unwrap();
    lox.run_prompt("{ var shadow = 5; print next() + shadow; }").unwrap();

    assert_eq!(lox.output().captured(), "7\n");
}

#[test]
fn repl_recovers_after_errors() {
    let mut lox = lox();

    assert!(lox.run_prompt("var x = ;").is_err());
    assert!(lox.run_prompt("undefinedThing").is_err());
    lox.run_prompt("var x = 3;").unwrap();
    lox.run_prompt("x * 2").unwrap();

    assert_eq!(lox.output().captured(), "6\n");
}
