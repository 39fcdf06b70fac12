use indexmap::IndexMap;

use crate::ast::{
    Expr, Function, Instruction, Package, ParamMode, Terminator,
};
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};

/// Lexes and parses a source string.
fn parse(source: &str) -> IndexMap<String, Package> {
    Parser::new(Lexer::spawn(source.to_string()))
        .parse()
        .unwrap_or_else(|e| panic!("parse failed for {:?}: {}", source, e))
}

/// Lexes and parses a source string expected to fail.
fn parse_error(source: &str) -> ParseError {
    match Parser::new(Lexer::spawn(source.to_string())).parse() {
        Ok(_) => panic!("expected parsing to fail for {:?}", source),
        Err(e) => e,
    }
}

/// Wraps a procedure body (with optional locals) into a MAIN package.
fn main_source(locals: &str, body: &str) -> String {
    format!(
        "CREATE OR REPLACE PACKAGE BODY MAIN AS\n\
         PROCEDURE MAIN IS\n{}\nBEGIN\n{}\nEND;\n\
         END MAIN;\n/\n",
        locals, body
    )
}

/// Parses a single-procedure MAIN package and returns the procedure.
fn parse_main(locals: &str, body: &str) -> Function {
    let packages = parse(&main_source(locals, body));
    packages["MAIN"].functions()[0].clone()
}

// ===================
// Package structure
// ===================

#[test]
fn test_package_is_keyed_by_name() {
    let packages = parse(&main_source("", "DBMS.PRINT(1);"));
    assert_eq!(packages.len(), 1);
    assert_eq!(packages["MAIN"].name, "MAIN");
}

#[test]
fn test_package_names_are_case_folded() {
    let source = "create or replace package body narf as\n\
                  procedure main is\nbegin\ndbms.print(1);\nend;\n\
                  end narf;\n/\n";
    let packages = parse(source);
    assert_eq!(packages["NARF"].name, "NARF");
}

#[test]
fn test_two_packages_in_one_source() {
    let source = "\
CREATE OR REPLACE PACKAGE BODY P1 AS
PROCEDURE HELLO IS
BEGIN
  DBMS.PRINT('Hello_from_P1!');
END;
END P1;
/
CREATE OR REPLACE PACKAGE BODY MAIN AS
PROCEDURE MAIN IS
BEGIN
  P1.HELLO();
END;
END MAIN;
/
";
    let packages = parse(source);
    assert_eq!(packages.len(), 2);
    assert!(packages.contains_key("P1"));
    assert!(packages.contains_key("MAIN"));
    // Source order is preserved.
    assert_eq!(packages.keys().collect::<Vec<_>>(), vec!["P1", "MAIN"]);
}

#[test]
fn test_procedures_keep_source_order() {
    let source = "\
CREATE OR REPLACE PACKAGE BODY MAIN AS
PROCEDURE FIRST IS
BEGIN
  DBMS.PRINT(1);
END;
PROCEDURE MAIN IS
BEGIN
  DBMS.PRINT(2);
END;
END MAIN;
/
";
    let packages = parse(source);
    let names: Vec<&str> = packages["MAIN"]
        .functions()
        .iter()
        .map(|f| f.proto.name.as_str())
        .collect();
    assert_eq!(names, vec!["FIRST", "MAIN"]);
}

// ===================
// Parameters and locals
// ===================

#[test]
fn test_no_parens_means_zero_parameters() {
    let function = parse_main("", "DBMS.PRINT(1);");
    assert!(function.proto.params.is_empty());
    assert!(function.is_procedure);
}

#[test]
fn test_parameter_list() {
    let source = "\
CREATE OR REPLACE PACKAGE BODY MAIN AS
PROCEDURE MAIN IS
BEGIN
  DBMS.PRINT(1);
END;
PROCEDURE SHOW(N IN INT, S OUT VARCHAR) IS
BEGIN
  DBMS.PRINT(N);
END;
END MAIN;
/
";
    let packages = parse(source);
    let show = &packages["MAIN"].functions()[1];
    assert_eq!(show.proto.params.len(), 2);
    assert_eq!(show.proto.params[0].name, "N");
    assert_eq!(show.proto.params[0].mode, ParamMode::In);
    assert_eq!(show.proto.params[0].ty, "INT");
    assert_eq!(show.proto.params[1].name, "S");
    assert_eq!(show.proto.params[1].mode, ParamMode::Out);
    assert_eq!(show.proto.params[1].ty, "VARCHAR");
}

#[test]
fn test_bad_ownership_is_fatal() {
    let source = "\
CREATE OR REPLACE PACKAGE BODY MAIN AS
PROCEDURE SHOW(N REF INT) IS
BEGIN
  DBMS.PRINT(N);
END;
END MAIN;
/
";
    let err = parse_error(source);
    assert!(err.message.contains("ownership"));
}

#[test]
fn test_locals_are_parsed() {
    let function = parse_main("li INT := 99;\ns VARCHAR := 'narf';", "DBMS.PRINT(li);");
    assert_eq!(function.locals.len(), 2);
    assert_eq!(function.locals[0].name, "LI");
    assert_eq!(function.locals[0].ty, "INT");
    assert_eq!(function.locals[0].init, "99");
    assert_eq!(function.locals[1].name, "S");
    assert_eq!(function.locals[1].ty, "VARCHAR");
    // The raw initializer text keeps its quotes.
    assert_eq!(function.locals[1].init, "'narf'");
}

// ===================
// Statements
// ===================

#[test]
fn test_qualified_call_statement() {
    let function = parse_main("", "DBMS.PRINT('Hello World!');");
    let entry = &function.blocks[0];
    assert_eq!(entry.instructions.len(), 1);
    match &entry.instructions[0] {
        Instruction::Call(call) => {
            assert_eq!(call.module, "DBMS");
            assert_eq!(call.function, "PRINT");
            assert_eq!(call.args.len(), 1);
            // The quotes are stripped from the literal payload.
            assert_eq!(call.args[0], Expr::StringLiteral("Hello World!".into()));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_local_call_is_qualified_with_package_name() {
    let function = parse_main("", "HELPER();");
    match &function.blocks[0].instructions[0] {
        Instruction::Call(call) => {
            assert_eq!(call.module, "MAIN");
            assert_eq!(call.function, "HELPER");
            assert!(call.args.is_empty());
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_assignment_statement() {
    let function = parse_main("li INT := 5;", "li := li - 1;");
    match &function.blocks[0].instructions[0] {
        Instruction::Assignment(assignment) => {
            assert_eq!(assignment.target, "LI");
            match &assignment.expr {
                Expr::BinOp(binop) => {
                    assert_eq!(binop.op, "-");
                    assert_eq!(binop.left, Expr::Variable("LI".into()));
                    assert_eq!(binop.right, Expr::NumericLiteral(1));
                }
                other => panic!("expected binop, got {:?}", other),
            }
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_call_with_multiple_arguments() {
    let function = parse_main("", "DBMS.PRINT(1, 'two', x);");
    match &function.blocks[0].instructions[0] {
        Instruction::Call(call) => {
            assert_eq!(
                call.args,
                vec![
                    Expr::NumericLiteral(1),
                    Expr::StringLiteral("two".into()),
                    Expr::Variable("X".into()),
                ]
            );
        }
        other => panic!("expected call, got {:?}", other),
    }
}

// ===================
// IF synthesis
// ===================

#[test]
fn test_if_grows_block_count_by_two() {
    let function = parse_main("li INT := 1;", "IF li > 100 THEN DBMS.PRINT(1); END IF;");
    // entry + if-block + merge-block
    assert_eq!(function.blocks.len(), 3);
    assert!(function.blocks[1].name.starts_with("if-block"));
    assert!(function.blocks[2].name.starts_with("merge-block"));
}

#[test]
fn test_if_terminators() {
    let function = parse_main("li INT := 1;", "IF li > 100 THEN DBMS.PRINT(1); END IF;");
    let entry = &function.blocks[0];
    let if_block = &function.blocks[1];
    let merge = &function.blocks[2];

    match &entry.terminator {
        Some(Terminator::CondBranch {
            true_target,
            false_target,
            ..
        }) => {
            assert_eq!(*true_target, if_block.id);
            assert_eq!(*false_target, merge.id);
        }
        other => panic!("expected conditional branch, got {:?}", other),
    }
    // The if-block's terminator is an unconditional branch to the merge.
    assert_eq!(if_block.terminator, Some(Terminator::Branch(merge.id)));
    // The merge block is left open; lowering seals it with a return.
    assert_eq!(merge.terminator, None);
}

#[test]
fn test_if_else_synthesis() {
    let function = parse_main(
        "li INT := 50;",
        "IF li > 100 THEN DBMS.PRINT(100); ELSE DBMS.PRINT(li); END IF;",
    );
    // entry + if-block + else-block + merge-block
    assert_eq!(function.blocks.len(), 4);
    let entry = &function.blocks[0];
    let if_block = &function.blocks[1];
    let else_block = &function.blocks[2];
    let merge = &function.blocks[3];

    match &entry.terminator {
        Some(Terminator::CondBranch {
            true_target,
            false_target,
            ..
        }) => {
            assert_eq!(*true_target, if_block.id);
            assert_eq!(*false_target, else_block.id);
        }
        other => panic!("expected conditional branch, got {:?}", other),
    }
    assert_eq!(if_block.terminator, Some(Terminator::Branch(merge.id)));
    assert_eq!(else_block.terminator, Some(Terminator::Branch(merge.id)));
}

#[test]
fn test_statements_after_if_accumulate_into_merge() {
    let function = parse_main(
        "li INT := 1;",
        "IF li > 100 THEN DBMS.PRINT(1); END IF;\nDBMS.PRINT(2);",
    );
    let merge = &function.blocks[2];
    assert_eq!(merge.instructions.len(), 1);
}

#[test]
fn test_nested_if_keeps_outer_conditional_terminator() {
    let function = parse_main(
        "li INT := 1;",
        "IF li > 100 THEN IF li > 200 THEN DBMS.PRINT(1); END IF; END IF;",
    );
    // The outer block's terminator is the IF's conditional branch, not a
    // subsequent statement's branch.
    let entry = &function.blocks[0];
    match &entry.terminator {
        Some(Terminator::CondBranch { true_target, .. }) => {
            assert_eq!(*true_target, function.blocks[1].id);
        }
        other => panic!("expected conditional branch, got {:?}", other),
    }
    // The inner merge block branches on to the outer merge block.
    let inner_merge = &function.blocks[3];
    let outer_merge = &function.blocks[4];
    assert!(inner_merge.name.starts_with("merge-block"));
    assert_eq!(
        inner_merge.terminator,
        Some(Terminator::Branch(outer_merge.id))
    );
}

// ===================
// WHILE synthesis
// ===================

#[test]
fn test_while_head_and_tail_share_the_conditional_branch() {
    let function = parse_main(
        "li INT := 15;",
        "WHILE li > 10 LOOP DBMS.PRINT(li); li := li - 1; END LOOP;",
    );
    // entry + loop-block + merge-block
    assert_eq!(function.blocks.len(), 3);
    let entry = &function.blocks[0];
    let loop_block = &function.blocks[1];

    // Both terminators are the same conditional branch by value.
    assert!(entry.terminator.is_some());
    assert_eq!(entry.terminator, loop_block.terminator);
    match &entry.terminator {
        Some(Terminator::CondBranch {
            true_target,
            false_target,
            ..
        }) => {
            assert_eq!(*true_target, loop_block.id);
            assert_eq!(*false_target, function.blocks[2].id);
        }
        other => panic!("expected conditional branch, got {:?}", other),
    }
}

// ===================
// Errors
// ===================

#[test]
fn test_missing_then_is_fatal() {
    let err = parse_error(&main_source("", "IF x > 1 DBMS.PRINT(1); END IF;"));
    assert!(err.message.contains("THEN"));
}

#[test]
fn test_missing_loop_is_fatal() {
    let err = parse_error(&main_source("", "WHILE x > 1 DBMS.PRINT(1); END LOOP;"));
    assert!(err.message.contains("LOOP"));
}

#[test]
fn test_missing_semicolon_is_fatal() {
    let err = parse_error(&main_source("", "DBMS.PRINT(1)"));
    assert!(err.message.contains("';'"));
}

#[test]
fn test_wrong_end_name_is_fatal() {
    let err = parse_error(
        "CREATE OR REPLACE PACKAGE BODY MAIN AS\n\
         PROCEDURE MAIN IS\nBEGIN\nDBMS.PRINT(1);\nEND;\nEND OTHER;\n/\n",
    );
    assert!(err.message.contains("'MAIN'"));
}

#[test]
fn test_garbage_at_top_level_is_fatal() {
    let err = parse_error("BANANA");
    assert!(err.message.contains("CREATE"));
}

#[test]
fn test_lexer_error_surfaces_as_parse_error() {
    let err = parse_error(&main_source("", "DBMS.PRINT(@);"));
    assert!(err.message.contains('@'));
}

#[test]
fn test_call_in_expression_position_is_fatal() {
    let err = parse_error(&main_source("li INT := 1;", "li := F(1);"));
    assert!(err.message.contains("not implemented"));
}

#[test]
fn test_else_outside_if_is_fatal() {
    let err = parse_error(&main_source("", "ELSE DBMS.PRINT(1); END;"));
    assert!(err.message.contains("ELSE"));
}

#[test]
fn test_missing_end_is_fatal() {
    let err = parse_error(
        "CREATE OR REPLACE PACKAGE BODY MAIN AS\nPROCEDURE MAIN IS\nBEGIN\nDBMS.PRINT(1);\n",
    );
    assert!(err.message.contains("end of input"));
}

#[test]
fn test_numeric_overflow_is_fatal() {
    let err = parse_error(&main_source(
        "li INT := 1;",
        "li := 99999999999999999999999999;",
    ));
    assert!(err.message.contains("number"));
}
