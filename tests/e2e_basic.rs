//! End-to-end tests for basic printing and locals.

mod common;

use common::compile_and_run;

#[test]
fn test_print_string_and_number() {
    let output = compile_and_run(
        r#"
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
  BEGIN
    DBMS.PRINT('Hello World!');
    DBMS.PRINT(99);
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "Hello World!\n99\n");
}

#[test]
fn test_int_local_prints_its_value() {
    let output = compile_and_run(
        r#"
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
    li INT := 99;
  BEGIN
    DBMS.PRINT(li);
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "99\n");
}

#[test]
fn test_varchar_local_prints_its_value() {
    let output = compile_and_run(
        r#"
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
    s VARCHAR := 'narf';
  BEGIN
    DBMS.PRINT(s);
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "narf\n");
}

#[test]
fn test_negative_number_prints_sign() {
    let output = compile_and_run(
        r#"
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
    li INT := 5;
  BEGIN
    li := li - 12;
    DBMS.PRINT(li);
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "-7\n");
}

#[test]
fn test_assignment_overwrites_local() {
    let output = compile_and_run(
        r#"
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
    li INT := 1;
  BEGIN
    li := 42;
    DBMS.PRINT(li);
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "42\n");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let output = compile_and_run(
        r#"
create or replace package body main as

  procedure main is
    li int := 7;
  begin
    dbms.print(li);
  end;

end main;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "7\n");
}

#[test]
fn test_comments_do_not_affect_output() {
    let output = compile_and_run(
        r#"
-- leading comment
CREATE OR REPLACE PACKAGE BODY MAIN AS

  PROCEDURE MAIN IS
  BEGIN
    -- prints a greeting
    DBMS.PRINT('hi'); -- trailing comment
  END;

END MAIN;
/
"#,
    )
    .unwrap();
    assert_eq!(output, "hi\n");
}
