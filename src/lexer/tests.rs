use crate::token::{Token, TokenKind};

use super::Lexer;

/// Lexes `input` on the producer thread and drains the channel.
fn lex(input: &str) -> Vec<Token> {
    Lexer::spawn(input.to_string()).iter().collect()
}

/// Helper returning `(kind, value)` pairs for compact assertions.
fn lex_pairs(input: &str) -> Vec<(TokenKind, String)> {
    lex(input).into_iter().map(|t| (t.kind, t.value)).collect()
}

fn pair(kind: TokenKind, value: &str) -> (TokenKind, String) {
    (kind, value.to_string())
}

// ===================
// Basic tokens
// ===================

#[test]
fn test_empty_input() {
    assert_eq!(lex_pairs(""), vec![pair(TokenKind::Eof, "")]);
}

#[test]
fn test_whitespace_only() {
    assert_eq!(lex_pairs("  \t\r\n "), vec![pair(TokenKind::Eof, "")]);
}

#[test]
fn test_identifier_is_uppercased() {
    assert_eq!(
        lex_pairs("input"),
        vec![pair(TokenKind::Identifier, "INPUT"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_identifier_with_digits_and_underscore() {
    assert_eq!(
        lex_pairs("my_var2"),
        vec![
            pair(TokenKind::Identifier, "MY_VAR2"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_numeric() {
    assert_eq!(
        lex_pairs("9876"),
        vec![pair(TokenKind::Numeric, "9876"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_separators() {
    assert_eq!(
        lex_pairs(";(),/"),
        vec![
            pair(TokenKind::Separator, ";"),
            pair(TokenKind::Separator, "("),
            pair(TokenKind::Separator, ")"),
            pair(TokenKind::Separator, ","),
            pair(TokenKind::Separator, "/"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_single_operators() {
    assert_eq!(
        lex_pairs("> ."),
        vec![
            pair(TokenKind::Operator, ">"),
            pair(TokenKind::Operator, "."),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_assignment_operator_is_greedy() {
    assert_eq!(
        lex_pairs("N := 123;"),
        vec![
            pair(TokenKind::Identifier, "N"),
            pair(TokenKind::Operator, ":="),
            pair(TokenKind::Numeric, "123"),
            pair(TokenKind::Separator, ";"),
            pair(TokenKind::Eof, "")
        ]
    );
}

// ===================
// Keywords
// ===================

#[test]
fn test_keyword_vs_identifier() {
    assert_eq!(
        lex_pairs("BODY MAIN AS "),
        vec![
            pair(TokenKind::Keyword, "BODY"),
            pair(TokenKind::Identifier, "MAIN"),
            pair(TokenKind::Keyword, "AS"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_keywords_fold_to_uppercase() {
    assert_eq!(
        lex_pairs("begin While end"),
        vec![
            pair(TokenKind::Keyword, "BEGIN"),
            pair(TokenKind::Keyword, "WHILE"),
            pair(TokenKind::Keyword, "END"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_type_names_are_identifiers() {
    // INT and VARCHAR are not in the keyword set.
    assert_eq!(
        lex_pairs("li INT"),
        vec![
            pair(TokenKind::Identifier, "LI"),
            pair(TokenKind::Identifier, "INT"),
            pair(TokenKind::Eof, "")
        ]
    );
}

// ===================
// String literals
// ===================

#[test]
fn test_string_retains_quotes() {
    assert_eq!(
        lex_pairs("'input'"),
        vec![pair(TokenKind::Str, "'input'"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_string_with_leading_space() {
    assert_eq!(
        lex_pairs("' 9876'"),
        vec![pair(TokenKind::Str, "' 9876'"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_string_empty() {
    assert_eq!(
        lex_pairs("''"),
        vec![pair(TokenKind::Str, "''"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_string_escaped_quote_continues_scan() {
    assert_eq!(
        lex_pairs("'narf narf\\'narf'"),
        vec![
            pair(TokenKind::Str, "'narf narf\\'narf'"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_string_unterminated_is_error() {
    let tokens = lex("'never ends");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert!(tokens[0].value.contains("Unterminated string"));
}

// ===================
// Comments
// ===================

#[test]
fn test_comment_then_string() {
    assert_eq!(
        lex_pairs("-- narf narf narf \n' 9876'"),
        vec![pair(TokenKind::Str, "' 9876'"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_comment_after_whitespace() {
    assert_eq!(
        lex_pairs("BEGIN\n  -- nothing here\nEND"),
        vec![
            pair(TokenKind::Keyword, "BEGIN"),
            pair(TokenKind::Keyword, "END"),
            pair(TokenKind::Eof, "")
        ]
    );
}

#[test]
fn test_comment_at_end_of_input() {
    assert_eq!(
        lex_pairs("x -- trailing"),
        vec![pair(TokenKind::Identifier, "X"), pair(TokenKind::Eof, "")]
    );
}

#[test]
fn test_consecutive_comments() {
    assert_eq!(
        lex_pairs("-- one\n-- two\nfoo"),
        vec![pair(TokenKind::Identifier, "FOO"), pair(TokenKind::Eof, "")]
    );
}

// ===================
// Errors
// ===================

#[test]
fn test_unrecognized_character_is_fatal() {
    let tokens = lex("abc @ def");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert!(tokens[1].value.contains('@'));
    // Nothing after the error; the channel closes.
    assert_eq!(tokens.len(), 2);
}

// ===================
// Spans and round trips
// ===================

#[test]
fn test_spans_cover_lexemes() {
    let tokens = lex("  foo 'bar'");
    assert_eq!(tokens[0].span.start, 2);
    assert_eq!(tokens[0].span.end, 5);
    assert_eq!(tokens[1].span.start, 6);
    assert_eq!(tokens[1].span.end, 11);
}

#[test]
fn test_identifier_and_keyword_payloads_round_trip() {
    // Lexing the textual payload of an Identifier or Keyword token yields
    // the same kind and value again.
    for t in lex("CREATE narf BEGIN my_proc END") {
        if t.kind == TokenKind::Identifier || t.kind == TokenKind::Keyword {
            let again = lex(&t.value);
            assert_eq!(again[0].kind, t.kind, "round trip of {:?}", t.value);
            assert_eq!(again[0].value, t.value, "round trip of {:?}", t.value);
        }
    }
}

// ===================
// Full programs
// ===================

#[test]
fn test_basic_example_kinds() {
    let source = r#"
  CREATE OR REPLACE PACKAGE BODY MAIN AS

    PROCEDURE MAIN IS
    BEGIN
      DBMS.PRINT('Hello World!');
      DBMS.PRINT(99);
    END;

END MAIN;
/
"#;
    use TokenKind::*;
    let kinds: Vec<TokenKind> = lex(source).into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            // CREATE OR REPLACE PACKAGE BODY MAIN AS
            Keyword, Keyword, Keyword, Keyword, Keyword, Identifier, Keyword,
            // PROCEDURE MAIN IS
            Keyword, Identifier, Keyword,
            // BEGIN
            Keyword,
            // DBMS.PRINT('Hello World!');
            Identifier, Operator, Identifier, Separator, Str, Separator, Separator,
            // DBMS.PRINT(99);
            Identifier, Operator, Identifier, Separator, Numeric, Separator, Separator,
            // END;
            Keyword, Separator,
            // END MAIN;
            Keyword, Identifier, Separator,
            // /
            Separator, Eof,
        ]
    );
}

#[test]
fn test_locals_example_kinds() {
    let source = r#"
	CREATE OR REPLACE PACKAGE BODY main AS

	    PROCEDURE main IS
	      li INT := 99;
	    BEGIN
	      dbms.print(li);
	    END;

	END main;
	/
"#;
    use TokenKind::*;
    let kinds: Vec<TokenKind> = lex(source).into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Keyword, Keyword, Keyword, Keyword, Keyword, Identifier, Keyword,
            // PROCEDURE main IS
            Keyword, Identifier, Keyword,
            // li INT := 99;
            Identifier, Identifier, Operator, Numeric, Separator,
            // BEGIN
            Keyword,
            // dbms.print(li);
            Identifier, Operator, Identifier, Separator, Identifier, Separator, Separator,
            // END;
            Keyword, Separator,
            // END main;
            Keyword, Identifier, Separator,
            // /
            Separator, Eof,
        ]
    );
}
