//! The plsqlc compiler library.
//!
//! plsqlc translates a small subset of PL/SQL into a native executable by
//! emitting textual LLVM IR and delegating final code generation to an
//! external C-family compiler driver (`clang`).
//!
//! # Modules
//!
//! - [`token`] - Token types and source location tracking
//! - [`lexer`] - State-function lexer producing into a bounded channel
//! - [`parser`] - State-function parser draining that channel into an AST
//! - [`ast`] - Abstract Syntax Tree definitions
//! - [`codegen`] - Runtime prelude emission and AST lowering via LLVM
//!
//! # Example
//!
//! ```no_run
//! use plsqlc::codegen::Codegen;
//! use plsqlc::lexer::Lexer;
//! use plsqlc::parser::Parser;
//! use inkwell::context::Context;
//!
//! let source = r#"
//! CREATE OR REPLACE PACKAGE BODY MAIN AS
//!   PROCEDURE MAIN IS
//!   BEGIN
//!     DBMS.PRINT('Hello World!');
//!   END;
//! END MAIN;
//! /
//! "#;
//!
//! // Lexing runs on its own thread; the parser drains the token channel.
//! let tokens = Lexer::spawn(source.to_string());
//! let packages = Parser::new(tokens).parse().expect("parse error");
//!
//! // Lowering.
//! let context = Context::create();
//! let mut codegen = Codegen::new(&context, "example");
//! codegen.emit_runtime_prelude().expect("runtime prelude");
//! codegen.compile(&packages).expect("lowering error");
//! codegen.emit_main_bridge().expect("main bridge");
//!
//! // Serialize the textual IR for the external compiler.
//! let ir = codegen.print_ir();
//! std::fs::write("_temp_llvm_.ll", ir).expect("write error");
//! ```

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod token;
