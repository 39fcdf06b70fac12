//! Packages: the top-level grouping of procedures.

use super::function::Function;

/// Name of the entry procedure the driver requires.
const MAIN_NAME: &str = "MAIN";

/// A PL/SQL package body: a named, ordered sequence of procedures.
///
/// Created on `CREATE OR REPLACE PACKAGE BODY <name> AS` and sealed on the
/// matching `END <name>; /`.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    functions: Vec<Function>,
}

impl Package {
    /// Creates an empty package with the given (upper-cased) name.
    pub fn new(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Appends a procedure, preserving source order.
    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// The procedures of this package in source order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Returns `true` if this package declares a `MAIN` procedure.
    pub fn has_main_function(&self) -> bool {
        self.functions.iter().any(|f| f.proto.name == MAIN_NAME)
    }
}
