//! Lowered types and scope bindings.
//!
//! This module defines [`PlsType`], the two source types the compiler
//! lowers, and [`Binding`], the values a scope entry can hold.

use inkwell::values::{FunctionValue, PointerValue};

use super::error::CodegenError;

/// The PL/SQL types this compiler lowers.
///
/// `INT` maps to a signed 64-bit integer, `VARCHAR` to the runtime string
/// struct (`_runtime._string`). The type descriptor is kept on every
/// variable slot so `DBMS.PRINT` and string comparisons can dispatch on the
/// bound variable's type, not just on the syntactic kind of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlsType {
    Int,
    Varchar,
}

impl PlsType {
    /// Parses an upper-cased source type name.
    pub fn parse(ty: &str) -> Result<Self, CodegenError> {
        match ty {
            "INT" => Ok(PlsType::Int),
            "VARCHAR" => Ok(PlsType::Varchar),
            _ => Err(CodegenError::new(format!("Can't find type '{}'", ty))),
        }
    }
}

impl std::fmt::Display for PlsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlsType::Int => write!(f, "INT"),
            PlsType::Varchar => write!(f, "VARCHAR"),
        }
    }
}

/// A value bound to a name in the scope chain.
///
/// The root scope holds function bindings (created during prototype
/// emission); nested scopes hold variable slots for parameters and locals.
#[derive(Debug, Clone, Copy)]
pub(super) enum Binding<'ctx> {
    /// A lowered procedure, bound under its qualified `PKG.NAME`.
    Function(FunctionValue<'ctx>),
    /// A stack slot for a parameter or local, with its type descriptor.
    Slot {
        ptr: PointerValue<'ctx>,
        ty: PlsType,
    },
}
