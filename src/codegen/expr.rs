//! Expression lowering.
//!
//! Expressions lower to LLVM values: integers as `i64`, string literals as
//! a *pointer* to a freshly initialized `_runtime._string` struct on the
//! stack, variables as the loaded slot contents. Wherever a string struct
//! is consumed by value (call arguments, comparisons, assignments), a
//! pointer-valued operand is dereferenced one level first.

use inkwell::IntPredicate;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, IntValue};

use crate::ast::{BinOp, Expr, ExprKind, FunctionCall};

use super::Codegen;
use super::binding::{Binding, PlsType};
use super::error::CodegenError;
use super::runtime;

/// The module name that resolves to runtime intrinsics instead of user code.
const RUNTIME_MODULE: &str = "DBMS";

impl<'ctx> Codegen<'ctx> {
    /// Lowers an expression and returns its value.
    pub(super) fn lower_expr(
        &mut self,
        expr: &Expr,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        match expr {
            Expr::NumericLiteral(value) => Ok(self
                .context
                .i64_type()
                .const_int(*value as u64, true)
                .into()),

            Expr::StringLiteral(text) => {
                let slot = self
                    .builder
                    .build_alloca(self.string_type, "str")
                    .map_err(|e| CodegenError::internal("string alloca", e))?;
                self.build_string_init(text, slot)?;
                Ok(slot.into())
            }

            Expr::Variable(name) => {
                let slot = match self.scopes.find(name) {
                    Some(Binding::Slot { ptr, .. }) => *ptr,
                    _ => {
                        return Err(CodegenError::new(format!(
                            "Can't find '{}' in scope",
                            name
                        )));
                    }
                };
                self.builder
                    .build_load(slot, name)
                    .map_err(|e| CodegenError::internal("variable load", e))
            }

            Expr::BinOp(binop) => Ok(self.lower_binop(binop)?.into()),

            Expr::FunctionCall(call) => Err(CodegenError::new(format!(
                "Call to '{}' in expression position is not implemented",
                call.qualified_name()
            ))),
        }
    }

    /// Lowers a binary operation, dispatching on the operator and on the
    /// operand kinds.
    ///
    /// - `>` - signed-greater-than integer compare
    /// - `-` - integer subtract
    /// - `=` - string equality through the runtime when either side is a
    ///   string (a string literal, or a variable bound to a VARCHAR slot),
    ///   integer equality otherwise
    ///
    /// Any other operator is a fatal lowering error.
    pub(super) fn lower_binop(
        &mut self,
        binop: &BinOp,
    ) -> Result<IntValue<'ctx>, CodegenError> {
        match binop.op.as_str() {
            ">" => {
                let left = self.lower_expr(&binop.left)?;
                let right = self.lower_expr(&binop.right)?;
                self.build_int_compare_op(IntPredicate::SGT, left, right, ">")
            }

            "-" => {
                let left = self.lower_expr(&binop.left)?;
                let right = self.lower_expr(&binop.right)?;
                match (left, right) {
                    (BasicValueEnum::IntValue(l), BasicValueEnum::IntValue(r)) => self
                        .builder
                        .build_int_sub(l, r, "sub")
                        .map_err(|e| CodegenError::internal("integer subtract", e)),
                    _ => Err(CodegenError::new(
                        "Operation '-' requires numeric operands",
                    )),
                }
            }

            "=" => {
                if self.is_string_operand(&binop.left) || self.is_string_operand(&binop.right)
                {
                    let left = self.lower_string_value(&binop.left)?;
                    let right = self.lower_string_value(&binop.right)?;
                    let equal_str = self.runtime_function(runtime::EQUAL_STR_NAME)?;
                    let result = self
                        .builder
                        .build_call(equal_str, &[left.into(), right.into()], "streq")
                        .map_err(|e| CodegenError::internal("string equality call", e))?
                        .try_as_basic_value()
                        .basic()
                        .ok_or_else(|| {
                            CodegenError::internal(
                                "string equality call",
                                "no return value",
                            )
                        })?;
                    Ok(result.into_int_value())
                } else {
                    let left = self.lower_expr(&binop.left)?;
                    let right = self.lower_expr(&binop.right)?;
                    self.build_int_compare_op(IntPredicate::EQ, left, right, "=")
                }
            }

            op => Err(CodegenError::new(format!(
                "Operation '{}' hasn't been implemented yet",
                op
            ))),
        }
    }

    /// Returns `true` if the expression is a string by kind tag or, for a
    /// variable, by the type descriptor of its scope binding.
    fn is_string_operand(&self, expr: &Expr) -> bool {
        match expr {
            Expr::StringLiteral(_) => true,
            Expr::Variable(name) => matches!(
                self.scopes.find(name),
                Some(Binding::Slot {
                    ty: PlsType::Varchar,
                    ..
                })
            ),
            _ => false,
        }
    }

    /// Lowers an expression to a runtime string struct *value*,
    /// dereferencing once if the expression lowered to a struct pointer.
    fn lower_string_value(
        &mut self,
        expr: &Expr,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let value = self.lower_expr(expr)?;
        match value {
            BasicValueEnum::PointerValue(ptr) => self
                .builder
                .build_load(ptr, "strval")
                .map_err(|e| CodegenError::internal("string load", e)),
            BasicValueEnum::StructValue(_) => Ok(value),
            _ => Err(CodegenError::new(
                "Operation '=' expected a string operand",
            )),
        }
    }

    /// Lowers a qualified call.
    ///
    /// The module `DBMS` resolves to runtime intrinsics; anything else
    /// resolves through the root scope under its qualified `PKG.NAME`.
    /// String arguments are loaded by one level of indirection before being
    /// passed (the runtime takes strings by value).
    pub(super) fn lower_call(&mut self, call: &FunctionCall) -> Result<(), CodegenError> {
        let callee = if call.module == RUNTIME_MODULE {
            self.resolve_intrinsic(call)?
        } else {
            let name = call.qualified_name();
            match self.scopes.find(&name) {
                Some(Binding::Function(f)) => *f,
                _ => {
                    return Err(CodegenError::new(format!(
                        "Can't find function '{}'",
                        name
                    )));
                }
            }
        };

        if callee.count_params() as usize != call.args.len() {
            return Err(CodegenError::new(format!(
                "Function '{}' expects {} argument(s), but {} were given",
                call.qualified_name(),
                callee.count_params(),
                call.args.len()
            )));
        }

        let mut args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::new();
        for arg in &call.args {
            // String literals lower to a struct pointer; the callee takes
            // the struct by value, so they are dereferenced once here.
            let value = if arg.kind() == ExprKind::Str {
                self.lower_string_value(arg)?
            } else {
                self.lower_expr(arg)?
            };
            args.push(value.into());
        }

        self.builder
            .build_call(callee, &args, "")
            .map_err(|e| CodegenError::internal("call", e))?;
        Ok(())
    }

    /// Resolves a `DBMS.*` call to a runtime function.
    ///
    /// `DBMS.PRINT` dispatches on its single argument: string expressions
    /// print through `printStr`, numeric ones through `printInt`, and
    /// variables through a type probe on their scope binding.
    fn resolve_intrinsic(
        &mut self,
        call: &FunctionCall,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        match call.function.as_str() {
            "PRINT" => {
                if call.args.len() != 1 {
                    return Err(CodegenError::new(format!(
                        "DBMS.PRINT expects exactly 1 argument, but {} were given",
                        call.args.len()
                    )));
                }
                let name = match &call.args[0] {
                    Expr::StringLiteral(_) => runtime::PRINT_STR_NAME,
                    Expr::NumericLiteral(_) => runtime::PRINT_INT_NAME,
                    Expr::Variable(variable) => match self.scopes.find(variable) {
                        Some(Binding::Slot {
                            ty: PlsType::Int, ..
                        }) => runtime::PRINT_INT_NAME,
                        Some(Binding::Slot {
                            ty: PlsType::Varchar,
                            ..
                        }) => runtime::PRINT_STR_NAME,
                        _ => {
                            return Err(CodegenError::new(format!(
                                "Can't find variable '{}' in scope",
                                variable
                            )));
                        }
                    },
                    other => {
                        return Err(CodegenError::new(format!(
                            "Can't dispatch DBMS.PRINT for a {:?} argument",
                            other.kind()
                        )));
                    }
                };
                self.runtime_function(name)
            }
            other => Err(CodegenError::new(format!(
                "Don't recognize runtime function '{}'",
                other
            ))),
        }
    }

    /// Looks up a runtime function emitted by the prelude.
    pub(super) fn runtime_function(
        &self,
        name: &str,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        self.module
            .get_function(name)
            .ok_or_else(|| CodegenError::internal("runtime lookup", format!("'{}' missing", name)))
    }
}
