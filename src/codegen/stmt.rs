//! Block, local, instruction and terminator lowering.

use inkwell::IntPredicate;
use inkwell::values::BasicValueEnum;

use crate::ast::{Assignment, Block, FunctionLocal, Instruction, Terminator};

use super::Codegen;
use super::binding::{Binding, PlsType};
use super::error::CodegenError;

impl<'ctx> Codegen<'ctx> {
    /// Lowers one AST block into its mapped IR block.
    ///
    /// Instructions are lowered in order, then the terminator. A block the
    /// parser left without a terminator receives an implicit `ret void`
    /// (procedures return no value), with a warning - this is how the final
    /// block of a procedure body usually ends.
    pub(super) fn lower_block(&mut self, block: &Block) -> Result<(), CodegenError> {
        let ir_block = self.block(block.id)?;
        self.current_block = Some(ir_block);
        self.builder.position_at_end(ir_block);

        for instruction in &block.instructions {
            self.lower_instruction(instruction)?;
        }

        match &block.terminator {
            Some(terminator) => self.lower_terminator(terminator)?,
            None => {
                if !self.current_block_terminated() {
                    log::warn!(
                        "Block '{}' has no terminator! Filled in empty return.",
                        block.name
                    );
                    self.builder
                        .build_return(None)
                        .map_err(|e| CodegenError::internal("implicit return", e))?;
                }
            }
        }

        if !self.current_block_terminated() {
            return Err(CodegenError::new(format!(
                "Block '{}' still has no terminator after lowering",
                block.name
            )));
        }
        Ok(())
    }

    /// Returns `true` if the block currently being lowered has a terminator.
    fn current_block_terminated(&self) -> bool {
        self.current_block
            .and_then(|bb| bb.get_terminator())
            .is_some()
    }

    /// Lowers a local declaration into a typed stack slot in the synthetic
    /// locals block and binds it in the current scope.
    ///
    /// INT locals with a non-empty initializer parse it as a signed 64-bit
    /// integer and store it. VARCHAR initializers have their outer quotes
    /// stripped (escape sequences are not processed) and initialize the
    /// slot in place.
    pub(super) fn lower_local(&mut self, local: &FunctionLocal) -> Result<(), CodegenError> {
        let ty = PlsType::parse(&local.ty)?;
        match ty {
            PlsType::Int => {
                let slot = self
                    .builder
                    .build_alloca(self.context.i64_type(), &local.name)
                    .map_err(|e| CodegenError::internal("local alloca", e))?;
                if !local.init.is_empty() {
                    let value: i64 = local.init.parse().map_err(|_| {
                        CodegenError::new(format!(
                            "Can't convert '{}' into a number",
                            local.init
                        ))
                    })?;
                    let init = self.context.i64_type().const_int(value as u64, true);
                    self.builder
                        .build_store(slot, init)
                        .map_err(|e| CodegenError::internal("local store", e))?;
                }
                self.scopes.add(local.name.clone(), Binding::Slot { ptr: slot, ty });
            }
            PlsType::Varchar => {
                let slot = self
                    .builder
                    .build_alloca(self.string_type, &local.name)
                    .map_err(|e| CodegenError::internal("local alloca", e))?;
                let text = local
                    .init
                    .strip_prefix('\'')
                    .and_then(|v| v.strip_suffix('\''))
                    .unwrap_or(&local.init);
                self.build_string_init(text, slot)?;
                self.scopes.add(local.name.clone(), Binding::Slot { ptr: slot, ty });
            }
        }
        Ok(())
    }

    /// Lowers a straight-line instruction.
    fn lower_instruction(&mut self, instruction: &Instruction) -> Result<(), CodegenError> {
        match instruction {
            Instruction::Assignment(assignment) => self.lower_assignment(assignment),
            Instruction::Call(call) => {
                self.lower_call(call)?;
                Ok(())
            }
        }
    }

    /// Lowers `target := expr`: look up the slot, lower the right-hand
    /// side, store it.
    ///
    /// A string-literal right-hand side lowers to a pointer to the runtime
    /// string struct; it is dereferenced once so the struct value lands in
    /// the slot.
    fn lower_assignment(&mut self, assignment: &Assignment) -> Result<(), CodegenError> {
        let (slot, ty) = match self.scopes.find(&assignment.target) {
            Some(Binding::Slot { ptr, ty }) => (*ptr, *ty),
            _ => {
                return Err(CodegenError::new(format!(
                    "Can't find '{}' in scope",
                    assignment.target
                )));
            }
        };

        let mut value = self.lower_expr(&assignment.expr)?;
        if ty == PlsType::Varchar {
            if let BasicValueEnum::PointerValue(ptr) = value {
                value = self
                    .builder
                    .build_load(ptr, "strval")
                    .map_err(|e| CodegenError::internal("string load", e))?;
            }
        }

        self.builder
            .build_store(slot, value)
            .map_err(|e| CodegenError::internal("assignment store", e))?;
        Ok(())
    }

    /// Lowers a block terminator.
    fn lower_terminator(&mut self, terminator: &Terminator) -> Result<(), CodegenError> {
        match terminator {
            Terminator::Branch(target) => {
                let target_block = self.block(*target)?;
                self.builder
                    .build_unconditional_branch(target_block)
                    .map_err(|e| CodegenError::internal("branch", e))?;
            }
            Terminator::CondBranch {
                cond,
                true_target,
                false_target,
            } => {
                let cond_value = self.lower_binop(cond)?;
                let true_block = self.block(*true_target)?;
                let false_block = self.block(*false_target)?;
                self.builder
                    .build_conditional_branch(cond_value, true_block, false_block)
                    .map_err(|e| CodegenError::internal("conditional branch", e))?;
            }
        }
        Ok(())
    }

    /// Lowers an integer comparison, shared by `>` and `=`.
    pub(super) fn build_int_compare_op(
        &mut self,
        predicate: IntPredicate,
        left: BasicValueEnum<'ctx>,
        right: BasicValueEnum<'ctx>,
        op: &str,
    ) -> Result<inkwell::values::IntValue<'ctx>, CodegenError> {
        let (left, right) = match (left, right) {
            (BasicValueEnum::IntValue(l), BasicValueEnum::IntValue(r)) => (l, r),
            _ => {
                return Err(CodegenError::new(format!(
                    "Operation '{}' requires numeric operands",
                    op
                )));
            }
        };
        self.builder
            .build_int_compare(predicate, left, right, "cmp")
            .map_err(|e| CodegenError::internal("integer compare", e))
    }
}
