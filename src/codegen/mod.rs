//! LLVM IR generation for the PL/SQL subset.
//!
//! This module provides the [`Codegen`] struct - the mutable lowering
//! environment threaded through every AST node - which transforms the
//! parsed package map into an LLVM module using [Inkwell], a safe Rust
//! wrapper around the LLVM C API.
//!
//! # Overview
//!
//! Lowering proceeds in this order:
//!
//! 1. [`Codegen::emit_runtime_prelude`] installs the hand-written runtime
//!    library (string type, integer/string printers, string equality and
//!    the `putchar` declaration) into the module
//! 2. [`Codegen::compile`] lowers every package: one pass emitting all
//!    procedure prototypes (so forward and cross-package references
//!    resolve), then one pass lowering all bodies
//! 3. [`Codegen::emit_main_bridge`] adds the C `main` that calls
//!    `MAIN.MAIN` and returns 0
//!
//! The module is then *serialized to textual IR* and handed to an external
//! C-family driver; object code is never produced in-process.
//!
//! # Lowering environment
//!
//! `Codegen` carries the IR module handle, the current package name, the
//! current function and basic block, the AST-block→IR-block map of the
//! function being lowered (keyed by stable [`BlockId`], never by name), and
//! the lexical scope chain.
//!
//! # Invariants
//!
//! - every emitted basic block ends with exactly one terminator (blocks the
//!   parser left open receive an implicit `ret void`, with a warning)
//! - the synthetic `locals` block branches unconditionally to the entry
//!   block
//! - scope lookups return the nearest enclosing binding
//! - no AST block is lowered twice
//!
//! # Module Structure
//!
//! - [`error`] - lowering error types
//! - [`binding`] - lowered types and scope bindings
//! - [`scope`] - the lexical scope chain
//! - [`stmt`] - instruction, terminator, local and block lowering
//! - [`expr`] - expression lowering
//! - [`runtime`] - the runtime library emitter and the `main` bridge
//! - `tests` - unit tests (test-only)
//!
//! [Inkwell]: https://github.com/TheDan64/inkwell
//!
//! # See Also
//!
//! * [`crate::ast`] - The tree consumed by this module
//! * [LLVM Language Reference](https://llvm.org/docs/LangRef.html)

mod binding;
mod error;
mod expr;
mod runtime;
mod scope;
mod stmt;


pub use binding::PlsType;
pub use error::CodegenError;

use std::collections::HashMap;

use indexmap::IndexMap;
use inkwell::AddressSpace;
use inkwell::basic_block::BasicBlock;
use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, StructType};
use inkwell::values::FunctionValue;

use crate::ast::{BlockId, Function, Package};

use binding::Binding;
use scope::ScopeChain;

/// Name of the entry package and procedure required by the `main` bridge.
const MAIN_NAME: &str = "MAIN";

/// The mutable lowering environment.
///
/// # Lifetime
///
/// The `'ctx` lifetime parameter ties this struct to an LLVM [`Context`],
/// which must outlive the code generator.
///
/// # Thread Safety
///
/// LLVM contexts are not thread-safe; the whole lowering stage runs
/// sequentially on one thread and owns the module exclusively.
pub struct Codegen<'ctx> {
    /// Reference to the LLVM context.
    context: &'ctx Context,
    /// The LLVM module being built.
    module: inkwell::module::Module<'ctx>,
    /// The IR builder for creating instructions.
    builder: inkwell::builder::Builder<'ctx>,
    /// The named runtime string struct type `_runtime._string`.
    string_type: StructType<'ctx>,
    /// Name of the package currently being lowered.
    package_name: Option<String>,
    /// The function currently being lowered.
    current_function: Option<FunctionValue<'ctx>>,
    /// The IR block instructions are currently appended to.
    current_block: Option<BasicBlock<'ctx>>,
    /// AST-block → IR-block map of the function being lowered.
    blocks: HashMap<BlockId, BasicBlock<'ctx>>,
    /// The lexical scope chain. The root frame holds function bindings.
    scopes: ScopeChain<'ctx>,
}

impl<'ctx> Codegen<'ctx> {
    /// Creates a new code generator with the given LLVM context and module
    /// name.
    ///
    /// The runtime string struct type is registered here so that every
    /// later stage can refer to it; the runtime function bodies are emitted
    /// by [`emit_runtime_prelude`](Self::emit_runtime_prelude).
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();

        // _runtime._string = { ptr-to-byte, 64-bit length }
        let string_type = context.opaque_struct_type(runtime::STRING_TYPE_NAME);
        string_type.set_body(
            &[
                context.i8_type().ptr_type(AddressSpace::default()).into(),
                context.i64_type().into(),
            ],
            false,
        );

        Codegen {
            context,
            module,
            builder,
            string_type,
            package_name: None,
            current_function: None,
            current_block: None,
            blocks: HashMap::new(),
            scopes: ScopeChain::new(),
        }
    }

    /// Lowers every parsed package into the module.
    ///
    /// A `MAIN` package with a `MAIN` procedure must exist - the driver
    /// emits a bridge to it afterwards. Prototypes for all procedures of
    /// all packages are emitted first so that forward references and
    /// cross-package calls resolve, then every body is lowered.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry package or procedure is missing, or if
    /// lowering any body fails.
    pub fn compile(
        &mut self,
        packages: &IndexMap<String, Package>,
    ) -> Result<(), CodegenError> {
        let main_package = packages
            .get(MAIN_NAME)
            .ok_or_else(|| CodegenError::new("Can't find 'MAIN' package"))?;
        if !main_package.has_main_function() {
            return Err(CodegenError::new("Can't find 'MAIN' procedure"));
        }

        for (name, package) in packages {
            self.package_name = Some(name.clone());
            for function in package.functions() {
                self.emit_prototype(function)?;
            }
        }

        for (name, package) in packages {
            self.package_name = Some(name.clone());
            for function in package.functions() {
                self.lower_function(function)?;
            }
        }

        self.package_name = None;
        Ok(())
    }

    /// Emits the prototype of a procedure and binds it in the root scope
    /// under its qualified `PKG.NAME`.
    fn emit_prototype(&mut self, function: &Function) -> Result<(), CodegenError> {
        if !function.is_procedure {
            return Err(CodegenError::new(format!(
                "'{}' is not a procedure; only procedures can be lowered",
                function.proto.name
            )));
        }

        let name = self.qualified_name(&function.proto.name)?;
        let mut param_types: Vec<BasicMetadataTypeEnum<'ctx>> = Vec::new();
        for param in &function.proto.params {
            param_types.push(match PlsType::parse(&param.ty)? {
                PlsType::Int => self.context.i64_type().into(),
                PlsType::Varchar => self.string_type.into(),
            });
        }

        // Procedures return no value.
        let fn_type = self.context.void_type().fn_type(&param_types, false);
        let fn_value = self.module.add_function(&name, fn_type, None);
        self.scopes.add(name, Binding::Function(fn_value));
        Ok(())
    }

    /// Lowers a procedure body.
    ///
    /// Block construction is two-phase: one IR block is created per AST
    /// block up-front (populating the block map, which is what makes
    /// forward branches work), then each AST block is lowered in source
    /// order into its IR counterpart. A procedure with locals additionally
    /// gets a synthetic `locals` IR block that allocates and initializes
    /// the slots and then branches into the entry block.
    fn lower_function(&mut self, function: &Function) -> Result<(), CodegenError> {
        let name = self.qualified_name(&function.proto.name)?;
        let fn_value = match self.scopes.find(&name) {
            Some(Binding::Function(f)) => *f,
            _ => return Err(CodegenError::new(format!("Can't find function '{}'", name))),
        };

        let entry_id = function
            .blocks
            .first()
            .map(|b| b.id)
            .ok_or_else(|| {
                CodegenError::new(format!("Procedure '{}' has no entry block", name))
            })?;

        self.current_function = Some(fn_value);
        self.scopes.push();
        self.blocks.clear();

        let locals_block = if function.locals.is_empty() {
            None
        } else {
            Some(self.context.append_basic_block(fn_value, "locals"))
        };
        for block in &function.blocks {
            let ir_block = self.context.append_basic_block(fn_value, &block.name);
            self.blocks.insert(block.id, ir_block);
        }

        // Parameters become stack slots so the body can treat them exactly
        // like locals. They are allocated in the locals block when one
        // exists, otherwise at the top of the entry block.
        if !function.proto.params.is_empty() {
            let param_block = match locals_block {
                Some(ir_block) => ir_block,
                None => self.block(entry_id)?,
            };
            self.builder.position_at_end(param_block);
            self.lower_params(function, fn_value)?;
        }

        if let Some(ir_block) = locals_block {
            self.builder.position_at_end(ir_block);
            for local in &function.locals {
                self.lower_local(local)?;
            }
        }

        for block in &function.blocks {
            self.lower_block(block)?;
        }

        if let Some(ir_block) = locals_block {
            // The synthetic locals block falls through into the entry block.
            self.builder.position_at_end(ir_block);
            let entry_block = self.block(entry_id)?;
            self.builder
                .build_unconditional_branch(entry_block)
                .map_err(|e| CodegenError::internal("branch from locals block", e))?;
        }

        self.scopes.pop()?;
        self.current_function = None;
        self.current_block = None;
        self.blocks.clear();
        Ok(())
    }

    /// Allocates a slot per parameter, stores the incoming value and binds
    /// the name in the function scope.
    fn lower_params(
        &mut self,
        function: &Function,
        fn_value: FunctionValue<'ctx>,
    ) -> Result<(), CodegenError> {
        for (idx, param) in function.proto.params.iter().enumerate() {
            let ty = PlsType::parse(&param.ty)?;
            let slot_type: inkwell::types::BasicTypeEnum<'ctx> = match ty {
                PlsType::Int => self.context.i64_type().into(),
                PlsType::Varchar => self.string_type.into(),
            };
            let slot = self
                .builder
                .build_alloca(slot_type, &param.name)
                .map_err(|e| CodegenError::internal("parameter alloca", e))?;
            let incoming = fn_value.get_nth_param(idx as u32).ok_or_else(|| {
                CodegenError::internal(
                    "parameter lookup",
                    format!("missing parameter {} of '{}'", idx, function.proto.name),
                )
            })?;
            self.builder
                .build_store(slot, incoming)
                .map_err(|e| CodegenError::internal("parameter store", e))?;
            self.scopes.add(param.name.clone(), Binding::Slot { ptr: slot, ty });
        }
        Ok(())
    }

    /// Returns the qualified `PKG.NAME` for a procedure of the current
    /// package.
    fn qualified_name(&self, function: &str) -> Result<String, CodegenError> {
        let package = self.package_name.as_deref().ok_or_else(|| {
            CodegenError::internal("qualified name", "no package is being lowered")
        })?;
        Ok(format!("{}.{}", package, function))
    }

    /// Looks up the IR block mapped to an AST block id.
    fn block(&self, id: BlockId) -> Result<BasicBlock<'ctx>, CodegenError> {
        self.blocks.get(&id).copied().ok_or_else(|| {
            let function = self
                .current_function
                .map(|f| f.get_name().to_string_lossy().into_owned())
                .unwrap_or_else(|| "<none>".to_string());
            CodegenError::internal(
                "block map",
                format!("no IR block for {:?} in '{}'", id, function),
            )
        })
    }

    /// Returns the LLVM module being built.
    pub fn module(&self) -> &inkwell::module::Module<'ctx> {
        &self.module
    }

    /// Serializes the module to textual LLVM IR.
    pub fn print_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Runs LLVM's module verifier.
    ///
    /// The verifier enforces, among other things, that every basic block
    /// ends with exactly one terminator.
    pub fn verify(&self) -> Result<(), CodegenError> {
        self.module
            .verify()
            .map_err(|e| CodegenError::new(e.to_string()))
    }
}
