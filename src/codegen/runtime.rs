//! The runtime library emitter.
//!
//! Before any user code is lowered, the emitter installs a small
//! hand-written runtime into the IR module: the string struct type, a
//! digits table, recursive integer printing, string printing, string
//! equality and the external `putchar` declaration. After user code, it
//! adds the C `main` that bridges into `MAIN.MAIN`.
//!
//! The only external symbol the produced IR depends on is `putchar`, which
//! the C-family driver links from libc.

use inkwell::IntPredicate;
use inkwell::module::Linkage;
use inkwell::values::{BasicValueEnum, FunctionValue, IntValue, PointerValue};

use super::Codegen;
use super::error::CodegenError;

/// Name of the runtime string struct type.
pub(super) const STRING_TYPE_NAME: &str = "_runtime._string";
/// Name of the digits table global.
pub(super) const DIGITS_NAME: &str = "_runtime.digits";
/// Name of the recursive digit printer.
pub(super) const INTERNAL_PRINT_INT_NAME: &str = "_runtime._printInt";
/// Name of the integer print entry point.
pub(super) const PRINT_INT_NAME: &str = "_runtime.printInt";
/// Name of the string print entry point.
pub(super) const PRINT_STR_NAME: &str = "_runtime.printStr";
/// Name of the string equality function.
pub(super) const EQUAL_STR_NAME: &str = "_runtime._equalStr";

const PUTCHAR_NAME: &str = "putchar";

/// Digit characters indexed by remainder; supports bases up to 36.
const DIGITS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

impl<'ctx> Codegen<'ctx> {
    /// Installs the runtime prelude into the module.
    ///
    /// Must run before user-code lowering; the lowered code calls these
    /// functions by name.
    pub fn emit_runtime_prelude(&mut self) -> Result<(), CodegenError> {
        self.declare_putchar();
        self.emit_digits_global();
        self.emit_internal_print_int()?;
        self.emit_print_int()?;
        self.emit_print_str()?;
        self.emit_equal_str()?;
        Ok(())
    }

    /// Declares `putchar(byte) -> i32` as an external function.
    fn declare_putchar(&self) {
        let fn_type = self
            .context
            .i32_type()
            .fn_type(&[self.context.i8_type().into()], false);
        self.module
            .add_function(PUTCHAR_NAME, fn_type, Some(Linkage::External));
    }

    /// Defines the `_runtime.digits` byte array global.
    fn emit_digits_global(&self) {
        let initializer = self.context.const_string(DIGITS.as_bytes(), false);
        let array_type = self.context.i8_type().array_type(DIGITS.len() as u32);
        let global = self.module.add_global(array_type, None, DIGITS_NAME);
        global.set_initializer(&initializer);
        global.set_constant(true);
    }

    /// Emits `_runtime._printInt(input: i64, base: i64) -> void`.
    ///
    /// Recursive digit printer: while `input > base` it recurses on
    /// `input / base`, then prints `digits[input mod base]`.
    fn emit_internal_print_int(&mut self) -> Result<(), CodegenError> {
        let i64_type = self.context.i64_type();
        let fn_type = self
            .context
            .void_type()
            .fn_type(&[i64_type.into(), i64_type.into()], false);
        let function = self
            .module
            .add_function(INTERNAL_PRINT_INT_NAME, fn_type, None);
        let input = self.param_int(function, 0, "input")?;
        let base = self.param_int(function, 1, "base")?;

        let entry = self.context.append_basic_block(function, "entry");
        let then_block = self.context.append_basic_block(function, "then");
        let merge_block = self.context.append_basic_block(function, "merge");

        self.builder.position_at_end(entry);
        let cmp = self
            .builder
            .build_int_compare(IntPredicate::UGT, input, base, "cmp")
            .map_err(|e| CodegenError::internal("printInt compare", e))?;
        self.builder
            .build_conditional_branch(cmp, then_block, merge_block)
            .map_err(|e| CodegenError::internal("printInt branch", e))?;

        self.builder.position_at_end(then_block);
        let div = self
            .builder
            .build_int_unsigned_div(input, base, "div")
            .map_err(|e| CodegenError::internal("printInt div", e))?;
        self.builder
            .build_call(function, &[div.into(), base.into()], "")
            .map_err(|e| CodegenError::internal("printInt recursion", e))?;
        self.builder
            .build_unconditional_branch(merge_block)
            .map_err(|e| CodegenError::internal("printInt branch", e))?;

        self.builder.position_at_end(merge_block);
        let rem = self
            .builder
            .build_int_unsigned_rem(input, base, "rem")
            .map_err(|e| CodegenError::internal("printInt rem", e))?;
        let digits = self
            .module
            .get_global(DIGITS_NAME)
            .ok_or_else(|| CodegenError::internal("runtime lookup", "digits global missing"))?;
        let zero = i64_type.const_int(0, false);
        // GEP into the digits table; indices are in bounds for base <= 36.
        let digit_ptr = unsafe {
            self.builder.build_in_bounds_gep(
                digits.as_pointer_value(),
                &[zero, rem],
                "digitp",
            )
        }
        .map_err(|e| CodegenError::internal("printInt gep", e))?;
        let digit = self
            .builder
            .build_load(digit_ptr, "digit")
            .map_err(|e| CodegenError::internal("printInt load", e))?;
        self.build_putchar(digit)?;
        self.builder
            .build_return(None)
            .map_err(|e| CodegenError::internal("printInt return", e))?;
        Ok(())
    }

    /// Emits `_runtime.printInt(input: i64) -> void`.
    ///
    /// Handles the sign (if `0 > input`, prints `-` and negates), prints
    /// the digits in base 10, then a newline.
    fn emit_print_int(&mut self) -> Result<(), CodegenError> {
        let i64_type = self.context.i64_type();
        let fn_type = self.context.void_type().fn_type(&[i64_type.into()], false);
        let function = self.module.add_function(PRINT_INT_NAME, fn_type, None);
        let input = self.param_int(function, 0, "input")?;

        let entry = self.context.append_basic_block(function, "entry");
        let then_block = self.context.append_basic_block(function, "then");
        let else_block = self.context.append_basic_block(function, "else");
        let merge_block = self.context.append_basic_block(function, "merge");

        self.builder.position_at_end(entry);
        let slot = self
            .builder
            .build_alloca(i64_type, "value")
            .map_err(|e| CodegenError::internal("printInt alloca", e))?;
        let zero = i64_type.const_int(0, false);
        let negative = self
            .builder
            .build_int_compare(IntPredicate::SGT, zero, input, "negative")
            .map_err(|e| CodegenError::internal("printInt compare", e))?;
        self.builder
            .build_conditional_branch(negative, then_block, else_block)
            .map_err(|e| CodegenError::internal("printInt branch", e))?;

        self.builder.position_at_end(then_block);
        self.build_putchar_char(b'-')?;
        let minus_one = i64_type.const_int(u64::MAX, true);
        let negated = self
            .builder
            .build_int_mul(input, minus_one, "negated")
            .map_err(|e| CodegenError::internal("printInt negate", e))?;
        self.builder
            .build_store(slot, negated)
            .map_err(|e| CodegenError::internal("printInt store", e))?;
        self.builder
            .build_unconditional_branch(merge_block)
            .map_err(|e| CodegenError::internal("printInt branch", e))?;

        self.builder.position_at_end(else_block);
        self.builder
            .build_store(slot, input)
            .map_err(|e| CodegenError::internal("printInt store", e))?;
        self.builder
            .build_unconditional_branch(merge_block)
            .map_err(|e| CodegenError::internal("printInt branch", e))?;

        self.builder.position_at_end(merge_block);
        let value = self
            .builder
            .build_load(slot, "magnitude")
            .map_err(|e| CodegenError::internal("printInt load", e))?;
        let internal = self.runtime_function(INTERNAL_PRINT_INT_NAME)?;
        let base_ten = i64_type.const_int(10, false);
        self.builder
            .build_call(internal, &[value.into(), base_ten.into()], "")
            .map_err(|e| CodegenError::internal("printInt call", e))?;
        self.build_putchar_char(b'\n')?;
        self.builder
            .build_return(None)
            .map_err(|e| CodegenError::internal("printInt return", e))?;
        Ok(())
    }

    /// Emits `_runtime.printStr(s: _runtime._string) -> void`.
    ///
    /// Walks the data pointer byte by byte up to the length field, calling
    /// `putchar` for each, then prints a newline.
    fn emit_print_str(&mut self) -> Result<(), CodegenError> {
        let i64_type = self.context.i64_type();
        let fn_type = self
            .context
            .void_type()
            .fn_type(&[self.string_type.into()], false);
        let function = self.module.add_function(PRINT_STR_NAME, fn_type, None);

        let entry = self.context.append_basic_block(function, "entry");
        let body = self.context.append_basic_block(function, "loop-body");
        let merge = self.context.append_basic_block(function, "loop-merge");

        self.builder.position_at_end(entry);
        let input = function
            .get_nth_param(0)
            .ok_or_else(|| CodegenError::internal("printStr param", "missing parameter 0"))?
            .into_struct_value();
        let data = self
            .builder
            .build_extract_value(input, 0, "data")
            .map_err(|e| CodegenError::internal("printStr extract", e))?
            .into_pointer_value();
        let len = self
            .builder
            .build_extract_value(input, 1, "len")
            .map_err(|e| CodegenError::internal("printStr extract", e))?
            .into_int_value();
        let index = self
            .builder
            .build_alloca(i64_type, "i")
            .map_err(|e| CodegenError::internal("printStr alloca", e))?;
        self.builder
            .build_store(index, i64_type.const_int(0, false))
            .map_err(|e| CodegenError::internal("printStr store", e))?;
        let first = self
            .builder
            .build_load(index, "i0")
            .map_err(|e| CodegenError::internal("printStr load", e))?
            .into_int_value();
        let has_bytes = self
            .builder
            .build_int_compare(IntPredicate::SLT, first, len, "cmp")
            .map_err(|e| CodegenError::internal("printStr compare", e))?;
        self.builder
            .build_conditional_branch(has_bytes, body, merge)
            .map_err(|e| CodegenError::internal("printStr branch", e))?;

        self.builder.position_at_end(body);
        let current = self
            .builder
            .build_load(index, "i")
            .map_err(|e| CodegenError::internal("printStr load", e))?
            .into_int_value();
        let char_ptr = unsafe {
            self.builder
                .build_in_bounds_gep(data, &[current], "charp")
        }
        .map_err(|e| CodegenError::internal("printStr gep", e))?;
        let byte = self
            .builder
            .build_load(char_ptr, "char")
            .map_err(|e| CodegenError::internal("printStr load", e))?;
        self.build_putchar(byte)?;
        let one = i64_type.const_int(1, false);
        let next = self
            .builder
            .build_int_add(one, current, "next")
            .map_err(|e| CodegenError::internal("printStr add", e))?;
        self.builder
            .build_store(index, next)
            .map_err(|e| CodegenError::internal("printStr store", e))?;
        let after = self
            .builder
            .build_load(index, "i2")
            .map_err(|e| CodegenError::internal("printStr load", e))?
            .into_int_value();
        let more = self
            .builder
            .build_int_compare(IntPredicate::SLT, after, len, "cmp2")
            .map_err(|e| CodegenError::internal("printStr compare", e))?;
        self.builder
            .build_conditional_branch(more, body, merge)
            .map_err(|e| CodegenError::internal("printStr branch", e))?;

        self.builder.position_at_end(merge);
        self.build_putchar_char(b'\n')?;
        self.builder
            .build_return(None)
            .map_err(|e| CodegenError::internal("printStr return", e))?;
        Ok(())
    }

    /// Emits `_runtime._equalStr(a, b: _runtime._string) -> i1`.
    ///
    /// Unequal lengths return 0 immediately; equal lengths compare byte by
    /// byte, returning 0 on the first difference and 1 after the last byte.
    fn emit_equal_str(&mut self) -> Result<(), CodegenError> {
        let i64_type = self.context.i64_type();
        let fn_type = self
            .context
            .bool_type()
            .fn_type(&[self.string_type.into(), self.string_type.into()], false);
        let function = self.module.add_function(EQUAL_STR_NAME, fn_type, None);

        let entry = self.context.append_basic_block(function, "entry");
        let check = self.context.append_basic_block(function, "loop-check");
        let body = self.context.append_basic_block(function, "loop-body");
        let all_equal = self.context.append_basic_block(function, "all-equal");
        let not_equal = self.context.append_basic_block(function, "not-equal");

        self.builder.position_at_end(entry);
        let a = function
            .get_nth_param(0)
            .ok_or_else(|| CodegenError::internal("equalStr param", "missing parameter 0"))?
            .into_struct_value();
        let b = function
            .get_nth_param(1)
            .ok_or_else(|| CodegenError::internal("equalStr param", "missing parameter 1"))?
            .into_struct_value();
        let a_data = self
            .builder
            .build_extract_value(a, 0, "a_data")
            .map_err(|e| CodegenError::internal("equalStr extract", e))?
            .into_pointer_value();
        let a_len = self
            .builder
            .build_extract_value(a, 1, "a_len")
            .map_err(|e| CodegenError::internal("equalStr extract", e))?
            .into_int_value();
        let b_data = self
            .builder
            .build_extract_value(b, 0, "b_data")
            .map_err(|e| CodegenError::internal("equalStr extract", e))?
            .into_pointer_value();
        let b_len = self
            .builder
            .build_extract_value(b, 1, "b_len")
            .map_err(|e| CodegenError::internal("equalStr extract", e))?
            .into_int_value();
        let index = self
            .builder
            .build_alloca(i64_type, "i")
            .map_err(|e| CodegenError::internal("equalStr alloca", e))?;
        self.builder
            .build_store(index, i64_type.const_int(0, false))
            .map_err(|e| CodegenError::internal("equalStr store", e))?;
        let same_len = self
            .builder
            .build_int_compare(IntPredicate::EQ, a_len, b_len, "same_len")
            .map_err(|e| CodegenError::internal("equalStr compare", e))?;
        self.builder
            .build_conditional_branch(same_len, check, not_equal)
            .map_err(|e| CodegenError::internal("equalStr branch", e))?;

        self.builder.position_at_end(check);
        let current = self
            .builder
            .build_load(index, "i")
            .map_err(|e| CodegenError::internal("equalStr load", e))?
            .into_int_value();
        let in_bounds = self
            .builder
            .build_int_compare(IntPredicate::SLT, current, a_len, "in_bounds")
            .map_err(|e| CodegenError::internal("equalStr compare", e))?;
        self.builder
            .build_conditional_branch(in_bounds, body, all_equal)
            .map_err(|e| CodegenError::internal("equalStr branch", e))?;

        self.builder.position_at_end(body);
        let a_ptr = unsafe {
            self.builder
                .build_in_bounds_gep(a_data, &[current], "a_charp")
        }
        .map_err(|e| CodegenError::internal("equalStr gep", e))?;
        let b_ptr = unsafe {
            self.builder
                .build_in_bounds_gep(b_data, &[current], "b_charp")
        }
        .map_err(|e| CodegenError::internal("equalStr gep", e))?;
        let a_char = self
            .builder
            .build_load(a_ptr, "a_char")
            .map_err(|e| CodegenError::internal("equalStr load", e))?
            .into_int_value();
        let b_char = self
            .builder
            .build_load(b_ptr, "b_char")
            .map_err(|e| CodegenError::internal("equalStr load", e))?
            .into_int_value();
        let one = i64_type.const_int(1, false);
        let next = self
            .builder
            .build_int_add(current, one, "next")
            .map_err(|e| CodegenError::internal("equalStr add", e))?;
        self.builder
            .build_store(index, next)
            .map_err(|e| CodegenError::internal("equalStr store", e))?;
        let chars_equal = self
            .builder
            .build_int_compare(IntPredicate::EQ, a_char, b_char, "chars_equal")
            .map_err(|e| CodegenError::internal("equalStr compare", e))?;
        self.builder
            .build_conditional_branch(chars_equal, check, not_equal)
            .map_err(|e| CodegenError::internal("equalStr branch", e))?;

        let true_value = self.context.bool_type().const_int(1, false);
        let false_value = self.context.bool_type().const_int(0, false);
        self.builder.position_at_end(all_equal);
        self.builder
            .build_return(Some(&true_value))
            .map_err(|e| CodegenError::internal("equalStr return", e))?;
        self.builder.position_at_end(not_equal);
        self.builder
            .build_return(Some(&false_value))
            .map_err(|e| CodegenError::internal("equalStr return", e))?;
        Ok(())
    }

    /// Initializes a runtime string struct in place.
    ///
    /// Computes the data-pointer and length fields of the struct pointed to
    /// by `slot`, allocates a byte array of exactly `text.len()` bytes,
    /// copies the literal bytes into it and stores its address into the
    /// data field.
    pub(super) fn build_string_init(
        &mut self,
        text: &str,
        slot: PointerValue<'ctx>,
    ) -> Result<(), CodegenError> {
        let data_field = self
            .builder
            .build_struct_gep(slot, 0, "datap")
            .map_err(|e| CodegenError::internal("string gep", e))?;
        let len_field = self
            .builder
            .build_struct_gep(slot, 1, "lenp")
            .map_err(|e| CodegenError::internal("string gep", e))?;

        let len = self
            .context
            .i64_type()
            .const_int(text.len() as u64, false);
        self.builder
            .build_store(len_field, len)
            .map_err(|e| CodegenError::internal("string store", e))?;

        let array_type = self.context.i8_type().array_type(text.len() as u32);
        let bytes = self
            .builder
            .build_alloca(array_type, "bytes")
            .map_err(|e| CodegenError::internal("string alloca", e))?;
        let initializer = self.context.const_string(text.as_bytes(), false);
        self.builder
            .build_store(bytes, initializer)
            .map_err(|e| CodegenError::internal("string store", e))?;
        let zero = self.context.i64_type().const_int(0, false);
        let data_ptr = unsafe {
            self.builder
                .build_in_bounds_gep(bytes, &[zero, zero], "data_decay")
        }
        .map_err(|e| CodegenError::internal("string gep", e))?;
        self.builder
            .build_store(data_field, data_ptr)
            .map_err(|e| CodegenError::internal("string store", e))?;
        Ok(())
    }

    /// Emits `main() -> i32` calling `MAIN.MAIN` and returning 0.
    ///
    /// Must run after user-code lowering.
    pub fn emit_main_bridge(&mut self) -> Result<(), CodegenError> {
        let entry_name = format!("{0}.{0}", super::MAIN_NAME);
        let user_main = self
            .module
            .get_function(&entry_name)
            .ok_or_else(|| CodegenError::new(format!("Can't find '{}' function", entry_name)))?;

        let i32_type = self.context.i32_type();
        let main = self
            .module
            .add_function("main", i32_type.fn_type(&[], false), None);
        let block = self.context.append_basic_block(main, "plsql-main");
        self.builder.position_at_end(block);
        self.builder
            .build_call(user_main, &[], "")
            .map_err(|e| CodegenError::internal("main bridge call", e))?;
        let zero = i32_type.const_int(0, false);
        self.builder
            .build_return(Some(&zero))
            .map_err(|e| CodegenError::internal("main bridge return", e))?;
        Ok(())
    }

    /// Calls `putchar` with an already-lowered byte value.
    fn build_putchar(&mut self, byte: BasicValueEnum<'ctx>) -> Result<(), CodegenError> {
        let putchar = self.runtime_function(PUTCHAR_NAME)?;
        self.builder
            .build_call(putchar, &[byte.into()], "")
            .map_err(|e| CodegenError::internal("putchar call", e))?;
        Ok(())
    }

    /// Calls `putchar` with a constant character.
    fn build_putchar_char(&mut self, c: u8) -> Result<(), CodegenError> {
        let byte = self.context.i8_type().const_int(c as u64, false);
        self.build_putchar(byte.into())
    }

    /// Fetches an integer parameter of a runtime function being emitted.
    fn param_int(
        &self,
        function: FunctionValue<'ctx>,
        index: u32,
        name: &str,
    ) -> Result<IntValue<'ctx>, CodegenError> {
        let param = function.get_nth_param(index).ok_or_else(|| {
            CodegenError::internal("runtime param", format!("missing parameter {}", index))
        })?;
        let value = param.into_int_value();
        value.set_name(name);
        Ok(value)
    }
}
