//! Cranelift JIT compiler for member accessors.
//!
//! Each accessor gets its own `JITModule` holding exactly one function.
//!
//! # Calling Convention
//!
//! Functions use the host's default C calling convention and one of three
//! shapes:
//!
//! ```text
//! nullary: fn() -> i64                       // capability probe
//! load:    fn(slots: *const i64) -> i64      // field get, computed property
//! store:   fn(slots: *mut i64, value: i64)   // field set
//! ```
//!
//! Field access compiles to a single load or store at `slots + slot * 8`.
//! No bounds checks: callers must only pass slot buffers of the type the
//! function was compiled for.

use std::fmt;

use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::types::I64;
use cranelift_codegen::ir::{AbiParam, Function, InstBuilder, MemFlags, UserFuncName, Value};
use cranelift_codegen::settings::{self, Configurable};
use cranelift_codegen::Context;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{Linkage, Module};
use thiserror::Error;

use reflectforge_core::Expr;

/// Compilation failure. Never escapes the crate as an accessor error; the
/// compiling strategy falls back to a late-bound delegate instead.
#[derive(Debug, Error)]
pub enum JitError {
    #[error("target ISA unavailable: {0}")]
    Isa(String),

    #[error("module: {0}")]
    Module(#[from] cranelift_module::ModuleError),

    #[error("codegen: {0}")]
    Codegen(String),

    #[error("slot {0} is out of addressable range")]
    SlotOffset(usize),

    #[error("expression reads field #{0}, which has no slot")]
    NoSlot(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Nullary,
    Load,
    Store,
}

/// A JIT-compiled function. Owns the Cranelift module (code memory) and holds
/// the raw function pointer. The code memory is released on drop.
pub struct JitFn {
    module: Option<JITModule>,
    ptr: *const u8,
    shape: Shape,
}

// SAFETY: JITModule owns the code memory. ptr is valid for the module's lifetime,
// and the compiled code has no shared mutable state.
unsafe impl Send for JitFn {}
unsafe impl Sync for JitFn {}

impl JitFn {
    /// Calls a nullary function.
    pub fn call_0(&self) -> i64 {
        debug_assert_eq!(self.shape, Shape::Nullary);
        // SAFETY: compiled with signature `fn() -> i64` in the default call conv.
        let f: unsafe extern "C" fn() -> i64 = unsafe { std::mem::transmute(self.ptr) };
        unsafe { f() }
    }

    /// Calls a load-shaped function.
    ///
    /// # Safety
    ///
    /// `slots` must point to a slot buffer covering every slot the function
    /// was compiled to read.
    #[inline]
    pub unsafe fn call_load(&self, slots: *const i64) -> i64 {
        debug_assert_eq!(self.shape, Shape::Load);
        let f: unsafe extern "C" fn(*const i64) -> i64 = unsafe { std::mem::transmute(self.ptr) };
        unsafe { f(slots) }
    }

    /// Calls a store-shaped function.
    ///
    /// # Safety
    ///
    /// `slots` must point to a writable slot buffer covering the slot the
    /// function was compiled to write, with no other live references to it.
    #[inline]
    pub unsafe fn call_store(&self, slots: *mut i64, value: i64) {
        debug_assert_eq!(self.shape, Shape::Store);
        let f: unsafe extern "C" fn(*mut i64, i64) = unsafe { std::mem::transmute(self.ptr) };
        unsafe { f(slots, value) }
    }
}

impl Drop for JitFn {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            // SAFETY: ptr is private to this JitFn and is never called after drop.
            unsafe { module.free_memory() };
        }
    }
}

impl fmt::Debug for JitFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitFn")
            .field("shape", &self.shape)
            .field("ptr", &self.ptr)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compiles `fn() -> i64` returning `value`.
#[allow(clippy::result_large_err)]
pub fn compile_constant(value: i64) -> Result<JitFn, JitError> {
    compile(Shape::Nullary, |builder, _| {
        let v = builder.ins().iconst(I64, value);
        builder.ins().return_(&[v]);
        Ok(())
    })
}

/// Compiles a raw read of `slot`.
#[allow(clippy::result_large_err)]
pub fn compile_load(slot: usize) -> Result<JitFn, JitError> {
    let offset = slot_offset(slot)?;
    compile(Shape::Load, |builder, params| {
        let v = builder
            .ins()
            .load(I64, MemFlags::trusted(), params[0], offset);
        builder.ins().return_(&[v]);
        Ok(())
    })
}

/// Compiles a raw write of `slot`.
#[allow(clippy::result_large_err)]
pub fn compile_store(slot: usize) -> Result<JitFn, JitError> {
    let offset = slot_offset(slot)?;
    compile(Shape::Store, |builder, params| {
        builder
            .ins()
            .store(MemFlags::trusted(), params[1], params[0], offset);
        builder.ins().return_(&[]);
        Ok(())
    })
}

/// Compiles an expression into a load-shaped function.
///
/// `slots[i]` is the slot of the field at declaration index `i`, or `None`
/// for fields stored outside the slot buffer.
#[allow(clippy::result_large_err)]
pub fn compile_expr(expr: &Expr, slots: &[Option<usize>]) -> Result<JitFn, JitError> {
    let offsets = slots
        .iter()
        .map(|slot| slot.map(slot_offset).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    compile(Shape::Load, |builder, params| {
        let result = emit_expr(builder, expr, params[0], &offsets)?;
        builder.ins().return_(&[result]);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Internal codegen
// ---------------------------------------------------------------------------

fn slot_offset(slot: usize) -> Result<i32, JitError> {
    slot.checked_mul(8)
        .and_then(|offset| i32::try_from(offset).ok())
        .ok_or(JitError::SlotOffset(slot))
}

#[allow(clippy::result_large_err)]
fn make_jit_module() -> Result<JITModule, JitError> {
    let mut flag_builder = settings::builder();
    flag_builder
        .set("use_colocated_libcalls", "false")
        .map_err(|e| JitError::Isa(e.to_string()))?;
    flag_builder
        .set("is_pic", "false")
        .map_err(|e| JitError::Isa(e.to_string()))?;
    let isa_builder = cranelift_native::builder().map_err(|e| JitError::Isa(e.to_string()))?;
    let isa = isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| JitError::Isa(e.to_string()))?;
    let builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
    Ok(JITModule::new(builder))
}

#[allow(clippy::result_large_err)]
fn compile<F>(shape: Shape, emit: F) -> Result<JitFn, JitError>
where
    F: FnOnce(&mut FunctionBuilder<'_>, &[Value]) -> Result<(), JitError>,
{
    let mut module = make_jit_module()?;
    let ptr_type = module.target_config().pointer_type();

    let mut sig = module.make_signature();
    match shape {
        Shape::Nullary => sig.returns.push(AbiParam::new(I64)),
        Shape::Load => {
            sig.params.push(AbiParam::new(ptr_type));
            sig.returns.push(AbiParam::new(I64));
        }
        Shape::Store => {
            sig.params.push(AbiParam::new(ptr_type));
            sig.params.push(AbiParam::new(I64));
        }
    }

    let func_id = module.declare_function("accessor", Linkage::Local, &sig)?;
    let mut func = Function::with_name_signature(UserFuncName::user(0, func_id.as_u32()), sig);
    let mut func_ctx = FunctionBuilderContext::new();

    {
        let mut builder = FunctionBuilder::new(&mut func, &mut func_ctx);
        let entry = builder.create_block();
        builder.append_block_params_for_function_params(entry);
        builder.switch_to_block(entry);
        builder.seal_block(entry);

        let params = builder.block_params(entry).to_vec();
        emit(&mut builder, &params)?;
        builder.finalize();
    }

    let mut ctx = Context::for_function(func);
    module
        .define_function(func_id, &mut ctx)
        .map_err(|e| JitError::Codegen(e.to_string()))?;
    module.clear_context(&mut ctx);
    module
        .finalize_definitions()
        .map_err(|e| JitError::Codegen(e.to_string()))?;

    let ptr = module.get_finalized_function(func_id);
    Ok(JitFn {
        module: Some(module),
        ptr,
        shape,
    })
}

/// Emit Cranelift IR for an expression. All values are i64 internally.
/// Booleans are 0 or 1 as i64.
///
/// `offsets[i]` is the byte offset of field `i` from `slots`.
fn emit_expr(
    builder: &mut FunctionBuilder,
    expr: &Expr,
    slots: Value,
    offsets: &[Option<i32>],
) -> Result<Value, JitError> {
    use Expr::*;
    let value = match expr {
        Int(n) => builder.ins().iconst(I64, *n),
        Bool(b) => builder.ins().iconst(I64, *b as i64),

        Field(idx) => {
            let offset = offsets
                .get(*idx)
                .copied()
                .flatten()
                .ok_or(JitError::NoSlot(*idx))?;
            builder
                .ins()
                .load(I64, MemFlags::trusted(), slots, offset)
        }

        Eq(l, r) => icmp_op(builder, IntCC::Equal, l, r, slots, offsets)?,
        Ne(l, r) => icmp_op(builder, IntCC::NotEqual, l, r, slots, offsets)?,
        Lt(l, r) => icmp_op(builder, IntCC::SignedLessThan, l, r, slots, offsets)?,
        Le(l, r) => icmp_op(builder, IntCC::SignedLessThanOrEqual, l, r, slots, offsets)?,
        Gt(l, r) => icmp_op(builder, IntCC::SignedGreaterThan, l, r, slots, offsets)?,
        Ge(l, r) => icmp_op(builder, IntCC::SignedGreaterThanOrEqual, l, r, slots, offsets)?,

        And(l, r) => {
            let (a, b) = operands(builder, l, r, slots, offsets)?;
            builder.ins().band(a, b)
        }
        Or(l, r) => {
            let (a, b) = operands(builder, l, r, slots, offsets)?;
            builder.ins().bor(a, b)
        }
        Not(inner) => {
            let v = emit_expr(builder, inner, slots, offsets)?;
            let one = builder.ins().iconst(I64, 1);
            builder.ins().bxor(v, one)
        }

        Add(l, r) => {
            let (a, b) = operands(builder, l, r, slots, offsets)?;
            builder.ins().iadd(a, b)
        }
        Sub(l, r) => {
            let (a, b) = operands(builder, l, r, slots, offsets)?;
            builder.ins().isub(a, b)
        }
        Mul(l, r) => {
            let (a, b) = operands(builder, l, r, slots, offsets)?;
            builder.ins().imul(a, b)
        }
        Neg(inner) => {
            let v = emit_expr(builder, inner, slots, offsets)?;
            builder.ins().ineg(v)
        }
        Abs(inner) => {
            let v = emit_expr(builder, inner, slots, offsets)?;
            let neg = builder.ins().ineg(v);
            let zero = builder.ins().iconst(I64, 0);
            let is_neg = builder.ins().icmp(IntCC::SignedLessThan, v, zero);
            builder.ins().select(is_neg, neg, v)
        }

        Min(l, r) => select_op(builder, IntCC::SignedLessThan, l, r, slots, offsets)?,
        Max(l, r) => select_op(builder, IntCC::SignedGreaterThan, l, r, slots, offsets)?,

        If {
            cond,
            then_expr,
            else_expr,
        } => {
            let c = emit_expr(builder, cond, slots, offsets)?;
            let t = emit_expr(builder, then_expr, slots, offsets)?;
            let e = emit_expr(builder, else_expr, slots, offsets)?;
            let zero = builder.ins().iconst(I64, 0);
            let is_true = builder.ins().icmp(IntCC::NotEqual, c, zero);
            builder.ins().select(is_true, t, e)
        }
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn operands(
    builder: &mut FunctionBuilder,
    left: &Expr,
    right: &Expr,
    slots: Value,
    offsets: &[Option<i32>],
) -> Result<(Value, Value), JitError> {
    let l = emit_expr(builder, left, slots, offsets)?;
    let r = emit_expr(builder, right, slots, offsets)?;
    Ok((l, r))
}

fn icmp_op(
    builder: &mut FunctionBuilder,
    cc: IntCC,
    left: &Expr,
    right: &Expr,
    slots: Value,
    offsets: &[Option<i32>],
) -> Result<Value, JitError> {
    let (l, r) = operands(builder, left, right, slots, offsets)?;
    let cmp = builder.ins().icmp(cc, l, r);
    Ok(builder.ins().uextend(I64, cmp))
}

fn select_op(
    builder: &mut FunctionBuilder,
    cc: IntCC,
    left: &Expr,
    right: &Expr,
    slots: Value,
    offsets: &[Option<i32>],
) -> Result<Value, JitError> {
    let (l, r) = operands(builder, left, right, slots, offsets)?;
    let cmp = builder.ins().icmp(cc, l, r);
    Ok(builder.ins().select(cmp, l, r))
}
