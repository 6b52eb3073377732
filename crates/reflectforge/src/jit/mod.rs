//! JIT compilation of member accessors via Cranelift.
//!
//! # Instance Memory Layout
//!
//! Compiled functions operate on the flat `i64` slot buffer of a
//! `DynamicObject`, one slot per scalar field. Values outside the slot
//! buffer are never touched by generated code.
//!
//! # Function Signatures
//!
//! - **Probe**: `fn() -> i64`
//! - **Field get / computed property**: `fn(slots: *const i64) -> i64`
//! - **Field set**: `fn(slots: *mut i64, value: i64)`


mod compiler;

pub use compiler::{compile_constant, compile_expr, compile_load, compile_store, JitError, JitFn};
