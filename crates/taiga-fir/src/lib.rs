//! Fortran IR and the control-flow lowering that produces it.
//!
//! The IR ([`ir`]) is a conventional procedure → region → basic-block →
//! statement hierarchy with explicit terminators. The lowering ([`lower`])
//! converts the structured parse tree from `taiga-front` into it in two
//! phases: a linear op stream with symbolic labels, then block formation
//! with deferred forward edges.

pub mod error;
pub mod ir;
pub mod lower;

pub use error::LowerError;
pub use ir::{print_procedure, print_program, Procedure, Program};
pub use lower::{create_fortran_ir, set_debug_channel, set_debug_channel_path};
