//! The structured-to-unstructured lowering pass.
//!
//! Two phases per procedure: the [`linearize`] walk flattens the parse tree
//! into an op stream with symbolic labels, then [`build`] materializes basic
//! blocks from it, queueing forward edges and discharging them once all
//! labels exist. [`create_fortran_ir`] drives both over a whole program.

pub mod analysis;
pub mod build;
pub mod compose;
pub mod debug;
pub mod linear;
pub mod linearize;

use taiga_front::ast;
use taiga_front::sema::SemanticsContext;

use crate::error::LowerError;
use crate::ir::builder::FirBuilder;
use crate::ir::procedure::Procedure;
use crate::ir::program::Program;

use build::BlockBuilder;
use linearize::Linearizer;

pub use analysis::{AnalysisState, LLabel, LabelRegistry};
pub use debug::{set_debug_channel, set_debug_channel_path};

/// Lower every program unit into FIR.
///
/// `debug_linear` dumps each procedure's linear stream to the debug channel
/// before block building.
pub fn create_fortran_ir(
    program: &ast::Program,
    ctx: &SemanticsContext,
    debug_linear: bool,
) -> Result<Program, LowerError> {
    let mut fir = Program::new("program");
    for unit in &program.units {
        match unit {
            ast::ProgramUnit::Main(main) => {
                let name = main
                    .program_stmt
                    .as_ref()
                    .map(|s| s.stmt.clone())
                    .unwrap_or_else(|| "_MAIN".to_string());
                lower_procedure(&mut fir, ctx, &name, &main.body, main.source, debug_linear)?;
            }
            ast::ProgramUnit::Function(f) => {
                lower_procedure(
                    &mut fir,
                    ctx,
                    &f.function_stmt.stmt,
                    &f.body,
                    f.source,
                    debug_linear,
                )?;
            }
            ast::ProgramUnit::Subroutine(s) => {
                lower_procedure(
                    &mut fir,
                    ctx,
                    &s.subroutine_stmt.stmt,
                    &s.body,
                    s.source,
                    debug_linear,
                )?;
            }
        }
    }
    Ok(fir)
}

/// Per-procedure orchestration: linearize, optionally dump, build blocks,
/// resolve edges, drop the per-procedure state.
fn lower_procedure(
    fir: &mut Program,
    ctx: &SemanticsContext,
    name: &str,
    body: &ast::Block,
    source: ast::SourceRange,
    debug_linear: bool,
) -> Result<(), LowerError> {
    if fir.contains_procedure(name) {
        return Err(LowerError::DuplicateProcedure {
            name: name.to_string(),
        });
    }

    let scope = ctx.find_scope(source);
    let mut proc = Procedure::new(name, scope);
    let entry = proc.create_block(proc.root_region);

    let mut state = AnalysisState::new();
    let mut linearizer = Linearizer::new();
    linearizer.walk_block(body, &mut state);
    debug_assert!(state.stack_is_empty(), "construct stack is unbalanced");

    if debug_linear {
        debug::dump_linear(&linearizer.ops)?;
    }

    {
        let builder = FirBuilder::new(&mut proc, entry);
        let mut blocks = BlockBuilder::new(builder, ctx, &mut state);
        blocks.run(&linearizer.ops);
        blocks.finish();
        blocks.resolve_edges();
    }

    fir.insert_procedure(proc)?;
    Ok(())
}
