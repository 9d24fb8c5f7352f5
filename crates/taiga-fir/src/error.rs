/// Errors surfaced by the lowering API.
///
/// Structural precondition failures are deliberately *not* here: those are
/// programmer bugs (in the lowering or in what semantic analysis let
/// through) and abort via [`semantics_bug!`] instead of unwinding a
/// `Result` through every layer.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    #[error("duplicate procedure name: {name}")]
    DuplicateProcedure { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abort with a tagged diagnostic identifying the offending lowering call.
///
/// The location is the `file:line` of the invocation, not of the Fortran
/// source program; user-facing diagnostics belong to semantic analysis.
#[macro_export]
macro_rules! semantics_bug {
    ($($arg:tt)*) => {
        panic!(
            "semantics bug: {} at {}:{}",
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Abort on a statement variant that the linearizer must have consumed.
#[macro_export]
macro_rules! wrong_path {
    () => {
        panic!("control should not reach here at {}:{}", file!(), line!())
    };
}

#[cfg(test)]
mod tests {
    #[test]
    #[should_panic(expected = "semantics bug: CYCLE outside loop")]
    fn semantics_bug_carries_tag() {
        semantics_bug!("CYCLE outside loop");
    }

    #[test]
    #[should_panic(expected = "control should not reach here")]
    fn wrong_path_panics() {
        wrong_path!();
    }
}
