//! Destination for the linear-stream debug dump.
//!
//! A process-global channel, settable once or many times; unset, the dump
//! goes to stderr. Only the driver writes here, and only when asked.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use super::linear::LinearOp;

static CHANNEL: Mutex<Option<Box<dyn Write + Send>>> = Mutex::new(None);

/// Route debug output into `writer`.
pub fn set_debug_channel(writer: Box<dyn Write + Send>) {
    let mut guard = CHANNEL.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(writer);
}

/// Route debug output into a file at `path` (created or truncated).
pub fn set_debug_channel_path(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    set_debug_channel(Box::new(BufWriter::new(file)));
    Ok(())
}

fn with_channel<R>(f: impl FnOnce(&mut dyn Write) -> R) -> R {
    let mut guard = CHANNEL.lock().unwrap_or_else(|e| e.into_inner());
    match guard.as_mut() {
        Some(writer) => f(&mut **writer),
        None => f(&mut io::stderr()),
    }
}

/// Dump one procedure's linear stream, terminated by the end marker.
pub(crate) fn dump_linear(ops: &[LinearOp<'_>]) -> io::Result<()> {
    with_channel(|out| {
        for op in ops {
            op.dump(out)?;
        }
        writeln!(out, "--- END ---")?;
        out.flush()
    })
}
