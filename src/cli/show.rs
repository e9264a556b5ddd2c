//! `deadends show`: print one canon.

use super::{CliResult, write_json};
use crate::services::{CanonLookup, KnowledgeBase};
use std::io::{self, Write};

/// Writes the lookup result. Returns whether the id was found.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_canon_lookup<W: Write>(
    writer: &mut W,
    id: &str,
    lookup: &CanonLookup<'_>,
) -> CliResult<bool> {
    match lookup {
        CanonLookup::Found(canon) => {
            write_json(writer, canon)?;
            Ok(true)
        },
        CanonLookup::NotFound { suggestions } => {
            writeln!(writer, "Error ID not found: {id}")?;
            if !suggestions.is_empty() {
                writeln!(writer, "\nDid you mean one of these?")?;
                for s in suggestions {
                    writeln!(writer, "  {s}")?;
                }
            }
            Ok(false)
        },
    }
}

/// Executes the show command. Returns whether the id was found.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or output fails.
pub fn cmd_show(kb: &KnowledgeBase, id: &str) -> CliResult<bool> {
    let lookup = kb.get(id)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_canon_lookup(&mut handle, id, &lookup)
}
