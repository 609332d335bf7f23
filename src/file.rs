//! Migration file model and content inspection.
//!
//! A [MigrationFile] arrives fully resolved: the engine that sequences
//! migrations parses filenames into versions and reads content from disk
//! before handing files to a driver. Alongside the model this module
//! carries the content-level helpers drivers share, the check for the
//! transaction-disabling directive and the line/column and excerpt
//! rendering used to report server-side error positions.

use std::path::PathBuf;

/// A migration version. Versions are ordered integers, typically derived
/// from a `YYYYMMDDHHMMSS` timestamp, so they exceed what 32 bits can hold.
pub type Version = u64;

/// The direction a migration file applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply forward.
    Up,
    /// Revert the matching [Up](Direction::Up) file.
    Down,
}

/// A single migration file, resolved by the caller.
///
/// The up and down files of one logical migration share a `version` and a
/// `name` and differ in `direction` and `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Directory the file was found in.
    pub path: PathBuf,
    /// Full file name, e.g. `20060102150405_create_users.up.sql`.
    pub file_name: String,
    /// Version parsed from the file name.
    pub version: Version,
    /// Logical name shared by the up/down pair.
    pub name: String,
    /// Direction this file applies in.
    pub direction: Direction,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// Directive token that opts a file out of transactional execution.
const DISABLE_DDL_TRANSACTION: &str = "disable_ddl_transaction";

impl MigrationFile {
    /// True when the content opens with a `-- disable_ddl_transaction`
    /// comment, asking the driver to execute the payload directly on the
    /// connection instead of inside a transaction.
    ///
    /// Matching is case-insensitive and tolerates whitespace before the
    /// comment marker and between the marker and the token. The token must
    /// end at a word boundary, so an unknown directive such as
    /// `disable_ddl_transactions` is ordinary comment content. The
    /// directive line is left in place; it reaches the server as an inert
    /// comment.
    pub fn disables_ddl_transaction(&self) -> bool {
        let content = String::from_utf8_lossy(&self.content);
        let Some(comment) = content.trim_start().strip_prefix("--") else {
            return false;
        };
        // The comment runs to the end of its line; the directive must be
        // the first word in it.
        match comment.lines().next().unwrap_or("").split_whitespace().next() {
            Some(token) => token.eq_ignore_ascii_case(DISABLE_DDL_TRANSACTION),
            None => false,
        }
    }
}

/// Translate a byte offset into `content` to 1-based line and column
/// numbers. Offsets past the end of the content resolve to its final
/// position.
pub(crate) fn line_column_from_offset(content: &[u8], offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for &byte in content.iter().take(offset) {
        if byte == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Render the content around the 1-based `line`, with up to `before`
/// leading and `after` trailing context lines, each prefixed with its line
/// number. Ranges reaching past either end of the content are clamped.
pub(crate) fn lines_before_and_after(
    content: &[u8],
    line: usize,
    before: usize,
    after: usize,
) -> String {
    let content = String::from_utf8_lossy(content);
    let lines: Vec<&str> = content.lines().collect();
    let start = line.saturating_sub(1).saturating_sub(before);
    let end = usize::min(line.saturating_add(after), lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{:4}: {}", start + i + 1, text))
        .collect::<Vec<_>>()
        .join("\n")
}
