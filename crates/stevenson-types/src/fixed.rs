//! Byte-position field slicing for the fixed-width GHCN layouts.
//!
//! Source lines are sliced by absolute byte offsets. Lines may come up
//! short of the maximum expected width, in which case absent positions
//! read as blank rather than failing.

/// Returns the trimmed field at byte positions `[start, end)` of a line.
///
/// Positions past the end of the line are treated as blank, so short
/// lines behave as if they were right-padded with spaces.
#[must_use]
pub fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).map_or("", str::trim)
}

/// Returns the single flag character at `idx`, or a blank when absent.
#[must_use]
pub fn flag_char(line: &str, idx: usize) -> char {
    line.as_bytes().get(idx).map_or(' ', |&b| b as char)
}
