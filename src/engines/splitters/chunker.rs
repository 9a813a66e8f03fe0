use crate::error::{FoldError, Result};
use std::ops::Range;

/// Split `[0, length)` into contiguous ranges of `ceil(length / n)` positions;
/// the last range takes the remainder. May return fewer than `n` ranges.
pub fn chunk(length: usize, n: usize) -> Result<Vec<Range<usize>>> {
    if n == 0 {
        return Err(FoldError::invalid_argument("n", "chunk count must be positive"));
    }
    if length == 0 {
        return Ok(Vec::new());
    }

    let size = length.div_ceil(n);
    Ok((0..length)
        .step_by(size)
        .map(|start| start..(start + size).min(length))
        .collect())
}
