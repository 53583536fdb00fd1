/// Builds a square line grid in the `z = 0` ground plane.
///
/// Lines run parallel to both the x and the y axis from `-extent` to `+extent`, spaced `step`
/// units apart. Every line contributes two vertices (`x, y, z` each) for a line list draw.
/// A non-positive `step` or `extent` yields an empty grid.
#[must_use]
pub fn build_grid(extent: f32, step: f32) -> Vec<f32> {
    if !(extent > 0.0 && step > 0.0 && extent.is_finite() && step.is_finite()) {
        return Vec::new();
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "both operands are positive and finite"
    )]
    let intervals = (2.0 * extent / step).floor() as u32;

    let mut positions = Vec::with_capacity((intervals as usize + 1) * 12);
    for index in 0..=intervals {
        #[expect(clippy::cast_precision_loss, reason = "a grid has few lines")]
        let offset = -extent + index as f32 * step;
        // parallel to y
        positions.extend_from_slice(&[offset, -extent, 0.0, offset, extent, 0.0]);
        // parallel to x
        positions.extend_from_slice(&[-extent, offset, 0.0, extent, offset, 0.0]);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_both_axes() {
        let grid = build_grid(100.0, 10.0);
        // 21 lines per axis, two vertices per line
        assert_eq!(grid.len(), 21 * 2 * 2 * 3);
        assert!(grid.chunks_exact(3).all(|vertex| vertex[2] == 0.0));
        assert!(grid.iter().all(|coord| (-100.0..=100.0).contains(coord)));
        assert_eq!(grid[..6], [-100.0, -100.0, 0.0, -100.0, 100.0, 0.0]);
    }

    #[test]
    fn degenerate_grid_is_empty() {
        assert!(build_grid(100.0, 0.0).is_empty());
        assert!(build_grid(-1.0, 10.0).is_empty());
        assert!(build_grid(100.0, f32::NAN).is_empty());
    }
}
