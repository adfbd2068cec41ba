//! One-ring height smoothing: a single 3x3 box filter pass.

/// Smooths an `n x n` field using a precomputed apron.
///
/// `apron` is `(n + 2) x (n + 2)`, row-major, with the chunk's own samples at
/// `[1, n]` on both axes. Every output is the mean of nine values, so two
/// chunks sharing an edge compute the same edge heights.
pub fn smooth_with_apron(apron: &[f64], n: usize, out: &mut [f32]) {
    let w = n + 2;
    debug_assert_eq!(apron.len(), w * w);
    debug_assert_eq!(out.len(), n * n);
    for z in 0..n {
        for x in 0..n {
            let mut sum = 0.0;
            for dz in 0..3 {
                let row = (z + dz) * w;
                for dx in 0..3 {
                    sum += apron[row + x + dx];
                }
            }
            out[z * n + x] = (sum / 9.0) as f32;
        }
    }
}

/// Smooths an `n x n` field averaging only in-chunk neighbours: edge vertices
/// use 6 values and corners 4.
pub fn smooth_clamped(src: &[f64], n: usize, out: &mut [f32]) {
    debug_assert_eq!(src.len(), n * n);
    debug_assert_eq!(out.len(), n * n);
    for z in 0..n {
        let z0 = z.saturating_sub(1);
        let z1 = (z + 1).min(n - 1);
        for x in 0..n {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(n - 1);
            let mut sum = 0.0;
            let mut count = 0u32;
            for zz in z0..=z1 {
                for xx in x0..=x1 {
                    sum += src[zz * n + xx];
                    count += 1;
                }
            }
            out[z * n + x] = (sum / count as f64) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_field_unchanged() {
        let n = 4;
        let apron = vec![3.0; (n + 2) * (n + 2)];
        let mut out = vec![0.0; n * n];
        smooth_with_apron(&apron, n, &mut out);
        assert!(out.iter().all(|&h| h == 3.0));

        let src = vec![3.0; n * n];
        smooth_clamped(&src, n, &mut out);
        assert!(out.iter().all(|&h| h == 3.0));
    }

    #[test]
    fn test_spike_is_spread_over_nine() {
        let n = 3;
        let mut apron = vec![0.0; 25];
        apron[2 * 5 + 2] = 9.0;
        let mut out = vec![0.0; 9];
        smooth_with_apron(&apron, n, &mut out);
        assert!(out.iter().all(|&h| (h - 1.0).abs() < 1e-6), "{out:?}");
    }

    #[test]
    fn test_clamped_corner_uses_four_neighbours() {
        let n = 3;
        let mut src = vec![0.0; 9];
        src[0] = 4.0;
        let mut out = vec![0.0; 9];
        smooth_clamped(&src, n, &mut out);
        assert!((out[0] - 1.0).abs() < 1e-6);
        // Edge vertex (1, 0) sees 6 values.
        assert!((out[1] - 4.0 / 6.0).abs() < 1e-6);
        // Centre sees all 9.
        assert!((out[4] - 4.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_reads_from_source_not_output() {
        // A ramp stays a ramp in the interior: a second-pass read would bend it.
        let n = 5;
        let src: Vec<f64> = (0..n * n).map(|i| (i % n) as f64).collect();
        let mut out = vec![0.0; n * n];
        smooth_clamped(&src, n, &mut out);
        for z in 0..n {
            for x in 1..n - 1 {
                assert!((out[z * n + x] - x as f32).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_single_vertex() {
        let mut out = vec![0.0; 1];
        smooth_clamped(&[7.0], 1, &mut out);
        assert_eq!(out[0], 7.0);
    }
}
