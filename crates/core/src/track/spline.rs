//! Closed Catmull-Rom spline evaluation.

use glam::Vec3;

/// Samples a closed uniform Catmull-Rom spline through `controls`.
///
/// Returns `controls.len() * samples_per_segment` points. The loop wraps:
/// the first sample is not repeated at the end, and consumers index
/// modulo the returned length.
pub fn catmull_rom_closed(controls: &[Vec3], samples_per_segment: usize) -> Vec<Vec3> {
    assert!(controls.len() >= 3, "a closed spline needs at least 3 control points");
    assert!(samples_per_segment >= 1);

    let n = controls.len();
    let mut points = Vec::with_capacity(n * samples_per_segment);
    for i in 0..n {
        let p0 = controls[(i + n - 1) % n];
        let p1 = controls[i];
        let p2 = controls[(i + 1) % n];
        let p3 = controls[(i + 2) % n];
        for j in 0..samples_per_segment {
            let t = j as f32 / samples_per_segment as f32;
            points.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    points
}

/// One uniform Catmull-Rom segment between `p1` (t=0) and `p2` (t=1).
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    ((p1 * 2.0)
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
        ]
    }

    #[test]
    fn passes_through_control_points() {
        let controls = square();
        let points = catmull_rom_closed(&controls, 8);
        for (i, control) in controls.iter().enumerate() {
            let sample = points[i * 8];
            assert!((sample - *control).length() < 1e-5);
        }
    }

    #[test]
    fn sample_count() {
        let points = catmull_rom_closed(&square(), 5);
        assert_eq!(points.len(), 20);
    }

    #[test]
    fn loop_has_no_seam() {
        let points = catmull_rom_closed(&square(), 16);
        // The gap across the wrap must be comparable to the usual spacing.
        let mut max_step: f32 = 0.0;
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            max_step = max_step.max((next - points[i]).length());
        }
        let wrap_step = (points[0] - *points.last().unwrap()).length();
        assert!(wrap_step <= max_step * 1.5, "wrap step {wrap_step} vs max {max_step}");
    }
}
