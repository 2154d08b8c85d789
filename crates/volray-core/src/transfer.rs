//! The color/opacity transfer curve.
//!
//! A degree-1 B-spline over RGBA control points, which reduces to piecewise
//! linear interpolation between consecutive control colors across knot
//! spans. The GPU evaluates the same algorithm into the lookup texture
//! every frame; [`TransferCurve::evaluate`] is the host-side reference the
//! shader must agree with up to floating-point rounding.

use glam::Vec4;

use crate::error::{CoreError, CoreResult};

/// Maximum number of control points a curve may hold.
pub const MAX_CONTROL_POINTS: usize = 16;

/// Spline degree. Fixed: the curve is piecewise-linear.
pub const DEGREE: usize = 1;

/// Width of the lookup texture the curve is evaluated into.
pub const TRANSFER_LUT_WIDTH: u32 = 512;

/// A bounded, capacity-checked sequence of RGBA control points with a knot
/// vector.
///
/// Invariant, preserved by every constructor and mutator:
/// `knots.len() == colors.len() + DEGREE + 1`, knots non-decreasing in
/// `[0, 1]`. The curve is defined for parameters in
/// `[knots[DEGREE], knots[colors.len()]]`; queries outside clamp to the
/// boundary color.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCurve {
    colors: Vec<Vec4>,
    knots: Vec<f32>,
}

impl TransferCurve {
    /// Builds a curve from explicit control colors and knots, validating
    /// the knot-arity and ordering invariants.
    pub fn new(colors: Vec<Vec4>, knots: Vec<f32>) -> CoreResult<Self> {
        if colors.len() > MAX_CONTROL_POINTS {
            return Err(CoreError::CurveCapacity {
                max: MAX_CONTROL_POINTS,
                actual: colors.len(),
            });
        }
        let expected = colors.len() + DEGREE + 1;
        if !colors.is_empty() && knots.len() != expected {
            return Err(CoreError::KnotArity {
                knots: knots.len(),
                points: colors.len(),
                expected,
            });
        }
        for (i, pair) in knots.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(CoreError::KnotOrder { index: i + 1 });
            }
        }
        if let Some((i, &value)) = knots
            .iter()
            .enumerate()
            .find(|(_, &k)| !(0.0..=1.0).contains(&k))
        {
            return Err(CoreError::KnotRange { index: i, value });
        }
        Ok(Self { colors, knots })
    }

    /// Builds a curve from `(position, color)` pairs. Positions must be
    /// non-decreasing; the boundary knots duplicate the first and last
    /// positions.
    pub fn from_points(points: &[(f32, Vec4)]) -> CoreResult<Self> {
        if points.is_empty() {
            return Self::new(Vec::new(), Vec::new());
        }
        let mut knots = Vec::with_capacity(points.len() + DEGREE + 1);
        knots.push(points[0].0);
        knots.extend(points.iter().map(|(p, _)| *p));
        knots.push(points[points.len() - 1].0);
        Self::new(points.iter().map(|(_, c)| *c).collect(), knots)
    }

    /// An empty curve (evaluates to transparent black everywhere).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            colors: Vec::new(),
            knots: Vec::new(),
        }
    }

    /// Number of control points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.colors.len()
    }

    /// Control colors, in knot order.
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// The knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f32] {
        &self.knots
    }

    /// The position control point `i` peaks at (its interior knot).
    pub fn position(&self, i: usize) -> CoreResult<f32> {
        self.check_index(i)?;
        Ok(self.knots[i + DEGREE])
    }

    /// Replaces the color of control point `i`, clamping components to
    /// `[0, 1]`.
    pub fn set_color(&mut self, i: usize, color: Vec4) -> CoreResult<()> {
        self.check_index(i)?;
        self.colors[i] = color.clamp(Vec4::ZERO, Vec4::ONE);
        Ok(())
    }

    /// Moves control point `i` to a new position. The value is clamped
    /// between the neighboring knots (and into `[0, 1]`) rather than
    /// rejected, so the non-decreasing invariant always holds.
    pub fn set_position(&mut self, i: usize, position: f32) -> CoreResult<()> {
        self.check_index(i)?;
        let k = i + DEGREE;
        let lo = if k == 0 { 0.0 } else { self.knots[k - 1] };
        let hi = self
            .knots
            .get(k + 1)
            .copied()
            .unwrap_or(1.0);
        self.knots[k] = position.clamp(0.0, 1.0).clamp(lo, hi);
        Ok(())
    }

    /// Inserts a control point at `position`, keeping knots sorted.
    /// Fails when the curve already holds [`MAX_CONTROL_POINTS`].
    pub fn insert_point(&mut self, position: f32, color: Vec4) -> CoreResult<()> {
        if self.colors.len() >= MAX_CONTROL_POINTS {
            return Err(CoreError::CurveCapacity {
                max: MAX_CONTROL_POINTS,
                actual: self.colors.len() + 1,
            });
        }
        let position = position.clamp(0.0, 1.0);
        let mut points: Vec<(f32, Vec4)> = self.point_pairs();
        let at = points.partition_point(|(p, _)| *p <= position);
        points.insert(at, (position, color.clamp(Vec4::ZERO, Vec4::ONE)));
        *self = Self::from_points(&points)?;
        Ok(())
    }

    /// Removes control point `i`.
    pub fn remove_point(&mut self, i: usize) -> CoreResult<()> {
        self.check_index(i)?;
        let mut points = self.point_pairs();
        points.remove(i);
        *self = Self::from_points(&points)?;
        Ok(())
    }

    /// The valid evaluation domain `[knots[DEGREE], knots[num_points]]`,
    /// or `None` for an empty curve.
    #[must_use]
    pub fn domain(&self) -> Option<(f32, f32)> {
        if self.colors.is_empty() {
            None
        } else {
            Some((self.knots[DEGREE], self.knots[self.colors.len()]))
        }
    }

    /// Evaluates the curve at parameter `t`.
    ///
    /// Locates the knot span containing `t` (clamped to the valid domain)
    /// and linearly interpolates the two control colors bracketing that
    /// span. At a knot boundary this reproduces the control color exactly.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> Vec4 {
        let n = self.colors.len();
        if n == 0 {
            return Vec4::ZERO;
        }
        if n == 1 {
            return self.colors[0];
        }
        let t = t.clamp(self.knots[DEGREE], self.knots[n]);

        // Largest span index k in [DEGREE, n-1] with knots[k] <= t; the
        // `<=` walk also skips zero-width spans from repeated knots.
        let mut k = DEGREE;
        while k + 1 < n && self.knots[k + 1] <= t {
            k += 1;
        }

        let width = self.knots[k + 1] - self.knots[k];
        if width <= f32::EPSILON {
            return self.colors[k - 1];
        }
        let frac = (t - self.knots[k]) / width;
        self.colors[k - 1].lerp(self.colors[k], frac)
    }

    /// Evaluates the curve into a table of `width` texels, texel `i` at
    /// parameter `i / (width - 1)`. This is exactly what the GPU pass
    /// writes into the lookup texture.
    #[must_use]
    pub fn sample_table(&self, width: u32) -> Vec<Vec4> {
        let denom = (width.max(2) - 1) as f32;
        (0..width)
            .map(|i| self.evaluate(i as f32 / denom))
            .collect()
    }

    fn point_pairs(&self) -> Vec<(f32, Vec4)> {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, c)| (self.knots[i + DEGREE], *c))
            .collect()
    }

    fn check_index(&self, i: usize) -> CoreResult<()> {
        if i < self.colors.len() {
            Ok(())
        } else {
            Err(CoreError::PointIndex {
                index: i,
                len: self.colors.len(),
            })
        }
    }
}

/// The built-in curve: eight points tuned for bone-and-tissue style data.
impl Default for TransferCurve {
    fn default() -> Self {
        let colors = vec![
            Vec4::ZERO,
            Vec4::new(0.125, 0.0, 0.0, 0.0),
            Vec4::new(0.125, 0.0, 0.0, 1.0),
            Vec4::new(0.125, 0.015, 0.015, 0.25),
            Vec4::new(0.25, 0.125, 0.0, 1.0),
            Vec4::new(0.9, 0.8, 0.7, 1.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::ONE,
        ];
        let knots = vec![0.0, 0.0, 0.06, 0.09, 0.25, 0.28, 0.36, 0.44, 1.0, 1.0];
        Self::new(colors, knots).expect("built-in curve satisfies the invariants")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_curve_invariants() {
        let curve = TransferCurve::default();
        assert_eq!(curve.num_points(), 8);
        assert_eq!(curve.knots().len(), 8 + DEGREE + 1);
        assert_eq!(curve.domain(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_knot_arity_rejected() {
        let err = TransferCurve::new(vec![Vec4::ONE; 2], vec![0.0, 0.5, 1.0]);
        assert!(matches!(err, Err(CoreError::KnotArity { expected: 4, .. })));
    }

    #[test]
    fn test_decreasing_knots_rejected() {
        let err = TransferCurve::new(vec![Vec4::ONE; 2], vec![0.0, 0.5, 0.4, 1.0]);
        assert!(matches!(err, Err(CoreError::KnotOrder { index: 2 })));
    }

    #[test]
    fn test_capacity_enforced() {
        let err = TransferCurve::new(vec![Vec4::ONE; 17], vec![0.0; 19]);
        assert!(matches!(err, Err(CoreError::CurveCapacity { .. })));

        let mut curve = TransferCurve::from_points(
            &(0..16)
                .map(|i| (i as f32 / 15.0, Vec4::ONE))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        assert!(matches!(
            curve.insert_point(0.5, Vec4::ONE),
            Err(CoreError::CurveCapacity { .. })
        ));
    }

    #[test]
    fn test_evaluate_mid_span() {
        // The end-to-end case from the design review: eight points, knots
        // [0,0,0.06,0.09,0.25,0.28,0.36,0.44,1,1]. t = 0.075 lies in span
        // [0.06, 0.09) and blends the second and third colors at 0.5.
        let curve = TransferCurve::default();
        let got = curve.evaluate(0.075);
        let expected = curve.colors()[1].lerp(curve.colors()[2], 0.5);
        assert!((got - expected).length() < 1e-6);
    }

    #[test]
    fn test_evaluate_reproduces_color_at_knot() {
        let curve = TransferCurve::default();
        // Interior knot k+1 is where color k peaks; no interpolation error
        // at segment joins.
        for i in 0..curve.num_points() {
            let t = curve.position(i).unwrap();
            let got = curve.evaluate(t);
            // Repeated knots collapse several points onto one parameter;
            // the span walk resolves to the last point at that parameter.
            let expected = curve
                .colors()
                .iter()
                .enumerate()
                .filter(|(j, _)| curve.position(*j).unwrap() == t)
                .map(|(_, c)| *c)
                .last()
                .unwrap();
            assert!(
                (got - expected).length() < 1e-6,
                "point {i} at t = {t}: got {got:?}, expected {expected:?}"
            );
        }
    }

    #[test]
    fn test_evaluate_clamps_outside_domain() {
        let curve = TransferCurve::from_points(&[
            (0.2, Vec4::new(1.0, 0.0, 0.0, 1.0)),
            (0.8, Vec4::new(0.0, 0.0, 1.0, 1.0)),
        ])
        .unwrap();
        assert_eq!(curve.evaluate(0.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(curve.evaluate(1.0), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_curve_is_transparent() {
        assert_eq!(TransferCurve::empty().evaluate(0.5), Vec4::ZERO);
    }

    #[test]
    fn test_single_point_is_constant() {
        let curve = TransferCurve::from_points(&[(0.5, Vec4::ONE)]).unwrap();
        assert_eq!(curve.evaluate(0.0), Vec4::ONE);
        assert_eq!(curve.evaluate(0.5), Vec4::ONE);
        assert_eq!(curve.evaluate(1.0), Vec4::ONE);
    }

    #[test]
    fn test_set_position_clamps_between_neighbors() {
        let mut curve = TransferCurve::default();
        // Point 3 sits between knots 0.06 and 0.25; pushing it past either
        // neighbor clamps instead of breaking the ordering.
        curve.set_position(2, 0.9).unwrap();
        assert_eq!(curve.position(2).unwrap(), 0.25);
        curve.set_position(2, -3.0).unwrap();
        assert_eq!(curve.position(2).unwrap(), 0.06);
        TransferCurve::new(curve.colors().to_vec(), curve.knots().to_vec()).unwrap();
    }

    #[test]
    fn test_insert_and_remove_preserve_invariants() {
        let mut curve = TransferCurve::from_points(&[
            (0.0, Vec4::ZERO),
            (1.0, Vec4::ONE),
        ])
        .unwrap();
        curve.insert_point(0.5, Vec4::new(0.5, 0.5, 0.5, 1.0)).unwrap();
        assert_eq!(curve.num_points(), 3);
        assert_eq!(curve.position(1).unwrap(), 0.5);
        curve.remove_point(1).unwrap();
        assert_eq!(curve.num_points(), 2);
        assert_eq!(curve.knots().len(), 2 + DEGREE + 1);
    }

    #[test]
    fn test_sample_table_endpoints() {
        let curve = TransferCurve::default();
        let table = curve.sample_table(TRANSFER_LUT_WIDTH);
        assert_eq!(table.len(), 512);
        assert_eq!(table[0], curve.evaluate(0.0));
        assert_eq!(table[511], curve.evaluate(1.0));
    }

    proptest! {
        /// Every evaluation lies inside the axis-aligned hull of the
        /// control colors: linear interpolation cannot overshoot.
        #[test]
        fn prop_evaluate_within_color_hull(t in 0.0f32..=1.0) {
            let curve = TransferCurve::default();
            let v = curve.evaluate(t);
            for axis in 0..4 {
                let lo = curve
                    .colors()
                    .iter()
                    .map(|c| c[axis])
                    .fold(f32::INFINITY, f32::min);
                let hi = curve
                    .colors()
                    .iter()
                    .map(|c| c[axis])
                    .fold(f32::NEG_INFINITY, f32::max);
                prop_assert!(v[axis] >= lo - 1e-6 && v[axis] <= hi + 1e-6);
            }
        }

        /// The span walk is monotone: larger parameters never select an
        /// earlier span.
        #[test]
        fn prop_evaluate_is_continuous_under_small_steps(t in 0.0f32..0.999) {
            let curve = TransferCurve::default();
            let a = curve.evaluate(t);
            let b = curve.evaluate(t + 1e-4);
            // The default curve's steepest span is 0.03 wide with colors at
            // most 1 apart per channel, bounding the local slope.
            prop_assert!((b - a).length() < 1e-4 / 0.03 * 2.0 + 1e-5);
        }
    }
}
