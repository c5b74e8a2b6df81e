//! Piecewise-linear functions of one variable.
//!
//! A function is stored as a slope before the first breakpoint, the breakpoints themselves and a
//! slope after the last one. It can be built either from the breakpoints directly or from the
//! slope of each segment.
use crate::lp::{Error, Result};
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    pre_slope: f64,
    /// (x, y), strictly increasing in x
    breaks: Vec<(f64, f64)>,
    post_slope: f64,
}

impl PiecewiseLinear {
    /// Builds the function from its breakpoints and the slopes before the first and after the
    /// last breakpoint.
    pub fn from_breakpoints(
        pre_slope: f64,
        breaks: &[(f64, f64)],
        post_slope: f64,
    ) -> Result<PiecewiseLinear> {
        check_finite(
            [pre_slope, post_slope]
                .into_iter()
                .chain(breaks.iter().flat_map(|(x, y)| [*x, *y])),
        )?;
        check_increasing(breaks.iter().map(|(x, _)| *x))?;

        Ok(PiecewiseLinear {
            pre_slope,
            breaks: breaks.to_vec(),
            post_slope,
        })
    }

    /// Builds the function from `(slope, x)` pairs: each slope holds up to its `x`, and
    /// `last_slope` holds after the last one. The function passes through `anchor`.
    ///
    /// ```
    /// use ormodels::piecewise::PiecewiseLinear;
    ///
    /// let f = PiecewiseLinear::from_slopes(&[(0.0, 0.0), (0.5, 10.0)], 1.0, (0.0, 0.0)).unwrap();
    /// assert_eq!(f.evaluate(-3.0), 0.0);
    /// assert_eq!(f.evaluate(10.0), 5.0);
    /// assert_eq!(f.evaluate(12.0), 7.0);
    /// ```
    pub fn from_slopes(
        slope_breaks: &[(f64, f64)],
        last_slope: f64,
        anchor: (f64, f64),
    ) -> Result<PiecewiseLinear> {
        check_finite(
            [last_slope, anchor.0, anchor.1]
                .into_iter()
                .chain(slope_breaks.iter().flat_map(|(s, x)| [*s, *x])),
        )?;
        check_increasing(slope_breaks.iter().map(|(_, x)| *x))?;

        // integrate the slopes from y = 0 at the first breakpoint
        let mut breaks = Vec::with_capacity(slope_breaks.len());
        let mut y = 0.0;
        for (k, (slope, x)) in slope_breaks.iter().enumerate() {
            if k > 0 {
                y += slope * (x - slope_breaks[k - 1].1);
            }
            breaks.push((*x, y));
        }

        let mut function = PiecewiseLinear {
            pre_slope: slope_breaks[0].0,
            breaks,
            post_slope: last_slope,
        };

        // shift vertically so that the function goes through the anchor
        let offset = anchor.1 - function.evaluate(anchor.0);
        function.breaks.iter_mut().for_each(|(_, y)| *y += offset);
        Ok(function)
    }

    /// The value at `x`. NaN stays NaN.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let (x0, y0) = self.breaks[0];
        let (xn, yn) = self.breaks[self.breaks.len() - 1];
        if x <= x0 {
            return y0 + self.pre_slope * (x - x0);
        }
        if x >= xn {
            return yn + self.post_slope * (x - xn);
        }

        // x0 < x < xn, so some segment contains x
        let segment = self
            .breaks
            .iter()
            .tuple_windows()
            .find(|((_, _), (xb, _))| x <= *xb);
        match segment {
            Some(((xa, ya), (xb, yb))) => ya + (yb - ya) * (x - xa) / (xb - xa),
            None => yn,
        }
    }

    pub fn breakpoints(&self) -> &[(f64, f64)] {
        &self.breaks
    }

    /// The slope of every piece, from left to right (pre-slope first, post-slope last)
    pub fn slopes(&self) -> Vec<f64> {
        std::iter::once(self.pre_slope)
            .chain(
                self.breaks
                    .iter()
                    .tuple_windows()
                    .map(|((xa, ya), (xb, yb))| (yb - ya) / (xb - xa)),
            )
            .chain(std::iter::once(self.post_slope))
            .collect()
    }

    /// True if no piece decreases
    pub fn is_increasing(&self) -> bool {
        self.slopes().iter().all(|s| *s >= 0.0)
    }

    /// True if the slopes never decrease from left to right
    pub fn is_convex(&self) -> bool {
        self.slopes().iter().tuple_windows().all(|(a, b)| a <= b)
    }

    /// The points needed to draw the function on `[lx, rx]`: both ends and every breakpoint in
    /// between.
    pub fn sample(&self, lx: f64, rx: f64) -> Result<Vec<(f64, f64)>> {
        if !(lx < rx) {
            return Err(Error::InvalidData(format!("empty range [{}, {}]", lx, rx)));
        }
        let inner = self
            .breaks
            .iter()
            .copied()
            .filter(|(x, _)| lx < *x && *x < rx);
        Ok(std::iter::once((lx, self.evaluate(lx)))
            .chain(inner)
            .chain(std::iter::once((rx, self.evaluate(rx))))
            .collect())
    }
}

/// The tutorial's shipping cost: 0.4 per unit up to 1000 units, 0.2 up to 3000, then 0.1
pub fn example_slopes() -> Result<PiecewiseLinear> {
    PiecewiseLinear::from_slopes(&[(0.0, 0.0), (0.4, 1000.0), (0.2, 3000.0)], 0.1, (0.0, 0.0))
}

/// The same function as [`example_slopes`], built from its breakpoints
pub fn example_breakpoints() -> Result<PiecewiseLinear> {
    PiecewiseLinear::from_breakpoints(0.0, &[(0.0, 0.0), (1000.0, 400.0), (3000.0, 800.0)], 0.1)
}

fn check_finite(values: impl Iterator<Item = f64>) -> Result<()> {
    let mut values = values;
    match values.all(f64::is_finite) {
        true => Ok(()),
        false => Err(Error::NonFinite("piecewise-linear function".to_string())),
    }
}

fn check_increasing(xs: impl Iterator<Item = f64>) -> Result<()> {
    let xs: Vec<f64> = xs.collect();
    if xs.is_empty() {
        return Err(Error::InvalidData("at least one breakpoint is required".to_string()));
    }
    match xs.iter().tuple_windows().all(|(a, b)| a < b) {
        true => Ok(()),
        false => Err(Error::InvalidData(format!(
            "breakpoints must be strictly increasing: {:?}",
            xs
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: [f64; 7] = [-1.0, 0.0, 500.0, 1000.0, 2000.0, 3000.0, 4000.0];

    #[test]
    fn both_constructions_agree() {
        let by_slopes = example_slopes().unwrap();
        let by_breaks = example_breakpoints().unwrap();
        for x in XS {
            assert!(
                (by_slopes.evaluate(x) - by_breaks.evaluate(x)).abs() < 1e-9,
                "x = {}",
                x
            );
        }
        assert_eq!(by_slopes.breakpoints(), by_breaks.breakpoints());
    }

    #[test]
    fn example_values() {
        let f = example_breakpoints().unwrap();
        let expected = [0.0, 0.0, 200.0, 400.0, 600.0, 800.0, 900.0];
        for (x, y) in XS.iter().zip(expected) {
            assert!((f.evaluate(*x) - y).abs() < 1e-9);
        }
        assert_eq!(f.slopes(), vec![0.0, 0.4, 0.2, 0.1]);
        assert!(f.is_increasing());
        assert!(!f.is_convex());
    }

    #[test]
    fn anchor_shifts_the_function() {
        let f = PiecewiseLinear::from_slopes(&[(1.0, 0.0), (2.0, 5.0)], 3.0, (5.0, 100.0)).unwrap();
        assert_eq!(f.evaluate(5.0), 100.0);
        assert_eq!(f.evaluate(0.0), 90.0);
        assert_eq!(f.evaluate(-1.0), 89.0);
        assert_eq!(f.evaluate(6.0), 103.0);
        assert!(f.is_convex());
    }

    #[test]
    fn sample_includes_inner_breakpoints() {
        let f = example_slopes().unwrap();
        let points = f.sample(-1.0, 4000.0).unwrap();
        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![-1.0, 0.0, 1000.0, 3000.0, 4000.0]);
        assert_eq!(points.last(), Some(&(4000.0, 900.0)));
        assert!(f.sample(5.0, 5.0).is_err());
        assert!(f.sample(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn nan_input_gives_nan() {
        let f = example_breakpoints().unwrap();
        assert!(f.evaluate(f64::NAN).is_nan());
        assert_eq!(f.evaluate(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn rejects_bad_breakpoints() {
        assert!(PiecewiseLinear::from_breakpoints(0.0, &[], 1.0).is_err());
        assert!(PiecewiseLinear::from_breakpoints(0.0, &[(1.0, 0.0), (1.0, 2.0)], 1.0).is_err());
        assert!(PiecewiseLinear::from_slopes(&[(0.0, 2.0), (1.0, 1.0)], 1.0, (0.0, 0.0)).is_err());
        assert!(PiecewiseLinear::from_breakpoints(f64::NAN, &[(0.0, 0.0)], 1.0).is_err());
    }
}
