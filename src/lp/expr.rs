use super::model::Var;
use itertools::Itertools;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A linear expression `Σ coeff * var + constant`.
///
/// Terms are kept in insertion order and may repeat a variable until [`LinExpr::compact`]
/// merges them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(Var, f64)>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> LinExpr {
        LinExpr::default()
    }

    pub fn add_term(&mut self, coeff: f64, var: Var) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn add_constant(&mut self, constant: f64) -> &mut Self {
        self.constant += constant;
        self
    }

    /// The raw (uncompacted) terms of the expression
    pub fn terms(&self) -> &[(Var, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Merges repeated variables and drops zero coefficients. Terms end up ordered by variable.
    pub fn compact(mut self) -> LinExpr {
        self.terms.sort_by_key(|(var, _)| *var);
        self.terms = self
            .terms
            .into_iter()
            .coalesce(|(v1, c1), (v2, c2)| {
                if v1 == v2 {
                    Ok((v1, c1 + c2))
                } else {
                    Err(((v1, c1), (v2, c2)))
                }
            })
            .filter(|(_, coeff)| *coeff != 0.0)
            .collect();
        self
    }

    /// True if the expression does not reference any variable (after merging terms)
    pub fn is_constant(&self) -> bool {
        self.clone().compact().terms.is_empty()
    }

    /// Evaluates the expression with a value lookup for each variable
    pub fn evaluate<F: FnMut(Var) -> f64>(&self, mut value: F) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * value(*var))
            .sum::<f64>()
            + self.constant
    }

    fn scale(mut self, factor: f64) -> LinExpr {
        self.terms.iter_mut().for_each(|(_, coeff)| *coeff *= factor);
        self.constant *= factor;
        self
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .terms
            .iter()
            .map(|(var, coeff)| format!("{}·{}", coeff, var))
            .join(" + ");
        match (body.is_empty(), self.constant) {
            (true, c) => write!(f, "{}", c),
            (false, c) if c == 0.0 => write!(f, "{}", body),
            (false, c) => write!(f, "{} + {}", body, c),
        }
    }
}

impl From<Var> for LinExpr {
    fn from(var: Var) -> Self {
        LinExpr {
            terms: vec![(var, 1.0)],
            constant: 0.0,
        }
    }
}

impl From<&Var> for LinExpr {
    fn from(var: &Var) -> Self {
        LinExpr::from(*var)
    }
}

impl From<f64> for LinExpr {
    fn from(constant: f64) -> Self {
        LinExpr {
            terms: Vec::new(),
            constant,
        }
    }
}

impl From<&LinExpr> for LinExpr {
    fn from(expr: &LinExpr) -> Self {
        expr.clone()
    }
}

impl<R: Into<LinExpr>> AddAssign<R> for LinExpr {
    fn add_assign(&mut self, rhs: R) {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl<R: Into<LinExpr>> Add<R> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: R) -> LinExpr {
        self += rhs;
        self
    }
}

impl<R: Into<LinExpr>> Sub<R> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: R) -> LinExpr {
        self += rhs.into().scale(-1.0);
        self
    }
}

impl<R: Into<LinExpr>> Add<R> for Var {
    type Output = LinExpr;

    fn add(self, rhs: R) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<R: Into<LinExpr>> Sub<R> for Var {
    type Output = LinExpr;

    fn sub(self, rhs: R) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Add<Var> for f64 {
    type Output = LinExpr;

    fn add(self, rhs: Var) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl Add<LinExpr> for f64 {
    type Output = LinExpr;

    fn add(self, rhs: LinExpr) -> LinExpr {
        rhs + self
    }
}

impl Sub<Var> for f64 {
    type Output = LinExpr;

    fn sub(self, rhs: Var) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Sub<LinExpr> for f64 {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Mul<f64> for Var {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr::from(self).scale(rhs)
    }
}

impl Mul<Var> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: Var) -> LinExpr {
        LinExpr::from(rhs).scale(self)
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        self.scale(rhs)
    }
}

impl Mul<LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs.scale(self)
    }
}

impl Neg for Var {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        LinExpr::from(self).scale(-1.0)
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scale(-1.0)
    }
}

impl<T: Into<LinExpr>> Sum<T> for LinExpr {
    fn sum<I: Iterator<Item = T>>(iter: I) -> Self {
        iter.fold(LinExpr::new(), |acc, e| acc + e)
    }
}

/// Summation over anything that turns into linear expressions, e.g. `x[i].iter().lin_sum()`
pub trait LinSum {
    fn lin_sum(self) -> LinExpr;
}

impl<I> LinSum for I
where
    I: IntoIterator,
    I::Item: Into<LinExpr>,
{
    fn lin_sum(self) -> LinExpr {
        self.into_iter().sum()
    }
}

/// Comparison of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    Le,
    Eq,
    Ge,
}

impl Cmp {
    /// Checks `lhs cmp rhs` with an absolute tolerance
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Cmp::Le => lhs <= rhs + tolerance,
            Cmp::Eq => (lhs - rhs).abs() <= tolerance,
            Cmp::Ge => lhs + tolerance >= rhs,
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmp::Le => write!(f, "<="),
            Cmp::Eq => write!(f, "=="),
            Cmp::Ge => write!(f, ">="),
        }
    }
}

/// A linear constraint `lhs cmp rhs`. Usually built with [`c!`](crate::c).
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub lhs: LinExpr,
    pub cmp: Cmp,
    pub rhs: LinExpr,
}

impl Constraint {
    pub fn new(lhs: impl Into<LinExpr>, cmp: Cmp, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint {
            lhs: lhs.into(),
            cmp,
            rhs: rhs.into(),
        }
    }

    /// Moves everything to the left-hand side: returns `(terms, cmp, rhs)` where the terms are
    /// compacted and `rhs` is a plain number.
    pub fn normalized(&self) -> (Vec<(Var, f64)>, Cmp, f64) {
        let expr = (self.lhs.clone() - &self.rhs).compact();
        (expr.terms, self.cmp, -expr.constant)
    }

    /// All variables referenced by either side
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.lhs
            .terms
            .iter()
            .chain(self.rhs.terms.iter())
            .map(|(var, _)| *var)
    }

    /// All numbers appearing in the constraint
    pub(crate) fn coefficients(&self) -> impl Iterator<Item = f64> + '_ {
        self.lhs
            .terms
            .iter()
            .chain(self.rhs.terms.iter())
            .map(|(_, coeff)| *coeff)
            .chain([self.lhs.constant, self.rhs.constant])
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.cmp, self.rhs)
    }
}

/// Builds a [`Constraint`] from `lhs <= rhs`, `lhs == rhs` or `lhs >= rhs`.
///
/// ```
/// use ormodels::c;
/// use ormodels::lp::{Cmp, Model};
///
/// let mut model = Model::new("example");
/// let desk = model.integer_var("desk").unwrap();
/// let cell = model.integer_var("cell").unwrap();
/// let constr = c!(0.2 * desk + 0.4 * cell <= 401.0);
/// assert_eq!(constr.cmp, Cmp::Le);
/// ```
#[macro_export]
macro_rules! c {
    (@lhs [$($lhs:tt)+] <= $($rhs:tt)+) => {
        $crate::lp::Constraint::new($($lhs)+, $crate::lp::Cmp::Le, $($rhs)+)
    };
    (@lhs [$($lhs:tt)+] == $($rhs:tt)+) => {
        $crate::lp::Constraint::new($($lhs)+, $crate::lp::Cmp::Eq, $($rhs)+)
    };
    (@lhs [$($lhs:tt)+] >= $($rhs:tt)+) => {
        $crate::lp::Constraint::new($($lhs)+, $crate::lp::Cmp::Ge, $($rhs)+)
    };
    (@lhs [$($lhs:tt)*]) => {
        compile_error!("expected a comparison: `<=`, `==` or `>=`")
    };
    (@lhs [$($lhs:tt)*] $head:tt $($rest:tt)*) => {
        $crate::c!(@lhs [$($lhs)* $head] $($rest)*)
    };
    ($($t:tt)+) => {
        $crate::c!(@lhs [] $($t)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::Model;

    #[test]
    fn compact_merges_and_drops_zero_terms() {
        let mut model = Model::new("t");
        let x = model.continuous_var("x").unwrap();
        let y = model.continuous_var("y").unwrap();

        let expr = (2.0 * x + y - x + 3.0 - y).compact();
        assert_eq!(expr.terms(), &[(x, 1.0)]);
        assert_eq!(expr.constant(), 3.0);
        assert!(!expr.is_constant());
        assert!((y - y + 1.0).is_constant());
    }

    #[test]
    fn complement_of_binary() {
        let mut model = Model::new("t");
        let z = model.binary_var("z").unwrap();

        let expr = 430.0 * (1.0 - z);
        assert_eq!(expr.evaluate(|_| 0.0), 430.0);
        assert_eq!(expr.evaluate(|_| 1.0), 0.0);
    }

    #[test]
    fn macro_moves_everything_left() {
        let mut model = Model::new("t");
        let desk = model.integer_var("desk").unwrap();
        let desk1 = model.integer_var("desk1").unwrap();
        let desk2 = model.integer_var("desk2").unwrap();

        let constr = c!(desk == desk1 + desk2);
        let (terms, cmp, rhs) = constr.normalized();
        assert_eq!(cmp, Cmp::Eq);
        assert_eq!(terms, vec![(desk, 1.0), (desk1, -1.0), (desk2, -1.0)]);
        assert_eq!(rhs, 0.0);

        let constr = c!(0.2 * desk1 + 5.0 >= 100.0);
        let (_, cmp, rhs) = constr.normalized();
        assert_eq!(cmp, Cmp::Ge);
        assert_eq!(rhs, 95.0);
    }

    #[test]
    fn sums_over_references() {
        let mut model = Model::new("t");
        let xs: Vec<Var> = (0..3)
            .map(|i| model.continuous_var(&format!("x_{}", i)).unwrap())
            .collect();
        let expr = xs.iter().lin_sum();
        assert_eq!(expr.evaluate(|_| 2.0), 6.0);
    }

    #[test]
    fn cmp_tolerance() {
        assert!(Cmp::Le.holds(1.0 + 1e-9, 1.0, 1e-6));
        assert!(!Cmp::Ge.holds(0.9, 1.0, 1e-6));
        assert!(Cmp::Eq.holds(2.0, 2.0, 0.0));
    }
}
