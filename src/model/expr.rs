//! Scalar quadratic expressions over decision variables.
//!
//! Expressive enough for the waypoint problem and nothing more: a constant,
//! linear terms, and shifted squares `coeff * (x - center)^2`. Circle
//! constraints in distance-squared form fall out of [`square_about`].

use std::ops::{Add, Mul};

use super::Variable;

#[derive(Debug, Clone, Default)]
pub struct QuadExpr {
    constant: f64,
    linear: Vec<(Variable, f64)>,
    squares: Vec<(Variable, f64, f64)>, // (var, coeff, center)
}

/// The linear term `1.0 * v`.
pub fn term(v: Variable) -> QuadExpr {
    QuadExpr {
        linear: vec![(v, 1.0)],
        ..QuadExpr::default()
    }
}

/// The square term `v^2`.
pub fn square(v: Variable) -> QuadExpr {
    square_about(v, 0.0)
}

/// The shifted square `(v - center)^2`.
pub fn square_about(v: Variable, center: f64) -> QuadExpr {
    QuadExpr {
        squares: vec![(v, 1.0, center)],
        ..QuadExpr::default()
    }
}

impl QuadExpr {
    pub fn value(&self, x: &[f64]) -> f64 {
        let mut acc = self.constant;
        for (v, coeff) in &self.linear {
            acc += coeff * x[v.index()];
        }
        for (v, coeff, center) in &self.squares {
            let d = x[v.index()] - center;
            acc += coeff * d * d;
        }
        acc
    }

    /// Accumulate `scale * d(expr)/dx` into `grad`.
    pub fn add_gradient(&self, x: &[f64], scale: f64, grad: &mut [f64]) {
        for (v, coeff) in &self.linear {
            grad[v.index()] += scale * coeff;
        }
        for (v, coeff, center) in &self.squares {
            grad[v.index()] += scale * 2.0 * coeff * (x[v.index()] - center);
        }
    }

    /// Largest variable index referenced, if any.
    pub fn max_var_index(&self) -> Option<usize> {
        self.linear
            .iter()
            .map(|(v, _)| v.index())
            .chain(self.squares.iter().map(|(v, _, _)| v.index()))
            .max()
    }

    pub fn geq(self, bound: f64) -> Constraint {
        Constraint {
            expr: self,
            sense: Sense::Geq,
            bound,
        }
    }

    pub fn leq(self, bound: f64) -> Constraint {
        Constraint {
            expr: self,
            sense: Sense::Leq,
            bound,
        }
    }
}

impl Add for QuadExpr {
    type Output = QuadExpr;

    fn add(mut self, rhs: QuadExpr) -> QuadExpr {
        self.constant += rhs.constant;
        self.linear.extend(rhs.linear);
        self.squares.extend(rhs.squares);
        self
    }
}

impl Mul<QuadExpr> for f64 {
    type Output = QuadExpr;

    fn mul(self, mut rhs: QuadExpr) -> QuadExpr {
        rhs.constant *= self;
        for (_, coeff) in &mut rhs.linear {
            *coeff *= self;
        }
        for (_, coeff, _) in &mut rhs.squares {
            *coeff *= self;
        }
        rhs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Geq,
    Leq,
}

/// An inequality `expr >= bound` or `expr <= bound`.
#[derive(Debug, Clone)]
pub struct Constraint {
    expr: QuadExpr,
    sense: Sense,
    bound: f64,
}

impl Constraint {
    /// Residual in `g(x) <= 0` form; positive means violated.
    pub fn residual(&self, x: &[f64]) -> f64 {
        match self.sense {
            Sense::Geq => self.bound - self.expr.value(x),
            Sense::Leq => self.expr.value(x) - self.bound,
        }
    }

    /// Accumulate `scale * d(residual)/dx` into `grad`.
    pub fn add_residual_gradient(&self, x: &[f64], scale: f64, grad: &mut [f64]) {
        let sign = match self.sense {
            Sense::Geq => -scale,
            Sense::Leq => scale,
        };
        self.expr.add_gradient(x, sign, grad);
    }

    pub fn violation(&self, x: &[f64]) -> f64 {
        self.residual(x).max(0.0)
    }

    pub fn max_var_index(&self) -> Option<usize> {
        self.expr.max_var_index()
    }
}
