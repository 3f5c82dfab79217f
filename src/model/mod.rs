//! Problem formulation: scalar decision variables, quadratic expressions,
//! inequality constraints, one objective.

mod expr;

pub use expr::{square, square_about, term, Constraint, QuadExpr, Sense};

/// Handle to one scalar decision variable of a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable(usize);

impl Variable {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A one-shot optimization problem instance.
///
/// Variables may be declared without ever appearing in a constraint or the
/// objective; they simply stay at their initial value. Without an objective
/// the problem is pure constraint satisfaction.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    names: Vec<String>,
    constraints: Vec<Constraint>,
    objective: Option<QuadExpr>,
}

impl Problem {
    pub fn new() -> Self {
        Problem::default()
    }

    pub fn variable(&mut self, name: &str) -> Variable {
        self.names.push(name.to_string());
        Variable(self.names.len() - 1)
    }

    pub fn subject_to(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn minimize(&mut self, objective: QuadExpr) {
        self.objective = Some(objective);
    }

    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    /// Name `v` was declared with.
    ///
    /// Panics when `v` belongs to a larger problem than this one.
    pub fn variable_name(&self, v: Variable) -> &str {
        match self.names.get(v.index()) {
            Some(name) => name,
            None => panic!(
                "variable {} was not declared on this problem ({} variables)",
                v.index(),
                self.names.len()
            ),
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective value at `x`; zero when no objective was set.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.as_ref().map_or(0.0, |obj| obj.value(x))
    }

    pub(crate) fn objective(&self) -> Option<&QuadExpr> {
        self.objective.as_ref()
    }

    /// Largest variable index referenced anywhere in the problem.
    pub(crate) fn max_referenced_index(&self) -> Option<usize> {
        self.constraints
            .iter()
            .filter_map(Constraint::max_var_index)
            .chain(self.objective.iter().filter_map(|o| o.max_var_index()))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_indexed_in_declaration_order() {
        let mut problem = Problem::new();
        let f = problem.variable("F");
        let s = problem.variable("s");
        assert_eq!(f.index(), 0);
        assert_eq!(s.index(), 1);
        assert_eq!(problem.variable_name(s), "s");
        assert_eq!(problem.num_variables(), 2);
    }

    #[test]
    #[should_panic(expected = "was not declared on this problem")]
    fn variable_name_rejects_a_foreign_handle() {
        let mut donor = Problem::new();
        let _a = donor.variable("a");
        let b = donor.variable("b");

        let mut problem = Problem::new();
        let _x = problem.variable("x");
        problem.variable_name(b);
    }

    #[test]
    fn objective_defaults_to_zero() {
        let mut problem = Problem::new();
        let x = problem.variable("x");
        problem.subject_to(square(x).leq(1.0));
        assert_eq!(problem.objective_value(&[0.5]), 0.0);
    }

    #[test]
    fn unused_variables_are_tracked_but_unreferenced() {
        let mut problem = Problem::new();
        let _f = problem.variable("F");
        let _s = problem.variable("s");
        let x = problem.variable("x");
        let y = problem.variable("y");
        problem.subject_to((square(x) + square(y)).geq(9.0));
        assert_eq!(problem.num_variables(), 4);
        assert_eq!(problem.max_referenced_index(), Some(3));
    }
}
