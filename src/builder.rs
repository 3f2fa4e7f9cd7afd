use crate::problem::{Cons, ConsSense, LinearProgram, Var, VarType};

/// A trait for values that can be added to a problem.
pub trait CanBeAddedToProblem {
    /// The return type after adding to the problem (e.g. `Var` / `Cons`).
    type Return;
    /// How to add the value to the problem.
    fn add(&self, prob: &mut LinearProgram) -> Self::Return;
}

/// Creates a new default variable builder.
pub fn var() -> VarBuilder {
    VarBuilder::default()
}

/// Creates a new default constraint builder.
pub fn cons() -> ConsBuilder {
    ConsBuilder::default()
}

/// A builder for variables.
pub struct VarBuilder {
    name: Option<String>,
    obj: f64,
    lb: f64,
    ub: f64,
    var_type: VarType,
}

impl Default for VarBuilder {
    fn default() -> Self {
        VarBuilder {
            name: None,
            obj: 0.0,
            lb: 0.0,
            ub: f64::INFINITY,
            var_type: VarType::Continuous,
        }
    }
}

impl VarBuilder {
    /// Sets the variable to be an integer variable.
    pub fn integer(mut self, lb: isize, ub: isize) -> Self {
        self.lb = lb as f64;
        self.ub = ub as f64;
        self.var_type = VarType::Integer;
        self
    }

    /// Sets the variable to be a continuous variable.
    pub fn continuous(mut self, lb: f64, ub: f64) -> Self {
        self.lb = lb;
        self.ub = ub;
        self.var_type = VarType::Continuous;
        self
    }

    /// Sets the name of the variable.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the objective coefficient of the variable.
    pub fn obj(mut self, obj: f64) -> Self {
        self.obj = obj;
        self
    }
}

impl CanBeAddedToProblem for VarBuilder {
    type Return = Var;
    fn add(&self, prob: &mut LinearProgram) -> Var {
        let name = self.name.clone().unwrap_or_else(|| {
            let n_vars = prob.n_vars();
            format!("x{}", n_vars)
        });

        prob.add_var(self.lb, self.ub, self.obj, &name, self.var_type)
    }
}

/// A builder for linear constraints.
pub struct ConsBuilder {
    name: Option<String>,
    coefs: Vec<(Var, f64)>,
    sense: ConsSense,
    rhs: f64,
}

impl Default for ConsBuilder {
    fn default() -> Self {
        ConsBuilder {
            name: None,
            coefs: Vec::new(),
            sense: ConsSense::Le,
            rhs: 0.0,
        }
    }
}

impl ConsBuilder {
    /// Adds a term to the constraint's left-hand side.
    pub fn coef(mut self, var: Var, coef: f64) -> Self {
        self.coefs.push((var, coef));
        self
    }

    /// Adds all given terms to the constraint's left-hand side.
    pub fn expr<I: IntoIterator<Item = (Var, f64)>>(mut self, terms: I) -> Self {
        self.coefs.extend(terms);
        self
    }

    /// Makes the constraint a less-than-or-equal constraint with the given
    /// right-hand side.
    pub fn le(mut self, rhs: f64) -> Self {
        self.sense = ConsSense::Le;
        self.rhs = rhs;
        self
    }

    /// Makes the constraint a greater-than-or-equal constraint with the given
    /// right-hand side.
    pub fn ge(mut self, rhs: f64) -> Self {
        self.sense = ConsSense::Ge;
        self.rhs = rhs;
        self
    }

    /// Makes the constraint an equality constraint with the given right-hand
    /// side.
    pub fn eq(mut self, rhs: f64) -> Self {
        self.sense = ConsSense::Eq;
        self.rhs = rhs;
        self
    }

    /// Sets the name of the constraint.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl CanBeAddedToProblem for ConsBuilder {
    type Return = Cons;
    fn add(&self, prob: &mut LinearProgram) -> Cons {
        let name = self.name.clone().unwrap_or_else(|| {
            let n_conss = prob.n_conss();
            format!("c{}", n_conss)
        });

        prob.add_cons(&self.coefs, self.sense, self.rhs, &name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_builder() {
        let var = VarBuilder::default()
            .name("x")
            .obj(1.0)
            .continuous(0.0, 1.0);

        assert_eq!(var.name, Some("x".to_string()));
        assert_eq!(var.obj, 1.0);
        assert_eq!(var.lb, 0.0);
        assert_eq!(var.ub, 1.0);
    }

    #[test]
    fn test_var_builder_add() {
        let mut prob = LinearProgram::maximize();
        let x = prob.add(var().name("x").obj(1.0).continuous(0.0, 1.0));

        assert_eq!(prob.n_vars(), 1);
        assert_eq!(prob.var_name(x), "x");
    }

    #[test]
    fn test_cons_builder_add() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().integer(0, 4).obj(1.0));
        let y = prob.add(var().integer(0, 4).obj(1.0));
        let c = prob.add(cons().coef(x, 2.0).coef(y, 3.0).ge(6.0).name("need"));

        assert_eq!(prob.n_conss(), 1);
        assert_eq!(prob.cons_name(c), "need");
        // default names follow the variable count
        assert_eq!(prob.var_name(x), "x0");
        assert_eq!(prob.var_name(y), "x1");
    }
}
