/// The objective sense of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjSense {
    /// Minimize the objective function.
    #[default]
    Minimize,
    /// Maximize the objective function.
    Maximize,
}

/// The type of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarType {
    /// The variable is continuous.
    #[default]
    Continuous,
    /// The variable must take an integer value.
    Integer,
}

/// The relation of a constraint's left-hand side to its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsSense {
    /// Left-hand side at most the right-hand side.
    Le,
    /// Left-hand side at least the right-hand side.
    Ge,
    /// Left-hand side equal to the right-hand side.
    Eq,
}

/// A handle to a variable of a [`LinearProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(pub(crate) usize);

impl Var {
    /// The index of the variable in its problem.
    pub fn idx(&self) -> usize {
        self.0
    }
}

/// A handle to a constraint of a [`LinearProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cons(pub(crate) usize);

impl Cons {
    /// The index of the constraint in its problem.
    pub fn idx(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VarData {
    pub(crate) lb: f64,
    pub(crate) ub: f64,
    pub(crate) obj: f64,
    pub(crate) var_type: VarType,
    pub(crate) name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ConsData {
    pub(crate) coefs: Vec<(usize, f64)>,
    pub(crate) sense: ConsSense,
    pub(crate) rhs: f64,
    pub(crate) name: String,
}

/// An explicit, owned linear (or mixed-integer) program.
///
/// This is the value passed across the oracle boundary: a linear objective
/// with a sense, variable bounds and integrality flags, and a list of linear
/// constraints. There is no hidden solver state; appending to the problem is
/// the only way to change it.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    sense: ObjSense,
    pub(crate) vars: Vec<VarData>,
    pub(crate) conss: Vec<ConsData>,
}

impl LinearProgram {
    /// Creates an empty problem with the given objective sense.
    pub fn new(sense: ObjSense) -> Self {
        LinearProgram {
            sense,
            vars: Vec::new(),
            conss: Vec::new(),
        }
    }

    /// Creates an empty minimization problem.
    pub fn minimize() -> Self {
        Self::new(ObjSense::Minimize)
    }

    /// Creates an empty maximization problem.
    pub fn maximize() -> Self {
        Self::new(ObjSense::Maximize)
    }

    /// The objective sense of the problem.
    pub fn sense(&self) -> ObjSense {
        self.sense
    }

    /// Adds a new variable with the given lower bound, upper bound, objective
    /// coefficient, name, and type.
    pub fn add_var(&mut self, lb: f64, ub: f64, obj: f64, name: &str, var_type: VarType) -> Var {
        self.vars.push(VarData {
            lb,
            ub,
            obj,
            var_type,
            name: name.to_string(),
        });
        Var(self.vars.len() - 1)
    }

    /// Adds a new linear constraint over the given variables.
    pub fn add_cons(&mut self, coefs: &[(Var, f64)], sense: ConsSense, rhs: f64, name: &str) -> Cons {
        self.conss.push(ConsData {
            coefs: coefs.iter().map(|&(var, coef)| (var.0, coef)).collect(),
            sense,
            rhs,
            name: name.to_string(),
        });
        Cons(self.conss.len() - 1)
    }

    /// Adds a value built with the fluent builder API, e.g.
    /// `prob.add(var().integer(0, 4).obj(1.0))`.
    pub fn add<T: crate::builder::CanBeAddedToProblem>(&mut self, item: T) -> T::Return {
        item.add(self)
    }

    /// Adds a coefficient for `var` to an existing constraint.
    pub fn add_cons_coef(&mut self, cons: Cons, var: Var, coef: f64) {
        self.conss[cons.0].coefs.push((var.0, coef));
    }

    /// Sets the objective coefficient of a variable.
    pub fn set_obj(&mut self, var: Var, obj: f64) {
        self.vars[var.0].obj = obj;
    }

    /// Sets the bounds of a variable.
    pub fn set_bounds(&mut self, var: Var, lb: f64, ub: f64) {
        self.vars[var.0].lb = lb;
        self.vars[var.0].ub = ub;
    }

    /// Sets the type of a variable.
    pub fn set_var_type(&mut self, var: Var, var_type: VarType) {
        self.vars[var.0].var_type = var_type;
    }

    /// The name of a variable.
    pub fn var_name(&self, var: Var) -> &str {
        &self.vars[var.0].name
    }

    /// The name of a constraint.
    pub fn cons_name(&self, cons: Cons) -> &str {
        &self.conss[cons.0].name
    }

    /// The number of variables in the problem.
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    /// The number of constraints in the problem.
    pub fn n_conss(&self) -> usize {
        self.conss.len()
    }

    /// Whether every variable is continuous.
    pub fn is_pure_lp(&self) -> bool {
        self.vars.iter().all(|v| v.var_type == VarType::Continuous)
    }

    /// The LP relaxation of the problem: the same data with every integrality
    /// flag dropped.
    pub fn relax(&self) -> LinearProgram {
        let mut relaxed = self.clone();
        for var in &mut relaxed.vars {
            var.var_type = VarType::Continuous;
        }
        relaxed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_vars_and_conss() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add_var(0.0, f64::INFINITY, 2.0, "x", VarType::Continuous);
        let y = prob.add_var(0.0, 5.0, 3.0, "y", VarType::Integer);
        let c = prob.add_cons(&[(x, 1.0), (y, 1.0)], ConsSense::Ge, 10.0, "cover");

        assert_eq!(prob.n_vars(), 2);
        assert_eq!(prob.n_conss(), 1);
        assert_eq!(prob.var_name(x), "x");
        assert_eq!(prob.cons_name(c), "cover");
        assert_eq!(x.idx(), 0);
        assert_eq!(c.idx(), 0);
        assert!(!prob.is_pure_lp());
    }

    #[test]
    fn relax_drops_integrality() {
        let mut prob = LinearProgram::maximize();
        prob.add_var(0.0, 1.0, 1.0, "b", VarType::Integer);
        assert!(!prob.is_pure_lp());
        assert!(prob.relax().is_pure_lp());
        // the original is untouched
        assert!(!prob.is_pure_lp());
    }

    #[test]
    fn add_cons_coef_extends_row() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add_var(0.0, f64::INFINITY, 1.0, "x", VarType::Continuous);
        let c = prob.add_cons(&[(x, 1.0)], ConsSense::Le, 4.0, "cap");
        let y = prob.add_var(0.0, f64::INFINITY, 1.0, "y", VarType::Continuous);
        prob.add_cons_coef(c, y, 2.0);
        assert_eq!(prob.conss[0].coefs, vec![(0, 1.0), (1, 2.0)]);
    }
}
