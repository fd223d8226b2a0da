//! Symbolic expressions over a positional input vector

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

/// Unary math functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathFn {
    Exp,
    Tanh,
    Sin,
    Cos,
    Atan,
    Abs,
}

impl MathFn {
    pub fn name(&self) -> &'static str {
        match self {
            MathFn::Exp => "exp",
            MathFn::Tanh => "tanh",
            MathFn::Sin => "sin",
            MathFn::Cos => "cos",
            MathFn::Atan => "atan",
            MathFn::Abs => "abs",
        }
    }

    fn apply(&self, x: f64) -> f64 {
        match self {
            MathFn::Exp => x.exp(),
            MathFn::Tanh => x.tanh(),
            MathFn::Sin => x.sin(),
            MathFn::Cos => x.cos(),
            MathFn::Atan => x.atan(),
            MathFn::Abs => x.abs(),
        }
    }
}

/// Expression tree; `Var(k)` reads the k-th component of the input vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var(usize),
    Const(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(MathFn, Box<Expr>),
}

impl Expr {
    pub fn var(index: usize) -> Self {
        Expr::Var(index)
    }

    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    pub fn neg(inner: Expr) -> Self {
        Expr::Neg(Box::new(inner))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryOp::Add, Box::new(lhs), Box::new(rhs))
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryOp::Sub, Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryOp::Mul, Box::new(lhs), Box::new(rhs))
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryOp::Div, Box::new(lhs), Box::new(rhs))
    }

    pub fn call(func: MathFn, arg: Expr) -> Self {
        Expr::Call(func, Box::new(arg))
    }

    /// Evaluate against `inputs`; out-of-range variables read as NaN
    pub fn eval(&self, inputs: &[f64]) -> f64 {
        match self {
            Expr::Var(k) => inputs.get(*k).copied().unwrap_or(f64::NAN),
            Expr::Const(c) => *c,
            Expr::Neg(inner) => -inner.eval(inputs),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(inputs), rhs.eval(inputs));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                }
            }
            Expr::Call(func, arg) => func.apply(arg.eval(inputs)),
        }
    }

    /// Highest variable index referenced, if any
    pub fn max_var(&self) -> Option<usize> {
        match self {
            Expr::Var(k) => Some(*k),
            Expr::Const(_) => None,
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.max_var(),
            Expr::Binary(_, lhs, rhs) => lhs.max_var().max(rhs.max_var()),
        }
    }

    /// Render as infix text using `names` for variables
    pub fn render(&self, names: &[String]) -> String {
        let mut out = String::new();
        self.write_infix(&mut out, names, 0);
        out
    }

    fn write_infix(&self, out: &mut String, names: &[String], parent_prec: u8) {
        match self {
            Expr::Var(k) => match names.get(*k) {
                Some(name) => out.push_str(name),
                None => out.push_str(&format!("x{}", k)),
            },
            Expr::Const(c) => {
                if *c < 0.0 {
                    out.push_str(&format!("({:?})", c));
                } else {
                    out.push_str(&format!("{:?}", c));
                }
            }
            Expr::Neg(inner) => {
                out.push('-');
                inner.write_infix(out, names, 3);
            }
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                let wrap = prec < parent_prec;
                if wrap {
                    out.push('(');
                }
                lhs.write_infix(out, names, prec);
                out.push_str(&format!(" {} ", op.symbol()));
                // Right operand of - and / binds tighter
                let rhs_prec = match op {
                    BinaryOp::Sub | BinaryOp::Div => prec + 1,
                    BinaryOp::Add | BinaryOp::Mul => prec,
                };
                rhs.write_infix(out, names, rhs_prec);
                if wrap {
                    out.push(')');
                }
            }
            Expr::Call(func, arg) => {
                out.push_str(func.name());
                out.push('(');
                arg.write_infix(out, names, 0);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_arithmetic() {
        // 2 * x0 - x1 / 4
        let e = Expr::sub(
            Expr::mul(Expr::constant(2.0), Expr::var(0)),
            Expr::div(Expr::var(1), Expr::constant(4.0)),
        );
        assert_eq!(e.eval(&[3.0, 8.0]), 4.0);
        assert_eq!(e.max_var(), Some(1));
    }

    #[test]
    fn test_eval_functions() {
        let e = Expr::call(MathFn::Abs, Expr::neg(Expr::var(0)));
        assert_eq!(e.eval(&[2.5]), 2.5);
        let t = Expr::call(MathFn::Tanh, Expr::constant(0.0));
        assert_eq!(t.eval(&[]), 0.0);
        assert!((Expr::call(MathFn::Atan, Expr::constant(1.0)).eval(&[])
            - std::f64::consts::FRAC_PI_4)
            .abs()
            < 1e-15);
    }

    #[test]
    fn test_missing_variable_is_nan() {
        assert!(Expr::var(3).eval(&[1.0]).is_nan());
    }

    #[test]
    fn test_render_parenthesizes_by_precedence() {
        let names = vec!["a".to_string(), "b".to_string()];
        let e = Expr::mul(
            Expr::add(Expr::var(0), Expr::var(1)),
            Expr::sub(Expr::var(0), Expr::constant(-1.5)),
        );
        assert_eq!(e.render(&names), "(a + b) * (a - (-1.5))");

        let f = Expr::sub(Expr::var(0), Expr::sub(Expr::var(1), Expr::constant(2.0)));
        assert_eq!(f.render(&names), "a - (b - 2.0)");
        assert_eq!(Expr::call(MathFn::Exp, Expr::var(1)).to_string(), "exp(x1)");
    }
}
