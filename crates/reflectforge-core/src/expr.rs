//! Expression trees for computed properties.

use std::ops::{Add, Mul, Neg, Not, Sub};

use crate::object::DynamicObject;

/// An integer expression over the fields of a single instance.
///
/// Every node yields an `i64`; comparisons yield 0 or 1. Arithmetic wraps on
/// overflow. `And`, `Or` and `Not` are bitwise on the 0/1 encoding, so they
/// behave as logical operators on bool fields and comparison results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    /// Field by declaration index in the owning type.
    Field(usize),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Abs(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Min(Box<Expr>, Box<Expr>),
    Max(Box<Expr>, Box<Expr>),
    If {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    pub fn bool(value: bool) -> Self {
        Expr::Bool(value)
    }

    pub fn field(field_idx: usize) -> Self {
        Expr::Field(field_idx)
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Eq(Box::new(left), Box::new(right))
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Expr::Ne(Box::new(left), Box::new(right))
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::Lt(Box::new(left), Box::new(right))
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Expr::Le(Box::new(left), Box::new(right))
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::Gt(Box::new(left), Box::new(right))
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Expr::Ge(Box::new(left), Box::new(right))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn abs(expr: Expr) -> Self {
        Expr::Abs(Box::new(expr))
    }

    pub fn min(left: Expr, right: Expr) -> Self {
        Expr::Min(Box::new(left), Box::new(right))
    }

    pub fn max(left: Expr, right: Expr) -> Self {
        Expr::Max(Box::new(left), Box::new(right))
    }

    pub fn if_then_else(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::If {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Calls `f` with the index of every field the expression reads.
    pub fn visit_fields(&self, f: &mut impl FnMut(usize)) {
        use Expr::*;
        match self {
            Int(_) | Bool(_) => {}
            Field(idx) => f(*idx),
            Not(e) | Abs(e) | Neg(e) => e.visit_fields(f),
            Eq(l, r) | Ne(l, r) | Lt(l, r) | Le(l, r) | Gt(l, r) | Ge(l, r) | And(l, r)
            | Or(l, r) | Add(l, r) | Sub(l, r) | Mul(l, r) | Min(l, r) | Max(l, r) => {
                l.visit_fields(f);
                r.visit_fields(f);
            }
            If {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.visit_fields(f);
                then_expr.visit_fields(f);
                else_expr.visit_fields(f);
            }
        }
    }

    /// Interprets the expression against an instance.
    ///
    /// Fields are resolved through the instance's own type definition on
    /// every read. A field that does not exist reads as 0.
    pub fn eval(&self, object: &DynamicObject) -> i64 {
        use Expr::*;
        match self {
            Int(n) => *n,
            Bool(b) => *b as i64,
            Field(idx) => object.raw_field(*idx).unwrap_or(0),

            Eq(l, r) => (l.eval(object) == r.eval(object)) as i64,
            Ne(l, r) => (l.eval(object) != r.eval(object)) as i64,
            Lt(l, r) => (l.eval(object) < r.eval(object)) as i64,
            Le(l, r) => (l.eval(object) <= r.eval(object)) as i64,
            Gt(l, r) => (l.eval(object) > r.eval(object)) as i64,
            Ge(l, r) => (l.eval(object) >= r.eval(object)) as i64,

            And(l, r) => l.eval(object) & r.eval(object),
            Or(l, r) => l.eval(object) | r.eval(object),
            Not(e) => e.eval(object) ^ 1,

            Add(l, r) => l.eval(object).wrapping_add(r.eval(object)),
            Sub(l, r) => l.eval(object).wrapping_sub(r.eval(object)),
            Mul(l, r) => l.eval(object).wrapping_mul(r.eval(object)),
            Neg(e) => e.eval(object).wrapping_neg(),
            Abs(e) => {
                let v = e.eval(object);
                if v < 0 {
                    v.wrapping_neg()
                } else {
                    v
                }
            }
            Min(l, r) => l.eval(object).min(r.eval(object)),
            Max(l, r) => l.eval(object).max(r.eval(object)),

            If {
                cond,
                then_expr,
                else_expr,
            } => {
                // Both arms are evaluated, matching the branch-free lowering.
                let c = cond.eval(object);
                let t = then_expr.eval(object);
                let e = else_expr.eval(object);
                if c != 0 {
                    t
                } else {
                    e
                }
            }
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::Neg(Box::new(self))
    }
}
