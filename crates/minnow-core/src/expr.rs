//! Expression trees evaluated against rows.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::schema::Row;
use crate::value::Cell;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Less-than comparison.
    Lt,
    /// Greater-than comparison.
    Gt,
    /// Equality comparison.
    Eq,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl BinaryOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "=",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
}

impl UnaryOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
        }
    }
}

/// An expression evaluated row by row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference.
    Column(String),
    /// A constant value.
    Literal(Cell),
    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
}

/// Creates a column reference.
#[must_use]
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Creates a literal expression.
#[must_use]
pub fn lit(value: impl Into<Cell>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    /// Evaluates the expression against one row.
    ///
    /// Arithmetic on two integers stays integral for `+`, `-`, `*`;
    /// division stays integral only when it is exact. Any other operand mix
    /// promotes to floats, converting text operands at evaluation time.
    /// Comparisons and boolean operators yield the 0/1 integer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown columns, failed text→number
    /// conversions, and division by zero.
    pub fn evaluate(&self, row: &Row) -> Result<Cell> {
        match self {
            Self::Column(name) => row.get(name).cloned(),
            Self::Literal(cell) => Ok(cell.clone()),
            Self::Binary { left, op, right } => match op {
                BinaryOp::Add => numeric_op(
                    &left.evaluate(row)?,
                    &right.evaluate(row)?,
                    |a, b| a + b,
                    |a, b| a + b,
                ),
                BinaryOp::Sub => numeric_op(
                    &left.evaluate(row)?,
                    &right.evaluate(row)?,
                    |a, b| a - b,
                    |a, b| a - b,
                ),
                BinaryOp::Mul => numeric_op(
                    &left.evaluate(row)?,
                    &right.evaluate(row)?,
                    |a, b| a * b,
                    |a, b| a * b,
                ),
                BinaryOp::Div => divide(&left.evaluate(row)?, &right.evaluate(row)?),
                BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Eq => {
                    let ordering = left.evaluate(row)?.compare(&right.evaluate(row)?);
                    let holds = match op {
                        BinaryOp::Lt => ordering == Ordering::Less,
                        BinaryOp::Gt => ordering == Ordering::Greater,
                        _ => ordering == Ordering::Equal,
                    };
                    Ok(Cell::from_bool(holds))
                }
                BinaryOp::And => Ok(Cell::from_bool(left.truthy(row)? && right.truthy(row)?)),
                BinaryOp::Or => Ok(Cell::from_bool(left.truthy(row)? || right.truthy(row)?)),
            },
            Self::Unary {
                op: UnaryOp::Not,
                operand,
            } => Ok(Cell::from_bool(!operand.truthy(row)?)),
        }
    }

    /// Evaluates the expression and reduces it to its truthiness.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    pub fn truthy(&self, row: &Row) -> Result<bool> {
        Ok(self.evaluate(row)?.truthy())
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an addition expression.
    #[must_use]
    pub fn add(self, right: Self) -> Self {
        self.binary(BinaryOp::Add, right)
    }

    /// Creates a subtraction expression.
    #[must_use]
    pub fn sub(self, right: Self) -> Self {
        self.binary(BinaryOp::Sub, right)
    }

    /// Creates a multiplication expression.
    #[must_use]
    pub fn mul(self, right: Self) -> Self {
        self.binary(BinaryOp::Mul, right)
    }

    /// Creates a division expression.
    #[must_use]
    pub fn div(self, right: Self) -> Self {
        self.binary(BinaryOp::Div, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Creates a NOT expression.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }
}

fn numeric_op(
    left: &Cell,
    right: &Cell,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Cell> {
    if let (Cell::Int(a), Cell::Int(b)) = (left, right) {
        Ok(Cell::Int(int_op(*a, *b)))
    } else {
        Ok(Cell::Float(float_op(left.to_float()?, right.to_float()?)))
    }
}

fn divide(left: &Cell, right: &Cell) -> Result<Cell> {
    let divisor = right.to_float()?;
    if divisor == 0.0 {
        return Err(Error::DivisionByZero);
    }
    // Exact integer division keeps the integer domain.
    if let (Cell::Int(a), Cell::Int(b)) = (left, right) {
        if *b != 0 && a % b == 0 {
            return Ok(Cell::Int(a / b));
        }
    }
    Ok(Cell::Float(left.to_float()? / divisor))
}
