//! Database seam used by execution-accuracy scoring.
//!
//! The evaluator acquires one [`Connection`] per scored pair through a
//! [`Connector`], runs both statements on it, and closes it before returning.

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// A single column value in a fetched row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// One fetched row, columns in select-list order.
pub type Row = Vec<SqlValue>;

/// An open database connection.
pub trait Connection {
    /// Execute `sql` and fetch every resulting row in order.
    fn fetch_all(&mut self, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Release the connection.
    fn close(self: Box<Self>) -> Result<(), DbError>;
}

/// Factory for per-call connections.
pub trait Connector: Send + Sync {
    /// Open a fresh connection.
    fn connect(&self) -> Result<Box<dyn Connection>, DbError>;
}

impl SqlValue {
    /// Value equality where an `Integer` equals a `Real` of the same
    /// numeric value. Every other pairing compares strictly.
    pub fn loosely_equals(&self, other: &SqlValue) -> bool {
        match (self, other) {
            (SqlValue::Integer(i), SqlValue::Real(f)) | (SqlValue::Real(f), SqlValue::Integer(i)) => {
                integer_equals_real(*i, *f)
            }
            _ => self == other,
        }
    }
}

// Exact: the float must hold an integral value inside i64 range that maps
// back to the same integer.
fn integer_equals_real(i: i64, f: f64) -> bool {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) && f as i64 == i
}

/// Ordered row-list equality using [`SqlValue::loosely_equals`] per column.
pub fn rows_equal(a: &[Row], b: &[Row]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(left, right)| {
            left.len() == right.len() && left.iter().zip(right).all(|(x, y)| x.loosely_equals(y))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_matches_integral_real() {
        assert!(SqlValue::Integer(4).loosely_equals(&SqlValue::Real(4.0)));
        assert!(SqlValue::Real(-2.0).loosely_equals(&SqlValue::Integer(-2)));
        assert!(!SqlValue::Integer(4).loosely_equals(&SqlValue::Real(4.5)));
        assert!(!SqlValue::Integer(i64::MAX).loosely_equals(&SqlValue::Real(i64::MAX as f64)));
        assert!(!SqlValue::Integer(0).loosely_equals(&SqlValue::Real(f64::NAN)));
    }

    #[test]
    fn other_kinds_compare_strictly() {
        assert!(!SqlValue::Integer(4).loosely_equals(&SqlValue::Text("4".into())));
        assert!(!SqlValue::Null.loosely_equals(&SqlValue::Integer(0)));
        assert!(SqlValue::Null.loosely_equals(&SqlValue::Null));
        assert!(!SqlValue::Blob(vec![1]).loosely_equals(&SqlValue::Blob(vec![2])));
    }

    #[test]
    fn rows_compare_in_order() {
        let a = vec![vec![SqlValue::Integer(1), SqlValue::Text("a".into())], vec![SqlValue::Integer(2)]];
        let b = vec![vec![SqlValue::Real(1.0), SqlValue::Text("a".into())], vec![SqlValue::Real(2.0)]];
        assert!(rows_equal(&a, &b));

        let reversed: Vec<Row> = b.iter().rev().cloned().collect();
        assert!(!rows_equal(&a, &reversed));
        assert!(!rows_equal(&a, &b[..1]));
        assert!(!rows_equal(&[vec![SqlValue::Integer(1)]], &[vec![SqlValue::Integer(1), SqlValue::Null]]));
        assert!(rows_equal(&[], &[]));
    }
}
