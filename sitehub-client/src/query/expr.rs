//! Typed query expression trees.
//!
//! Application code composes queries as expression trees rather than
//! strings: scalar expressions ([`Expr`]) describe predicates and field
//! accesses, and [`QueryExpr`] chains the query operators a collection
//! exposes (filter, select, order, paging). Each operator's first operand
//! is the upstream query, so chains compose right-to-left and the
//! translator applies them innermost first, in the order they were
//! written.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::descriptor::OrderDirection;
use super::functions::FieldFunction;

/// Literal value carried by a constant expression or a filter item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Guid(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
        }
    }
}

/// Binary operator kinds appearing in predicate expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
}

impl BinaryOp {
    /// Whether this operator concatenates two predicates rather than
    /// comparing a field with a value.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// Unary operator kinds. The remote query grammar has no unary operators;
/// these exist so a tree carrying one is rejected with a precise error
/// instead of silently mistranslating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// Scalar expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The lambda parameter itself; only valid as an identity projection
    /// body.
    Parameter(String),
    /// Plain property access, e.g. `title`.
    Member(String),
    /// Dynamic property-bag access by literal key, e.g. `item["Color"]`.
    Indexer(String),
    /// Method or member call against a field, e.g. `title.contains("x")`
    /// or `created.year()`. Arguments must be literal values.
    Call {
        target: Box<Expr>,
        function: FieldFunction,
        args: Vec<Value>,
    },
    Constant(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Constructed-object projection body, e.g. `new { id, title }`.
    New(Vec<(String, Expr)>),
}

/// Shorthand for a plain property access expression.
pub fn field(name: impl Into<String>) -> Expr {
    Expr::Member(name.into())
}

/// Shorthand for a dynamic property-bag access by key.
pub fn dynamic_field(key: impl Into<String>) -> Expr {
    Expr::Indexer(key.into())
}

impl Expr {
    /// Wrap a literal value as a constant expression.
    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Constant(value.into())
    }

    fn binary(self, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    fn call(self, function: FieldFunction, args: Vec<Value>) -> Expr {
        Expr::Call {
            target: Box::new(self),
            function,
            args,
        }
    }

    /// `self == value`
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Eq, Expr::Constant(value.into()))
    }

    /// `self != value`
    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Ne, Expr::Constant(value.into()))
    }

    /// `self > value`
    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Gt, Expr::Constant(value.into()))
    }

    /// `self >= value`
    pub fn ge(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Ge, Expr::Constant(value.into()))
    }

    /// `self < value`
    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Lt, Expr::Constant(value.into()))
    }

    /// `self <= value`
    pub fn le(self, value: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Le, Expr::Constant(value.into()))
    }

    /// Concatenate two predicates with a logical AND.
    pub fn and(self, other: Expr) -> Expr {
        self.binary(BinaryOp::And, other)
    }

    /// Concatenate two predicates with a logical OR.
    pub fn or(self, other: Expr) -> Expr {
        self.binary(BinaryOp::Or, other)
    }

    /// String containment test against this field.
    pub fn contains(self, fragment: impl Into<String>) -> Expr {
        self.call(
            FieldFunction::Contains,
            vec![Value::String(fragment.into())],
        )
    }

    /// String prefix test against this field.
    pub fn starts_with(self, prefix: impl Into<String>) -> Expr {
        self.call(
            FieldFunction::StartsWith,
            vec![Value::String(prefix.into())],
        )
    }

    /// Lower-cased rendition of this field.
    pub fn to_lower(self) -> Expr {
        self.call(FieldFunction::ToLower, Vec::new())
    }

    /// Upper-cased rendition of this field.
    pub fn to_upper(self) -> Expr {
        self.call(FieldFunction::ToUpper, Vec::new())
    }

    /// Year component of this date field.
    pub fn year(self) -> Expr {
        self.call(FieldFunction::Year, Vec::new())
    }

    /// Month component of this date field.
    pub fn month(self) -> Expr {
        self.call(FieldFunction::Month, Vec::new())
    }

    /// Day component of this date field.
    pub fn day(self) -> Expr {
        self.call(FieldFunction::Day, Vec::new())
    }

    /// Hour component of this date field.
    pub fn hour(self) -> Expr {
        self.call(FieldFunction::Hour, Vec::new())
    }

    /// Minute component of this date field.
    pub fn minute(self) -> Expr {
        self.call(FieldFunction::Minute, Vec::new())
    }

    /// Second component of this date field.
    pub fn second(self) -> Expr {
        self.call(FieldFunction::Second, Vec::new())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Parameter(name) => write!(f, "{}", name),
            Expr::Member(name) => write!(f, "{}", name),
            Expr::Indexer(key) => write!(f, "[{:?}]", key),
            Expr::Call {
                target,
                function,
                args,
            } => {
                write!(f, "{}.{}(", target, function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Unary { op, operand } => write!(f, "{}{}", op, operand),
            Expr::New(fields) => {
                write!(f, "new {{ ")?;
                for (i, (name, _)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// Single-parameter lambda used by projections.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub param: String,
    pub body: Expr,
}

impl Lambda {
    pub fn new(param: impl Into<String>, body: Expr) -> Self {
        Self {
            param: param.into(),
            body,
        }
    }

    /// The identity projection `x => x`, the only projection the remote
    /// protocol can represent.
    pub fn identity(param: impl Into<String>) -> Self {
        let param = param.into();
        let body = Expr::Parameter(param.clone());
        Self { param, body }
    }
}

/// Composed chain of query operators over a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// The unfiltered collection.
    Source,
    Filter {
        source: Box<QueryExpr>,
        predicate: Expr,
    },
    Select {
        source: Box<QueryExpr>,
        projection: Lambda,
    },
    /// Select which entity fields the response should carry.
    Fields {
        source: Box<QueryExpr>,
        accessors: Vec<Expr>,
    },
    OrderBy {
        source: Box<QueryExpr>,
        key: Expr,
        direction: OrderDirection,
    },
    First {
        source: Box<QueryExpr>,
        predicate: Option<Expr>,
    },
    Take {
        source: Box<QueryExpr>,
        count: Expr,
    },
    Skip {
        source: Box<QueryExpr>,
        count: Expr,
    },
}

impl QueryExpr {
    /// Start a query over the whole collection.
    pub fn source() -> Self {
        QueryExpr::Source
    }

    /// Keep only records matching `predicate`.
    pub fn filter(self, predicate: Expr) -> Self {
        QueryExpr::Filter {
            source: Box::new(self),
            predicate,
        }
    }

    /// Apply a projection. Only the identity projection is translatable;
    /// the operator exists so chains written against a projecting API
    /// still compose.
    pub fn select(self, projection: Lambda) -> Self {
        QueryExpr::Select {
            source: Box::new(self),
            projection,
        }
    }

    /// Request one specific entity field in the response.
    pub fn load_field(self, accessor: Expr) -> Self {
        self.load_fields([accessor])
    }

    /// Request specific entity fields in the response.
    pub fn load_fields(self, accessors: impl IntoIterator<Item = Expr>) -> Self {
        QueryExpr::Fields {
            source: Box::new(self),
            accessors: accessors.into_iter().collect(),
        }
    }

    /// Sort ascending by `key`. Appended keys are lower-priority.
    pub fn order_by(self, key: Expr) -> Self {
        QueryExpr::OrderBy {
            source: Box::new(self),
            key,
            direction: OrderDirection::Ascending,
        }
    }

    /// Sort descending by `key`. Appended keys are lower-priority.
    pub fn order_by_desc(self, key: Expr) -> Self {
        QueryExpr::OrderBy {
            source: Box::new(self),
            key,
            direction: OrderDirection::Descending,
        }
    }

    /// Secondary ascending sort key.
    pub fn then_by(self, key: Expr) -> Self {
        self.order_by(key)
    }

    /// Secondary descending sort key.
    pub fn then_by_desc(self, key: Expr) -> Self {
        self.order_by_desc(key)
    }

    /// Request only the first match.
    pub fn first(self) -> Self {
        QueryExpr::First {
            source: Box::new(self),
            predicate: None,
        }
    }

    /// Request only the first record matching `predicate`.
    pub fn first_where(self, predicate: Expr) -> Self {
        QueryExpr::First {
            source: Box::new(self),
            predicate: Some(predicate),
        }
    }

    /// Bound the result count.
    pub fn take(self, count: impl Into<Value>) -> Self {
        QueryExpr::Take {
            source: Box::new(self),
            count: Expr::Constant(count.into()),
        }
    }

    /// Skip the first `count` results.
    pub fn skip(self, count: impl Into<Value>) -> Self {
        QueryExpr::Skip {
            source: Box::new(self),
            count: Expr::Constant(count.into()),
        }
    }
}

impl Default for QueryExpr {
    fn default() -> Self {
        QueryExpr::Source
    }
}
