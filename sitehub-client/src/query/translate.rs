//! Expression tree to query descriptor translation.
//!
//! A [`QueryTranslator`] walks a composed [`QueryExpr`] chain depth-first,
//! recursing into the upstream operand before applying the current
//! operator, so operators land on the descriptor in the order the caller
//! chained them. Filter predicates are parsed by recursive descent into an
//! immutable filter tree built bottom-up: a simple comparison yields a
//! bare [`FilterItem`] with no enclosing group, a logical AND/OR yields a
//! [`FiltersGroup`] whose children are stamped with the concatenation
//! operator.
//!
//! Translation is synchronous and stateless across calls; concurrent
//! translations need no locking. Any unsupported shape aborts the whole
//! translation, no partial descriptor is returned.

use thiserror::Error;

use super::descriptor::{
    ConcatOperator, FilterCriteria, FilterItem, FilterNode, FiltersGroup, OrderByItem,
    QueryDescriptor,
};
use super::expr::{BinaryOp, Expr, QueryExpr, UnaryOp, Value};
use super::functions::FunctionTable;

/// Errors raised while translating a query expression tree. All are
/// fatal to the translation and never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    #[error("unsupported projection `{0}`: select must return the query input unchanged")]
    UnsupportedProjection(String),
    #[error(
        "unsupported predicate `{0}`: expected a comparison, a logical and/or, or a supported boolean function call"
    )]
    UnsupportedPredicate(String),
    #[error("unsupported unary operator `{0}`")]
    UnsupportedUnary(UnaryOp),
    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),
    #[error("unsupported member access `{expression}`; supported members: {supported}")]
    UnmappedMember {
        expression: String,
        supported: String,
    },
    #[error("unsupported method call `{expression}`; supported methods: {supported}")]
    UnmappedMethod {
        expression: String,
        supported: String,
    },
    #[error("expression `{0}` is not a constant")]
    NonConstant(String),
    #[error("constant `{expression}` cannot be converted to {target}")]
    InvalidConstant {
        expression: String,
        target: &'static str,
    },
}

/// Translates composed query operator chains into [`QueryDescriptor`]s.
///
/// The function table is injected as a read-only dependency; production
/// code uses the default table, tests may substitute their own.
#[derive(Debug, Clone)]
pub struct QueryTranslator<'a> {
    functions: &'a FunctionTable,
}

impl QueryTranslator<'static> {
    pub fn new() -> Self {
        Self {
            functions: FunctionTable::default_table(),
        }
    }
}

impl Default for QueryTranslator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> QueryTranslator<'a> {
    /// Build a translator against a specific function table.
    pub fn with_functions(functions: &'a FunctionTable) -> Self {
        Self { functions }
    }

    /// Translate a query operator chain into a descriptor.
    pub fn translate(&self, query: &QueryExpr) -> Result<QueryDescriptor, TranslateError> {
        let mut descriptor = QueryDescriptor::new();
        self.apply(query, &mut descriptor)?;
        Ok(descriptor)
    }

    fn apply(
        &self,
        query: &QueryExpr,
        descriptor: &mut QueryDescriptor,
    ) -> Result<(), TranslateError> {
        match query {
            QueryExpr::Source => Ok(()),
            QueryExpr::Filter { source, predicate } => {
                self.apply(source, descriptor)?;
                let node = self.predicate_node(predicate)?;
                descriptor.filters.push(node);
                Ok(())
            }
            QueryExpr::Select { source, projection } => {
                self.apply(source, descriptor)?;
                // Only the identity projection is representable remotely;
                // the operator contributes nothing to the descriptor.
                match &projection.body {
                    Expr::Parameter(name) if *name == projection.param => Ok(()),
                    other => Err(TranslateError::UnsupportedProjection(other.to_string())),
                }
            }
            QueryExpr::Fields { source, accessors } => {
                self.apply(source, descriptor)?;
                for accessor in accessors {
                    let name = member_name(accessor)?;
                    descriptor.add_field(name);
                }
                Ok(())
            }
            QueryExpr::OrderBy {
                source,
                key,
                direction,
            } => {
                self.apply(source, descriptor)?;
                descriptor.order_by.push(OrderByItem {
                    field: member_name(key)?,
                    direction: *direction,
                });
                Ok(())
            }
            QueryExpr::First { source, predicate } => {
                self.apply(source, descriptor)?;
                if let Some(predicate) = predicate {
                    let node = self.predicate_node(predicate)?;
                    descriptor.filters.push(node);
                }
                // First-match requests travel as top=1.
                descriptor.top = Some(1);
                Ok(())
            }
            QueryExpr::Take { source, count } => {
                self.apply(source, descriptor)?;
                descriptor.top = Some(constant_u32(count)?);
                Ok(())
            }
            QueryExpr::Skip { source, count } => {
                self.apply(source, descriptor)?;
                descriptor.skip = Some(constant_u32(count)?);
                Ok(())
            }
        }
    }

    /// Parse a filter predicate into one filter node.
    fn predicate_node(&self, predicate: &Expr) -> Result<FilterNode, TranslateError> {
        match predicate {
            Expr::Binary { op, left, right } => self.binary_node(*op, left, right),
            Expr::Call { .. } => {
                // A bare boolean function call filters as `token eq true`.
                let field = self.call_token(predicate)?;
                Ok(FilterNode::Item(FilterItem {
                    field,
                    criteria: FilterCriteria::Equal,
                    value: Value::Bool(true),
                    concat: None,
                }))
            }
            Expr::Unary { op, .. } => Err(TranslateError::UnsupportedUnary(*op)),
            other => Err(TranslateError::UnsupportedPredicate(other.to_string())),
        }
    }

    fn binary_node(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<FilterNode, TranslateError> {
        if let Some(criteria) = comparison_criteria(op) {
            // The common case: a simple comparison becomes a single item
            // with no enclosing group.
            let field = self.filter_field(left)?;
            let value = filter_value(right)?;
            return Ok(FilterNode::Item(FilterItem {
                field,
                criteria,
                value,
                concat: None,
            }));
        }

        let concat = match op {
            BinaryOp::And => ConcatOperator::And,
            BinaryOp::Or => ConcatOperator::Or,
            _ => unreachable!("comparison operators are handled above"),
        };

        let left_node = self.predicate_node(left)?;
        let right_node = self.predicate_node(right)?;

        let mut children = Vec::new();
        for node in [left_node, right_node] {
            match node {
                // Splice a same-operator child group into the parent so
                // `a && b && c` yields one flat group.
                FilterNode::Group(group) if group.children_concat() == Some(concat) => {
                    children.extend(group.filters);
                }
                node => children.push(node),
            }
        }
        for child in &mut children {
            child.set_concat(concat);
        }

        Ok(FilterNode::Group(FiltersGroup {
            filters: children,
            concat: None,
        }))
    }

    /// Resolve a comparison's left operand to a remote field name or a
    /// mapped function token.
    fn filter_field(&self, expression: &Expr) -> Result<String, TranslateError> {
        match expression {
            Expr::Member(name) => Ok(name.clone()),
            Expr::Indexer(key) => Ok(key.clone()),
            Expr::Call { .. } => self.call_token(expression),
            Expr::Unary { op, .. } => Err(TranslateError::UnsupportedUnary(*op)),
            other => Err(TranslateError::UnsupportedExpression(other.to_string())),
        }
    }

    /// Map a call expression through the function table, yielding the
    /// function token usable as a filter field.
    fn call_token(&self, call: &Expr) -> Result<String, TranslateError> {
        let Expr::Call {
            target,
            function,
            args,
        } = call
        else {
            return Err(TranslateError::UnsupportedExpression(call.to_string()));
        };

        let receiver = member_name(target)?;
        if let Some(token) = self.functions.try_map(*function, &receiver, args) {
            return Ok(token);
        }

        // Zero-argument accesses read as members, the rest as methods;
        // each error lists the supported half of the vocabulary.
        if args.is_empty() {
            Err(TranslateError::UnmappedMember {
                expression: call.to_string(),
                supported: self.functions.supported_members().join(", "),
            })
        } else {
            Err(TranslateError::UnmappedMethod {
                expression: call.to_string(),
                supported: self.functions.supported_methods().join(", "),
            })
        }
    }
}

/// Extract a plain member or indexer name.
fn member_name(expression: &Expr) -> Result<String, TranslateError> {
    match expression {
        Expr::Member(name) => Ok(name.clone()),
        Expr::Indexer(key) => Ok(key.clone()),
        Expr::Unary { op, .. } => Err(TranslateError::UnsupportedUnary(*op)),
        other => Err(TranslateError::UnsupportedExpression(other.to_string())),
    }
}

/// Resolve a comparison's right operand to a literal value.
fn filter_value(expression: &Expr) -> Result<Value, TranslateError> {
    match expression {
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Unary { op, .. } => Err(TranslateError::UnsupportedUnary(*op)),
        other => Err(TranslateError::NonConstant(other.to_string())),
    }
}

fn comparison_criteria(op: BinaryOp) -> Option<FilterCriteria> {
    match op {
        BinaryOp::Eq => Some(FilterCriteria::Equal),
        BinaryOp::Ne => Some(FilterCriteria::NotEqual),
        BinaryOp::Gt => Some(FilterCriteria::GreaterThan),
        BinaryOp::Ge => Some(FilterCriteria::GreaterThanOrEqual),
        BinaryOp::Lt => Some(FilterCriteria::LessThan),
        BinaryOp::Le => Some(FilterCriteria::LessThanOrEqual),
        BinaryOp::And | BinaryOp::Or => None,
    }
}

/// Evaluate a constant expression as a non-negative count, converting
/// culture-invariantly. Conversion failures surface as descriptive
/// translation errors rather than propagating the underlying fault.
fn constant_u32(expression: &Expr) -> Result<u32, TranslateError> {
    let value = match expression {
        Expr::Constant(value) => value,
        other => return Err(TranslateError::NonConstant(other.to_string())),
    };

    let converted = match value {
        Value::Int(n) => u32::try_from(*n).ok(),
        Value::Float(x) if x.fract() == 0.0 && *x >= 0.0 && *x <= u32::MAX as f64 => {
            Some(*x as u32)
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    converted.ok_or_else(|| TranslateError::InvalidConstant {
        expression: expression.to_string(),
        target: "u32",
    })
}
