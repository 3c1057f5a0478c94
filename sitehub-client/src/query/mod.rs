//! Query Model Module
//!
//! Typed query expressions for the SiteHub collections, translation into
//! protocol-agnostic query descriptors, and OData-style encoding of those
//! descriptors into request parameters. Collections compose a
//! [`QueryExpr`] chain, the [`QueryTranslator`] turns it into a
//! [`QueryDescriptor`], and [`encode_query`] serializes the descriptor
//! for the wire.

pub mod descriptor;
pub mod encode;
pub mod expr;
pub mod functions;
pub mod translate;

pub use descriptor::{
    ConcatOperator, FilterCriteria, FilterItem, FilterNode, FiltersGroup, OrderByItem,
    OrderDirection, QueryDescriptor,
};
pub use encode::encode_query;
pub use expr::{dynamic_field, field, BinaryOp, Expr, Lambda, QueryExpr, UnaryOp, Value};
pub use functions::{FieldFunction, FunctionMapping, FunctionTable};
pub use translate::{QueryTranslator, TranslateError};
