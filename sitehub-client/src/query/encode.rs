//! OData-style serialization of query descriptors.
//!
//! Turns a [`QueryDescriptor`] into the `$filter` / `$select` /
//! `$orderby` / `$top` / `$skip` request parameters the service
//! understands. Parameter values are emitted unescaped; percent-encoding
//! happens in the transport when the URL is assembled.

use super::descriptor::{ConcatOperator, FilterItem, FilterNode, QueryDescriptor};
use super::expr::Value;

/// Serialize a descriptor into ordered query parameters. Parameters whose
/// descriptor part is empty are omitted entirely.
pub fn encode_query(descriptor: &QueryDescriptor) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !descriptor.filters.is_empty() {
        params.push(("$filter".to_string(), encode_filters(&descriptor.filters)));
    }
    if !descriptor.fields.is_empty() {
        params.push(("$select".to_string(), descriptor.fields.join(",")));
    }
    if !descriptor.order_by.is_empty() {
        let order = descriptor
            .order_by
            .iter()
            .map(|key| format!("{} {}", key.field, key.direction.token()))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("$orderby".to_string(), order));
    }
    if let Some(top) = descriptor.top {
        params.push(("$top".to_string(), top.to_string()));
    }
    if let Some(skip) = descriptor.skip {
        params.push(("$skip".to_string(), skip.to_string()));
    }

    params
}

fn encode_filters(nodes: &[FilterNode]) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            let joiner = node.concat().unwrap_or(ConcatOperator::And);
            out.push(' ');
            out.push_str(joiner.token());
            out.push(' ');
        }
        match node {
            FilterNode::Item(item) => out.push_str(&encode_item(item)),
            FilterNode::Group(group) => {
                out.push('(');
                out.push_str(&encode_filters(&group.filters));
                out.push(')');
            }
        }
    }
    out
}

fn encode_item(item: &FilterItem) -> String {
    format!(
        "{} {} {}",
        item.field,
        item.criteria.token(),
        odata_literal(&item.value)
    )
}

/// Render a literal value in the service's query grammar.
pub(crate) fn odata_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::DateTime(dt) => format!("datetime'{}'", dt.format("%Y-%m-%dT%H:%M:%SZ")),
        Value::Guid(g) => format!("guid'{}'", g),
    }
}
