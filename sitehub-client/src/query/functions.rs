//! Mapping of member and method accesses onto remote function tokens.
//!
//! The remote query protocol evaluates a fixed vocabulary of functions
//! (string tests, date-part extraction). The table maps a method identity
//! plus the resolved field name and literal arguments onto the function's
//! wire token, e.g. `title.contains("x")` onto `substringof('x',title)`.
//! Lookups are pure; the table is immutable after process start and safe
//! for unsynchronized concurrent reads.

use std::fmt;

use once_cell::sync::Lazy;

use super::encode::odata_literal;
use super::expr::Value;

/// Member and method accesses the remote protocol can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFunction {
    Contains,
    StartsWith,
    ToLower,
    ToUpper,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for FieldFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldFunction::Contains => "contains",
            FieldFunction::StartsWith => "starts_with",
            FieldFunction::ToLower => "to_lower",
            FieldFunction::ToUpper => "to_upper",
            FieldFunction::Year => "year",
            FieldFunction::Month => "month",
            FieldFunction::Day => "day",
            FieldFunction::Hour => "hour",
            FieldFunction::Minute => "minute",
            FieldFunction::Second => "second",
        };
        write!(f, "{}", name)
    }
}

/// One registered function mapping.
#[derive(Debug, Clone)]
pub struct FunctionMapping {
    function: FieldFunction,
    /// Number of literal arguments the call site must supply.
    arity: usize,
    /// Human-readable member name used in unsupported-member errors.
    display: &'static str,
}

impl FunctionMapping {
    pub fn new(function: FieldFunction, arity: usize, display: &'static str) -> Self {
        Self {
            function,
            arity,
            display,
        }
    }
}

/// Immutable registry of the functions the remote protocol supports.
///
/// The translator consults the table whenever a filter operand is not a
/// plain field reference. The default table is module-scoped and built
/// once; tests can substitute a table of their own through
/// [`crate::query::QueryTranslator::with_functions`].
#[derive(Debug, Clone)]
pub struct FunctionTable {
    entries: Vec<FunctionMapping>,
}

static DEFAULT_TABLE: Lazy<FunctionTable> = Lazy::new(|| {
    FunctionTable::new(vec![
        FunctionMapping::new(FieldFunction::Contains, 1, "String.Contains"),
        FunctionMapping::new(FieldFunction::StartsWith, 1, "String.StartsWith"),
        FunctionMapping::new(FieldFunction::ToLower, 0, "String.ToLower"),
        FunctionMapping::new(FieldFunction::ToUpper, 0, "String.ToUpper"),
        FunctionMapping::new(FieldFunction::Year, 0, "DateTime.Year"),
        FunctionMapping::new(FieldFunction::Month, 0, "DateTime.Month"),
        FunctionMapping::new(FieldFunction::Day, 0, "DateTime.Day"),
        FunctionMapping::new(FieldFunction::Hour, 0, "DateTime.Hour"),
        FunctionMapping::new(FieldFunction::Minute, 0, "DateTime.Minute"),
        FunctionMapping::new(FieldFunction::Second, 0, "DateTime.Second"),
    ])
});

impl FunctionTable {
    pub fn new(entries: Vec<FunctionMapping>) -> Self {
        Self { entries }
    }

    /// The table of every function the service supports.
    pub fn default_table() -> &'static FunctionTable {
        &DEFAULT_TABLE
    }

    /// Map a call onto its wire token. Returns `None` when the function is
    /// not registered or the argument count does not match.
    pub fn try_map(&self, function: FieldFunction, field: &str, args: &[Value]) -> Option<String> {
        let entry = self.entries.iter().find(|e| e.function == function)?;
        if args.len() != entry.arity {
            return None;
        }
        Some(render_token(function, field, args))
    }

    /// Registered zero-argument accesses (member-style), for error
    /// messages.
    pub fn supported_members(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.arity == 0)
            .map(|e| e.display)
            .collect()
    }

    /// Registered calls taking arguments (method-style), for error
    /// messages.
    pub fn supported_methods(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.arity > 0)
            .map(|e| e.display)
            .collect()
    }
}

fn render_token(function: FieldFunction, field: &str, args: &[Value]) -> String {
    match function {
        FieldFunction::Contains => format!("substringof({},{})", odata_literal(&args[0]), field),
        FieldFunction::StartsWith => format!("startswith({},{})", field, odata_literal(&args[0])),
        FieldFunction::ToLower => format!("tolower({})", field),
        FieldFunction::ToUpper => format!("toupper({})", field),
        FieldFunction::Year => format!("year({})", field),
        FieldFunction::Month => format!("month({})", field),
        FieldFunction::Day => format!("day({})", field),
        FieldFunction::Hour => format!("hour({})", field),
        FieldFunction::Minute => format!("minute({})", field),
        FieldFunction::Second => format!("second({})", field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_renders_substringof() {
        let token = FunctionTable::default_table()
            .try_map(
                FieldFunction::Contains,
                "title",
                &[Value::String("Report".to_string())],
            )
            .unwrap();
        assert_eq!(token, "substringof('Report',title)");
    }

    #[test]
    fn test_starts_with_renders_field_first() {
        let token = FunctionTable::default_table()
            .try_map(
                FieldFunction::StartsWith,
                "title",
                &[Value::String("Re".to_string())],
            )
            .unwrap();
        assert_eq!(token, "startswith(title,'Re')");
    }

    #[test]
    fn test_date_parts_wrap_the_field() {
        let table = FunctionTable::default_table();
        assert_eq!(
            table.try_map(FieldFunction::Year, "created", &[]).unwrap(),
            "year(created)"
        );
        assert_eq!(
            table.try_map(FieldFunction::Second, "created", &[]).unwrap(),
            "second(created)"
        );
    }

    #[test]
    fn test_arity_mismatch_is_unmapped() {
        let table = FunctionTable::default_table();
        assert_eq!(table.try_map(FieldFunction::Contains, "title", &[]), None);
        assert_eq!(
            table.try_map(
                FieldFunction::Year,
                "created",
                &[Value::Int(2024)]
            ),
            None
        );
    }

    #[test]
    fn test_unregistered_function_is_unmapped() {
        let table = FunctionTable::new(vec![FunctionMapping::new(
            FieldFunction::Contains,
            1,
            "String.Contains",
        )]);
        assert_eq!(table.try_map(FieldFunction::Year, "created", &[]), None);
    }

    #[test]
    fn test_supported_listings_split_by_arity() {
        let table = FunctionTable::default_table();
        assert!(table.supported_methods().contains(&"String.Contains"));
        assert!(table.supported_members().contains(&"DateTime.Year"));
        assert!(!table.supported_members().contains(&"String.Contains"));
    }
}
