//! SiteHub Web API Client
//!
//! Client library for the SiteHub content collaboration service: sites,
//! lists, list items, and users. Queries are composed as typed expression
//! trees, translated into a protocol-agnostic descriptor, encoded as
//! OData-style request parameters, and executed over HTTP with a
//! configurable retry policy for throttling and transient failures.
//!
//! ```no_run
//! use sitehub_client::{field, GlobalSettings, QueryExpr, SiteHubClient};
//!
//! # async fn run() -> Result<(), sitehub_client::Error> {
//! let client = SiteHubClient::new("https://contoso.sitehub.example", GlobalSettings::default())?;
//!
//! let query = QueryExpr::source()
//!     .filter(field("title").contains("Report").and(field("id").gt(5)))
//!     .order_by(field("title"))
//!     .take(10);
//!
//! let response = client.query_list_items("hr", "tasks", &query).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod http;
pub mod query;
pub mod resilience;
pub mod settings;

pub use client::SiteHubClient;
pub use error::Error;
pub use http::{
    HttpMethod, HttpTransport, ServiceRequest, ServiceResponse, Transport, TransportError,
};
pub use query::{
    dynamic_field, encode_query, field, BinaryOp, ConcatOperator, Expr, FieldFunction,
    FilterCriteria, FilterItem, FilterNode, FiltersGroup, FunctionMapping, FunctionTable, Lambda,
    OrderByItem, OrderDirection, QueryDescriptor, QueryExpr, QueryTranslator, TranslateError,
    UnaryOp, Value,
};
pub use resilience::{is_transient_status, RequestError, RequestExecutor, RetryConfig, RetryDecision};
pub use settings::{GlobalSettings, GlobalSettingsBuilder, RetryOptions};
