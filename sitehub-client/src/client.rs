//! SiteHub service client.
//!
//! Owns one configured transport and executor per request category and
//! wires the query pipeline together: translate, encode, execute. The raw
//! response is returned to the caller; hydration into model objects
//! happens elsewhere.

use crate::constants;
use crate::error::Error;
use crate::http::transport::{HttpTransport, ServiceRequest, ServiceResponse};
use crate::query::{encode_query, QueryExpr, QueryTranslator};
use crate::resilience::{RequestExecutor, RetryConfig};
use crate::settings::GlobalSettings;

/// Client for one SiteHub tenant.
///
/// Sites, lists, and items travel over the content REST endpoint; users
/// travel over the directory endpoint. Each endpoint carries the retry
/// policy of its settings category.
#[derive(Debug, Clone)]
pub struct SiteHubClient {
    rest: RequestExecutor<HttpTransport>,
    directory: RequestExecutor<HttpTransport>,
}

impl SiteHubClient {
    /// Build a client for the tenant at `base_url`.
    pub fn new(base_url: &str, settings: GlobalSettings) -> Result<Self, Error> {
        let base = base_url.trim_end_matches('/');
        let rest_transport = HttpTransport::new(
            format!("{}/{}", base, constants::REST_API_PREFIX),
            &settings,
        )?;
        let directory_transport = HttpTransport::new(
            format!("{}/{}", base, constants::DIRECTORY_API_PREFIX),
            &settings,
        )?;

        Ok(Self {
            rest: RequestExecutor::new(
                rest_transport,
                RetryConfig::from_options(&settings.rest_retry),
            ),
            directory: RequestExecutor::new(
                directory_transport,
                RetryConfig::from_options(&settings.directory_retry),
            ),
        })
    }

    /// Query the lists of a site.
    pub async fn query_lists(
        &self,
        site: &str,
        query: &QueryExpr,
    ) -> Result<ServiceResponse, Error> {
        let request = query_request(&format!("sites('{}')/lists", site), query)?;
        Ok(self.rest.execute(&request).await?)
    }

    /// Query the items of a list.
    pub async fn query_list_items(
        &self,
        site: &str,
        list: &str,
        query: &QueryExpr,
    ) -> Result<ServiceResponse, Error> {
        let request =
            query_request(&format!("sites('{}')/lists('{}')/items", site, list), query)?;
        Ok(self.rest.execute(&request).await?)
    }

    /// Query the tenant's users through the directory endpoint.
    pub async fn query_users(&self, query: &QueryExpr) -> Result<ServiceResponse, Error> {
        let request = query_request("users", query)?;
        Ok(self.directory.execute(&request).await?)
    }
}

/// Translate and encode a query into a GET request for `path`.
fn query_request(path: &str, query: &QueryExpr) -> Result<ServiceRequest, Error> {
    let descriptor = QueryTranslator::new().translate(query)?;
    Ok(ServiceRequest::get(path).with_query(encode_query(&descriptor)))
}
