use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::ApiSettings;
use crate::error::{OrderError, Result};
use crate::order::{Order, OrderGraph, OrderSubmission, SubmittedOrder};
use crate::plan::YearlyPlan;
use crate::pricing::PriceBreakdown;
use crate::reference::{Listing, Resource};

/// Catalog product as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub price: rust_decimal::Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

/// Blocking client for the ERP backend.
#[derive(Clone)]
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token {token}")),
            None => request,
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let mut request = self.authorize(self.agent.get(&url));
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let body = read_body(&url, request.call())?;
        decode(&url, &body)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let json = encode(&url, payload)?;
        let request = self
            .authorize(self.agent.post(&url))
            .header("Content-Type", "application/json");
        let body = read_body(&url, request.send(json))?;
        decode(&url, &body)
    }

    fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "PUT");
        let json = encode(&url, payload)?;
        let request = self
            .authorize(self.agent.put(&url))
            .header("Content-Type", "application/json");
        let body = read_body(&url, request.send(json))?;
        decode(&url, &body)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        tracing::debug!(%url, "DELETE");
        let request = self.authorize(self.agent.delete(&url));
        read_body(&url, request.call())?;
        Ok(())
    }

    /// Prices the order graph on the server.
    pub fn calculate(&self, order: &Order) -> Result<PriceBreakdown> {
        let breakdown: PriceBreakdown =
            self.post("orders/calculate/", &OrderGraph::from(order))?;
        tracing::info!(order = %order.number, total_sum = %breakdown.total_sum, "order priced");
        Ok(breakdown)
    }

    /// Creates the order, or updates it when it already has a backend id.
    pub fn submit_order(&self, order: &Order) -> Result<u64> {
        let submission = OrderSubmission::new(order);
        let saved: SubmittedOrder = match order.remote_id {
            Some(id) => self.put(&format!("orders/{id}/"), &submission)?,
            None => self.post("orders/", &submission)?,
        };
        tracing::info!(order = %order.number, id = saved.id, "order submitted");
        Ok(saved.id)
    }

    pub fn find_yearly_plan(&self, user: u64, year: i32) -> Result<Option<YearlyPlan>> {
        let (user, year) = (user.to_string(), year.to_string());
        let listing: Listing<YearlyPlan> =
            self.get("yearly-plans/", &[("user", user.as_str()), ("year", year.as_str())])?;
        Ok(listing.into_items().into_iter().next())
    }

    /// Creates or updates a plan keyed by `(user, year)`.
    pub fn save_yearly_plan(&self, plan: &YearlyPlan) -> Result<YearlyPlan> {
        let payload = plan.payload()?;
        match plan.id {
            Some(id) => self.put(&format!("yearly-plans/{id}/"), &payload),
            None => self.post("yearly-plans/", &payload),
        }
    }

    pub fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let listing: Listing<Product> = self.get("products/", &[("search", query)])?;
        Ok(listing.into_items())
    }

    pub fn list<R: Resource>(&self) -> Result<Vec<R>> {
        let listing: Listing<R> = self.get(&format!("{}/", R::PATH), &[])?;
        Ok(listing.into_items())
    }

    pub fn retrieve<R: Resource>(&self, id: u64) -> Result<R> {
        self.get(&format!("{}/{id}/", R::PATH), &[])
    }

    pub fn create<R: Resource>(&self, record: &R) -> Result<R> {
        self.post(&format!("{}/", R::PATH), record)
    }

    pub fn update<R: Resource>(&self, id: u64, record: &R) -> Result<R> {
        self.put(&format!("{}/{id}/", R::PATH), record)
    }

    pub fn remove<R: Resource>(&self, id: u64) -> Result<()> {
        self.delete(&format!("{}/{id}/", R::PATH))
    }
}

fn encode<B: Serialize>(url: &str, payload: &B) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| OrderError::Decode {
        url: url.to_string(),
        source: e,
    })
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| OrderError::Decode {
        url: url.to_string(),
        source: e,
    })
}

fn read_body(
    url: &str,
    response: std::result::Result<Response<Body>, ureq::Error>,
) -> Result<String> {
    let transport = |e: ureq::Error| OrderError::Http {
        url: url.to_string(),
        source: Box::new(e),
    };

    let mut response = response.map_err(transport)?;
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().map_err(transport)?;

    if !(200..300).contains(&status) {
        tracing::warn!(url, status, "backend rejected request");
        return Err(OrderError::Api {
            url: url.to_string(),
            status,
            body,
        });
    }
    Ok(body)
}
