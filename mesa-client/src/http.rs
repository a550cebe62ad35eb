//! HTTP backend over the dashboard REST API

use async_trait::async_trait;
use http::{Method, StatusCode, header};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use shared::models::{
    Category, NewOrder, NewOrderItem, NewTable, Order, OrderUpdate, Product, Staff, Table,
    TableStatus,
};

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
    percent_id: i64,
}

impl HttpBackend {
    /// Create a new HTTP backend from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            percent_id: config.percent_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }
        request
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Map non-success statuses to typed errors, parsing the `{message}` body
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(Into::into)
    }

    /// Handle endpoints that answer 204 No Content
    async fn handle_empty_response(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT || status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("/order").await
    }

    async fn fetch_tables(&self) -> ClientResult<Vec<Table>> {
        self.get("/tables").await
    }

    async fn fetch_products(&self) -> ClientResult<Vec<Product>> {
        self.get("/product").await
    }

    async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        self.get("/category").await
    }

    async fn fetch_commission_percent(&self) -> ClientResult<f64> {
        #[derive(Deserialize)]
        struct PercentResponse {
            percent: f64,
        }

        let response: PercentResponse = self.get(&format!("/percent/{}", self.percent_id)).await?;
        Ok(response.percent)
    }

    async fn fetch_staff(&self) -> ClientResult<Vec<Staff>> {
        self.get("/user").await
    }

    async fn create_order(&self, body: &NewOrder) -> ClientResult<Order> {
        let response = self
            .request(Method::POST, "/order")
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn update_order(&self, id: i64, body: &OrderUpdate) -> ClientResult<Order> {
        let response = self
            .request(Method::PATCH, &format!("/order/{}", id))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn add_order_item(&self, order_id: i64, item: &NewOrderItem) -> ClientResult<Order> {
        let response = self
            .request(Method::PUT, &format!("/order/{}", order_id))
            .json(item)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete_order(&self, id: i64) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/order/{}", id))
            .send()
            .await?;
        Self::handle_empty_response(response).await
    }

    async fn delete_order_item(&self, item_id: i64) -> ClientResult<Order> {
        let response = self
            .request(Method::DELETE, &format!("/order/orderItem/{}", item_id))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn set_table_status(&self, id: i64, status: TableStatus) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct StatusBody {
            status: TableStatus,
        }

        let response = self
            .request(Method::PATCH, &format!("/tables/{}", id))
            .json(&StatusBody { status })
            .send()
            .await?;
        Self::handle_empty_response(response).await
    }

    async fn create_table(&self, body: &NewTable) -> ClientResult<Table> {
        let response = self
            .request(Method::POST, "/tables")
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete_table(&self, id: i64) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/tables/{}", id))
            .send()
            .await?;
        Self::handle_empty_response(response).await
    }
}
