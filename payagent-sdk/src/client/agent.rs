use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::{AgentInfo, CreatePaymentRequest, PaymentDetails, PaymentStatusResponse};

/// Typed HTTP client for a Payment Agent server.
#[derive(Debug, Clone)]
pub struct PaymentAgentClient {
    http: Client,
    base_url: Url,
}

impl PaymentAgentClient {
    /// Create a client for the agent at `base_url` (e.g. `http://localhost:3002`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /`: identify the server.
    pub async fn info(&self) -> Result<AgentInfo, ClientError> {
        let url = self.base_url.join("/")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /payments`: create a payment and start its listener.
    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentDetails, ClientError> {
        let url = self.base_url.join("/payments")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `GET /payments/{id}`: current status and, once finished, the outcome.
    pub async fn payment_status(
        &self,
        request_id: Uuid,
    ) -> Result<PaymentStatusResponse, ClientError> {
        let url = self.base_url.join(&format!("/payments/{request_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /payments/{id}/cancel`: stop a listener that is still polling.
    pub async fn cancel_payment(
        &self,
        request_id: Uuid,
    ) -> Result<PaymentStatusResponse, ClientError> {
        let url = self.base_url.join(&format!("/payments/{request_id}/cancel"))?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }
}
