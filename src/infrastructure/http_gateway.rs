// HTTP gateway implementation over reqwest
use crate::application::cardio_gateway::{CardioGateway, GatewayError, ReportRequest};
use crate::domain::analysis::AnalysisResult;
use crate::domain::history::HistoryRecord;
use crate::domain::vitals::VitalsSnapshot;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpCardioGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCardioGateway {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn report_url(&self, request: &ReportRequest) -> String {
        format!(
            "{}/report/pdf?patient_name={}&patient_age={}",
            self.base_url,
            urlencoding::encode(&request.patient_name),
            request.patient_age
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::NetworkFailure(format!(
                "status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl CardioGateway for HttpCardioGateway {
    async fn analyze(&self, vitals: &VitalsSnapshot) -> Result<AnalysisResult, GatewayError> {
        let request = self.client.post(self.endpoint("/analyze")).json(vitals);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, GatewayError> {
        let request = self.client.get(self.endpoint("/history"));
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    async fn download_report(&self, request: &ReportRequest) -> Result<Bytes, GatewayError> {
        let url = self.report_url(request);
        tracing::debug!("Requesting report from {}", url);

        let response = self.send(self.client.get(&url)).await?;
        response
            .bytes()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        let request = self.client.delete(self.endpoint("/clear"));
        self.send(request).await?;
        Ok(())
    }
}
