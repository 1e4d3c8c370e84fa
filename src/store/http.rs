use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::BackendConfig;
use crate::model::{ClassroomFields, ClassroomRecord, Id, InstitutionRecord, InstitutionUpdate};
use crate::store::traits::InstitutionBackend;

/// [`InstitutionBackend`] over the platform's REST API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .with_context(|| format!("Invalid backend base URL '{}'", config.base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Send and turn any non-2xx status into an error carrying the body
    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.context("Backend request failed")?;
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, error_message(&body));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .context("Backend returned an unexpected body")
    }
}

/// The API answers errors as `{"message": ...}`; fall back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait::async_trait]
impl InstitutionBackend for HttpBackend {
    async fn update_institution(&self, id: &Id, fields: &InstitutionUpdate) -> Result<InstitutionRecord> {
        let request = self
            .request(Method::PUT, &format!("institutions/{}", id))
            .json(fields);
        Self::send_json(request).await
    }

    async fn delete_classroom(&self, classroom_id: &Id) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("classrooms/{}", classroom_id));
        Self::send(request).await?;
        Ok(())
    }

    async fn restore_classroom(&self, classroom_id: &Id) -> Result<ClassroomRecord> {
        let request = self.request(Method::PATCH, &format!("classrooms/{}/restore", classroom_id));
        Self::send_json(request).await
    }

    async fn update_classroom(&self, classroom_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord> {
        let request = self
            .request(Method::PUT, &format!("classrooms/{}", classroom_id))
            .json(fields);
        Self::send_json(request).await
    }

    async fn create_classroom(&self, institution_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord> {
        let request = self
            .request(Method::POST, &format!("institutions/{}/classrooms", institution_id))
            .json(fields);
        Self::send_json(request).await
    }
}
