use std::time::Duration;

use async_trait::async_trait;
use homesim_api::models::*;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use super::{DeviceApi, PresetApi};
use crate::error::{ClientError, Result};
use crate::settings::ClientSettings;

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>> {
        let response = request.send().await?;
        let status = response.status();
        let contents = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiResponse<IgnoredAny>>(&contents) {
                Ok(envelope) => ClientError::Api {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| status.to_string()),
                    errors: envelope.errors.unwrap_or_default(),
                },
                Err(_) => ClientError::api(status.as_u16(), status.to_string()),
            });
        }

        serde_json::from_str(&contents).map_err(|e| {
            ClientError::Decode(format!("{e}. Body was: \"{contents}\""))
        })
    }

    async fn data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode(String::from("response carries no data")))
    }

    async fn data_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.data(self.request(method, path).json(body)).await
    }
}

#[async_trait]
impl DeviceApi for HttpClient {
    async fn list_devices(&self) -> Result<Vec<DeviceResponse>> {
        self.data(self.request(Method::GET, "/devices")).await
    }

    async fn get_device(&self, id: Id) -> Result<DeviceResponse> {
        self.data(self.request(Method::GET, &format!("/devices/{id}"))).await
    }

    async fn create_device(&self, request: &CreateDeviceRequest) -> Result<DeviceResponse> {
        self.data_with(Method::POST, "/devices", request).await
    }

    async fn update_device(&self, id: Id, request: &UpdateDeviceRequest) -> Result<DeviceResponse> {
        self.data_with(Method::PUT, &format!("/devices/{id}"), request).await
    }

    async fn delete_device(&self, id: Id) -> Result<()> {
        self.send::<IgnoredAny>(self.request(Method::DELETE, &format!("/devices/{id}")))
            .await?;
        Ok(())
    }

    async fn delete_all_devices(&self) -> Result<()> {
        self.send::<IgnoredAny>(self.request(Method::DELETE, "/devices")).await?;
        Ok(())
    }
}

#[async_trait]
impl PresetApi for HttpClient {
    async fn list_presets(&self) -> Result<Vec<PresetResponse>> {
        self.data(self.request(Method::GET, "/presets")).await
    }

    async fn get_preset(&self, id: Id) -> Result<PresetResponse> {
        self.data(self.request(Method::GET, &format!("/presets/{id}"))).await
    }

    async fn create_preset(&self, request: &CreatePresetRequest) -> Result<PresetResponse> {
        self.data_with(Method::POST, "/presets", request).await
    }

    async fn update_preset(&self, id: Id, request: &UpdatePresetRequest) -> Result<PresetResponse> {
        self.data_with(Method::PUT, &format!("/presets/{id}"), request).await
    }

    async fn delete_preset(&self, id: Id) -> Result<()> {
        self.send::<IgnoredAny>(self.request(Method::DELETE, &format!("/presets/{id}")))
            .await?;
        Ok(())
    }

    async fn load_preset(&self, id: Id) -> Result<PresetResponse> {
        self.data(self.request(Method::GET, &format!("/presets/{id}/load"))).await
    }
}
