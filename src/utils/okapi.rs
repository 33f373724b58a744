use std::time::Duration;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};

const TENANT_HEADER: &str = "X-Okapi-Tenant";
const TOKEN_HEADER: &str = "X-Okapi-Token";

// OkapiClient is a thin JSON client for the circulation backend that attaches tenant
// headers and maps failed responses onto LibraryError.
#[derive(Debug, Clone)]
pub(crate) struct OkapiClient {
    http: Client,
    base_url: String,
    tenant: String,
    token: Option<String>,
}

impl OkapiClient {
    pub(crate) fn new(http: Client, config: &Configuration) -> Self {
        Self {
            http,
            base_url: config.okapi_url.to_string(),
            tenant: config.tenant.to_string(),
            token: config.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(TENANT_HEADER, self.tenant.as_str())
            .header(reqwest::header::ACCEPT, "application/json, text/plain");
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token.as_str()),
            None => builder,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> LibraryResult<T> {
        tracing::debug!(path = %path, "okapi get");
        let res = self.with_headers(self.http.get(self.url(path)).query(params)).send().await?;
        read_json(res).await
    }

    pub(crate) async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> LibraryResult<T> {
        tracing::debug!(path = %path, "okapi post");
        let res = self.with_headers(self.http.post(self.url(path)).json(body)).send().await?;
        read_json(res).await
    }

    pub(crate) async fn post_empty<B: Serialize + Sync>(&self, path: &str, body: &B) -> LibraryResult<()> {
        tracing::debug!(path = %path, "okapi post");
        let res = self.with_headers(self.http.post(self.url(path)).json(body)).send().await?;
        read_empty(res).await
    }

    pub(crate) async fn delete(&self, path: &str) -> LibraryResult<()> {
        tracing::debug!(path = %path, "okapi delete");
        let res = self.with_headers(self.http.delete(self.url(path))).send().await?;
        read_empty(res).await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> LibraryResult<T> {
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(LibraryError::from_response(status.as_u16(), body.as_str()));
    }
    serde_json::from_str(body.as_str()).map_err(LibraryError::from)
}

async fn read_empty(res: Response) -> LibraryResult<()> {
    let status = res.status();
    if status.is_success() {
        return Ok(());
    }
    let body = res.text().await?;
    Err(LibraryError::from_response(status.as_u16(), body.as_str()))
}

// helper method to build the backend client
pub(crate) fn build_okapi_client(config: &Configuration) -> OkapiClient {
    let http = match Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build() {
        Ok(http) => http,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to default http client");
            Client::new()
        }
    };
    OkapiClient::new(http, config)
}

// structured JSON logs, one event per line
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // log collectors choke on ANSI color codes.
        .with_ansi(false)
        // the log collector adds the ingestion time.
        .without_time()
        .json()
        .init();
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        if err.is_decode() {
            LibraryError::serialization(format!("okapi decoding {:?}", err).as_str())
        } else {
            LibraryError::transport(status, format!("okapi request {:?}", err).as_str())
        }
    }
}
