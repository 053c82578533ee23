// HTTP transport.
//
// `Transport` is the seam between the DSLab calls and the network: the
// API layer describes a request as an `ApiRequest` and gets back the
// status code and decoded body. `ReqwestTransport` is the real
// implementation on top of a shared blocking reqwest client; tests plug
// in fakes.

use reqwest::blocking::{multipart, Client};
use reqwest::Method;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};

/// A file sent as one named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// Raw JSON text, sent as-is (it is not re-serialized).
    Json(String),
    Multipart(FilePart),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Value of the first header called `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and blocks until the response body is read.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking reqwest client shared by all calls of a run.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    charset: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if config.insecure_tls {
            tracing::warn!("TLS certificate and hostname verification are disabled");
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            charset: config.charset.clone(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let ApiRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(text) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json; charset=UTF-8")
                .body(text),
            RequestBody::Multipart(file) => {
                // reqwest sets `multipart/form-data; boundary=...` itself.
                let part = multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(|e| TransportError::new(&url, e))?;
                builder.multipart(multipart::Form::new().part(file.field, part))
            }
        };

        let response = builder.send().map_err(|e| TransportError::new(&url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text_with_charset(&self.charset)
            .map_err(|e| TransportError::new(&url, e))?;
        debug!(%url, status, bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}
