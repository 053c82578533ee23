// DSLab API calls.
//
// Each method on `DslabClient` is one HTTP request with fixed headers and
// payload shape, returning a typed result instead of an empty sentinel.
// The calls are independent of each other; `orchestrator` strings them
// together.

use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Endpoints, FailurePolicy};
use crate::error::StepError;
use crate::transport::{ApiRequest, FilePart, RequestBody, Transport};

/// Multipart field the submit endpoint reads the zip from.
pub const SUBMIT_FIELD: &str = "files";
pub const ZIP_MIME: &str = "application/zip";

/// Login data for the token call. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        tenant: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Basic base64(username:password)`
    pub fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer credential returned by the token call, kept exactly as the
/// server sent it.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

/// Server-assigned id of a submitted project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The evaluate payload embeds the id without quotes, so only ids made
    /// of ASCII digits produce valid JSON there.
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of the evaluate call: `{"projectes":[<id>]}` with the id written
/// unquoted, as the DSLab API has always received it.
pub fn evaluation_payload(project_id: &ProjectId) -> String {
    format!("{{\"projectes\":[{}]}}", project_id.as_str())
}

/// Shape of the submit response; everything except the id is ignored.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    data: SubmitData,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id_projecte: Option<Value>,
}

/// Pull `data.id_projecte` out of a submit response body.
pub fn parse_project_id(body: &str) -> Result<ProjectId, StepError> {
    if body.trim().is_empty() {
        return Err(StepError::Protocol("empty response body".into()));
    }
    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| StepError::Protocol(format!("cannot parse submit response: {e}")))?;

    match response.data.id_projecte {
        Some(Value::String(id)) => Ok(ProjectId::new(id)),
        Some(Value::Number(n)) => Ok(ProjectId::new(n.to_string())),
        Some(Value::Bool(b)) => Ok(ProjectId::new(b.to_string())),
        Some(other) => Err(StepError::Protocol(format!(
            "`data.id_projecte` is not a scalar: {other}"
        ))),
        None => Err(StepError::Protocol("response has no `data.id_projecte`".into())),
    }
}

/// Client for the four DSLab endpoints.
pub struct DslabClient<T> {
    transport: T,
    endpoints: Endpoints,
    policy: FailurePolicy,
}

impl<T: Transport> DslabClient<T> {
    pub fn new(transport: T, endpoints: Endpoints, policy: FailurePolicy) -> Self {
        Self {
            transport,
            endpoints,
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// POST `/token` with the tenant header and basic auth. The response
    /// body is the token.
    pub fn acquire_token(&self, credentials: &Credentials) -> Result<Token, StepError> {
        let url = self.endpoints.token();
        debug!(%url, tenant = %credentials.tenant, username = %credentials.username, "requesting token");

        let request = ApiRequest::new(Method::POST, url)
            .header("X-TenantID", credentials.tenant.as_str())
            .header("Authorization", credentials.basic_auth());
        let response = self.transport.send(request)?;

        if !response.is_success() {
            if self.policy.is_strict() {
                return Err(StepError::Status {
                    status: response.status,
                    body: response.body,
                });
            }
            warn!(status = response.status, "token endpoint returned a non-success status");
        }
        if response.body.is_empty() {
            return Err(StepError::Auth("token response has no body".into()));
        }
        Ok(Token::new(response.body))
    }

    /// POST the zip at `zip_path` to `/projectes/desa/{project}` and return
    /// the id the server assigned to it.
    pub fn submit_project(
        &self,
        token: &Token,
        project: &str,
        zip_path: &Path,
    ) -> Result<ProjectId, StepError> {
        let url = self.endpoints.submit(project);
        debug!(%url, zip = %zip_path.display(), "submitting project");

        let bytes = std::fs::read(zip_path).map_err(|source| StepError::Payload {
            path: zip_path.to_path_buf(),
            source,
        })?;
        let file_name = zip_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project.zip".to_string());

        let request = ApiRequest::new(Method::POST, url)
            .header("Authorization", token.bearer())
            .body(RequestBody::Multipart(FilePart {
                field: SUBMIT_FIELD.to_string(),
                file_name,
                mime: ZIP_MIME.to_string(),
                bytes,
            }));
        let response = self.transport.send(request)?;
        if !response.is_success() {
            if self.policy.is_strict() {
                return Err(StepError::Status {
                    status: response.status,
                    body: response.body,
                });
            }
            warn!(status = response.status, "submit endpoint returned a non-success status");
        }

        let project_id = parse_project_id(&response.body)?;
        debug!(%project_id, "project stored");
        Ok(project_id)
    }

    /// GET `/projectes/compila/{id}`. The body is ignored.
    pub fn compile_project(&self, token: &Token, project_id: &ProjectId) -> Result<(), StepError> {
        let url = self.endpoints.compile(project_id.as_str());
        debug!(%url, "compiling project");

        let request = ApiRequest::new(Method::GET, url).header("Authorization", token.bearer());
        let response = self.transport.send(request)?;
        if !response.is_success() {
            return Err(StepError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }

    /// POST `{"projectes":[id]}` to `/enviaments/corregeix`.
    pub fn evaluate_project(&self, token: &Token, project_id: &ProjectId) -> Result<(), StepError> {
        let url = self.endpoints.evaluate();
        debug!(%url, %project_id, "evaluating project");

        if !project_id.is_numeric() {
            warn!(%project_id, "project id is not numeric, evaluation payload will not be valid JSON");
        }
        let request = ApiRequest::new(Method::POST, url)
            .header("Authorization", token.bearer())
            .body(RequestBody::Json(evaluation_payload(project_id)));
        let response = self.transport.send(request)?;
        if !response.is_success() {
            return Err(StepError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}
