// Library root
// -----------
// The binary (`main.rs`) is a thin shell around these modules:
//
// - `config`: reads `ClientConfig` from the environment and builds the
//   endpoint URLs of the DSLab API.
// - `transport`: the `Transport` seam plus the reqwest-backed client
//   that actually talks HTTP.
// - `api`: the four DSLab calls (token, submit, compile, evaluate).
// - `orchestrator`: runs the four calls in order and decides which
//   failures stop the run.
// - `ui`: progress reporting and the password prompt.
// - `logging`: tracing subscriber setup.
// - `error`: error types shared by all of the above.
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod transport;
pub mod ui;

pub use api::{Credentials, DslabClient, ProjectId, Token};
pub use config::{ClientConfig, Endpoints, FailurePolicy};
pub use error::{ConfigError, StepError, TransportError, WorkflowError};
pub use orchestrator::{Orchestrator, RunReport, Step, StepOutcome, Submission};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, RequestBody, Transport};
