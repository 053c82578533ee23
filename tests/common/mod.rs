//! Shared fixtures for the workflow tests: an in-memory DSLab API that
//! answers by route and records every request it receives.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Write;

use dslab_client::ui::Reporter;
use dslab_client::{ApiRequest, ApiResponse, RunReport, Step, StepError, Transport, TransportError};

pub const BASE_URL: &str = "http://dslab.test/dslab-api/";

/// How a fake route answers.
#[derive(Clone)]
pub enum Reply {
    Respond(u16, String),
    Refuse,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Respond(200, body.to_string())
    }
}

/// Fake DSLab API. Submit hands out a new project id on every call,
/// starting from `first_project_id`, unless `submit` is overridden.
pub struct FakeDslab {
    pub token: Reply,
    pub submit: Option<Reply>,
    pub compile: Reply,
    pub evaluate: Reply,
    next_project_id: Cell<u64>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeDslab {
    pub fn healthy(first_project_id: u64) -> Self {
        Self {
            token: Reply::ok("tok-123"),
            submit: None,
            compile: Reply::ok("{\"status\":\"compiling\"}"),
            evaluate: Reply::ok(""),
            next_project_id: Cell::new(first_project_id),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Request paths relative to `BASE_URL`, in call order.
    pub fn paths(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    fn answer(&self, url: &str, reply: &Reply) -> Result<ApiResponse, TransportError> {
        match reply {
            Reply::Respond(status, body) => Ok(ApiResponse::new(*status, body.as_str())),
            Reply::Refuse => Err(TransportError::new(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}

impl Transport for FakeDslab {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        let path = url.trim_start_matches(BASE_URL).to_string();
        self.requests.borrow_mut().push(request);

        if path == "token" {
            self.answer(&url, &self.token)
        } else if path.starts_with("projectes/desa/") {
            match &self.submit {
                Some(reply) => self.answer(&url, reply),
                None => {
                    let id = self.next_project_id.get();
                    self.next_project_id.set(id + 1);
                    Ok(ApiResponse::new(
                        200,
                        format!("{{\"data\":{{\"id_projecte\":{id}}}}}"),
                    ))
                }
            }
        } else if path.starts_with("projectes/compila/") {
            self.answer(&url, &self.compile)
        } else if path == "enviaments/corregeix" {
            self.answer(&url, &self.evaluate)
        } else {
            Ok(ApiResponse::new(404, "not found"))
        }
    }
}

/// Reporter that keeps the event stream for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn step_started(&self, step: Step) {
        self.events.borrow_mut().push(format!("start {step}"));
    }

    fn step_failed(&self, step: Step, _error: &StepError) {
        self.events.borrow_mut().push(format!("fail {step}"));
    }

    fn finished(&self, report: &RunReport) {
        self.events
            .borrow_mut()
            .push(format!("done {}", report.project_id));
    }
}

pub fn zip_fixture() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("project")
        .suffix(".zip")
        .tempfile()
        .expect("create zip fixture");
    file.write_all(b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0")
        .expect("write zip fixture");
    file
}
