// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Configuration checks against the live spark api.
//!
//! Each case sends one freshly signed chat request and turns the result into
//! a [`CaseReport`]. Rendering is left to the caller.

use std::error::Error as _;
use std::fmt;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use log::{info, warn};
use sparksign_core::{Context, Error, Result, SignRequest};

use crate::chat::{ChatRequest, ChatResponse};
use crate::{Config, Credential, RequestSigner};

/// One chat scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// Human readable name.
    pub name: &'static str,
    /// User message sent to the model.
    pub prompt: &'static str,
    /// `parameter.chat.max_tokens` for this request.
    pub max_tokens: u32,
}

/// Scenarios run by [`Verifier::run_all`] unless replaced.
pub const DEFAULT_CASES: &[Case] = &[
    Case {
        name: "connection",
        prompt: "Hello",
        max_tokens: 100,
    },
    Case {
        name: "chat completion",
        prompt: "请简单介绍一下你自己",
        max_tokens: 200,
    },
    Case {
        name: "code generation",
        prompt: "请用Python写一个简单的计算器函数",
        max_tokens: 500,
    },
    Case {
        name: "teaching scenario",
        prompt: "请解释什么是函数，并给出一个简单的例子",
        max_tokens: 300,
    },
];

/// Why a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Connection failure or timeout.
    Transport,
    /// Non-2xx HTTP status.
    Status(u16),
    /// The body is not a spark response.
    Decode,
    /// HTTP 200 with a non-zero vendor code.
    Vendor {
        /// `header.code` of the response.
        code: i64,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport => write!(f, "transport error"),
            Failure::Status(code) => write!(f, "http status {code}"),
            Failure::Decode => write!(f, "invalid response body"),
            Failure::Vendor { code } => write!(f, "vendor code {code}"),
        }
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The api answered with code 0.
    Passed,
    /// The case failed.
    Failed(Failure),
}

/// Structured record of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// Pass or fail.
    pub outcome: Outcome,
    /// Reply content on success, error text otherwise.
    pub detail: String,
}

impl CaseReport {
    /// Check if this case passed.
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Pass count of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of passed cases.
    pub passed: usize,
    /// Number of cases.
    pub total: usize,
}

impl Summary {
    /// True when every case passed. An empty run does not count as passed.
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

/// Count passed cases.
pub fn summarize(reports: &[CaseReport]) -> Summary {
    Summary {
        passed: reports.iter().filter(|r| r.passed()).count(),
        total: reports.len(),
    }
}

/// Verifier runs chat cases against the configured endpoint.
#[derive(Debug)]
pub struct Verifier {
    ctx: Context,
    config: Config,
    signer: RequestSigner,
    cases: Vec<Case>,
}

impl Verifier {
    /// Create a verifier running [`DEFAULT_CASES`].
    pub fn new(ctx: Context, config: Config) -> Self {
        Self {
            ctx,
            config,
            signer: RequestSigner::new(),
            cases: DEFAULT_CASES.to_vec(),
        }
    }

    /// Replace the cases to run.
    pub fn with_cases(mut self, cases: Vec<Case>) -> Self {
        self.cases = cases;
        self
    }

    /// Run every case in order.
    ///
    /// Returns an error only for configuration problems, which are detected
    /// before any request is sent. Everything else ends up in the reports.
    pub async fn run_all(&self, cred: &Credential) -> Result<Vec<CaseReport>> {
        self.config.check()?;
        cred.check()?;

        let mut reports = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            reports.push(self.run_case(cred, case).await?);
        }
        Ok(reports)
    }

    /// Run a single case.
    pub async fn run_case(&self, cred: &Credential, case: &Case) -> Result<CaseReport> {
        self.config.check()?;

        let body = ChatRequest::user_message(
            &cred.app_id,
            &self.config.uid,
            &self.config.domain,
            case.prompt,
            case.max_tokens,
        );
        let body = serde_json::to_vec(&body)
            .map_err(|e| Error::unexpected("failed to encode chat request").with_source(e))?;

        let (mut parts, body) = http::Request::builder()
            .method(Method::POST)
            .uri(self.config.endpoint())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Bytes::from(body))?
            .into_parts();
        // A new url per request, the date is part of the signature.
        self.signer
            .sign_request(&self.ctx, &mut parts, Some(cred), None)
            .await?;
        let req = http::Request::from_parts(parts, body);

        let report = match self.ctx.http_send(req).await {
            Err(err) => self.failed(case, Failure::Transport, error_chain(&err)),
            Ok(resp) => self.check_response(case, resp),
        };

        if report.passed() {
            info!("case {:?} passed", report.name);
        } else {
            warn!("case {:?} failed: {}", report.name, report.detail);
        }
        Ok(report)
    }

    fn check_response(&self, case: &Case, resp: http::Response<Bytes>) -> CaseReport {
        let status = resp.status();
        let body = resp.into_body();

        if !status.is_success() {
            return self.failed(
                case,
                Failure::Status(status.as_u16()),
                String::from_utf8_lossy(&body).to_string(),
            );
        }

        let parsed: ChatResponse = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => return self.failed(case, Failure::Decode, e.to_string()),
        };
        if !parsed.is_success() {
            return self.failed(
                case,
                Failure::Vendor {
                    code: parsed.header.code,
                },
                parsed.header.message,
            );
        }

        CaseReport {
            name: case.name.to_string(),
            outcome: Outcome::Passed,
            detail: parsed.content(),
        }
    }

    fn failed(&self, case: &Case, failure: Failure, detail: String) -> CaseReport {
        CaseReport {
            name: case.name.to_string(),
            outcome: Outcome::Failed(failure),
            detail,
        }
    }
}

/// Render an error with all of its sources, `outer: inner: root`.
fn error_chain(err: &Error) -> String {
    let mut s = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        s.push_str(": ");
        s.push_str(&e.to_string());
        source = e.source();
    }
    s
}
