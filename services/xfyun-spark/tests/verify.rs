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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sparksign_core::{Context, Error, ErrorKind, HttpSend};
use sparksign_xfyun_spark::{
    summarize, Case, Config, Credential, Failure, Outcome, Verifier, DEFAULT_CASES,
};

/// Replays canned responses and records every request it sees.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    responses: Arc<Mutex<VecDeque<sparksign_core::Result<http::Response<Bytes>>>>>,
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl MockHttpSend {
    fn respond(self, status: StatusCode, body: impl Into<String>) -> Self {
        let resp = http::Response::builder()
            .status(status)
            .body(Bytes::from(body.into()))
            .expect("response must be valid");
        self.responses.lock().unwrap().push_back(Ok(resp));
        self
    }

    fn fail(self, err: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().drain(..).collect()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
    ) -> sparksign_core::Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::unexpected("no more canned responses")))
    }
}

fn success(content: &str) -> String {
    json!({
        "header": {"code": 0, "message": "Success", "sid": "cht000b", "status": 2},
        "payload": {"choices": {"status": 2, "seq": 0, "text": [
            {"content": content, "role": "assistant", "index": 0}
        ]}}
    })
    .to_string()
}

fn cred() -> Credential {
    Credential::new("app-id", "test-secret", "test-key")
}

fn query(uri: &http::Uri) -> Vec<(String, String)> {
    form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_all_cases_pass() -> Result<()> {
    let mock = MockHttpSend::default()
        .respond(StatusCode::OK, success("hi"))
        .respond(StatusCode::OK, success("我是讯飞星火"))
        .respond(StatusCode::OK, success("def add(a, b): return a + b"))
        .respond(StatusCode::OK, success("函数是"));
    let ctx = Context::new().with_http_send(mock.clone());

    let reports = Verifier::new(ctx, Config::default())
        .run_all(&cred())
        .await?;

    assert_eq!(reports.len(), DEFAULT_CASES.len());
    assert!(reports.iter().all(|r| r.outcome == Outcome::Passed));
    assert_eq!(reports[1].detail, "我是讯飞星火");
    assert!(summarize(&reports).all_passed());

    let requests = mock.requests();
    assert_eq!(requests.len(), DEFAULT_CASES.len());
    for (req, case) in requests.iter().zip(DEFAULT_CASES) {
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().host(), Some("spark-api.xf-yun.com"));
        assert_eq!(req.uri().path(), "/v3.1/chat");
        assert_eq!(
            req.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );

        let keys: Vec<String> = query(req.uri()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["authorization", "date", "host"]);

        let body: Value = serde_json::from_slice(req.body())?;
        assert_eq!(body["header"]["app_id"], "app-id");
        assert_eq!(body["parameter"]["chat"]["domain"], "general");
        assert_eq!(body["parameter"]["chat"]["max_tokens"], case.max_tokens);
        assert_eq!(body["payload"]["message"]["text"][0]["content"], case.prompt);
    }

    Ok(())
}

#[tokio::test]
async fn test_failures_are_reported_per_case() -> Result<()> {
    let mock = MockHttpSend::default()
        .respond(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"HMAC signature cannot be verified"}"#,
        )
        .respond(StatusCode::OK, "<html>gateway</html>")
        .respond(
            StatusCode::OK,
            r#"{"header":{"code":10013,"message":"input content audit failed","sid":"x"}}"#,
        )
        .fail(
            Error::unexpected("failed to send http request")
                .with_source(anyhow::anyhow!("connection refused")),
        )
        .respond(StatusCode::OK, success("still running"));
    let ctx = Context::new().with_http_send(mock.clone());

    let cases = ["status", "decode", "vendor", "transport", "last"]
        .into_iter()
        .map(|name| Case {
            name,
            prompt: "Hello",
            max_tokens: 10,
        })
        .collect();
    let reports = Verifier::new(ctx, Config::default())
        .with_cases(cases)
        .run_all(&cred())
        .await?;

    let outcomes: Vec<_> = reports.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::Failed(Failure::Status(401)),
            Outcome::Failed(Failure::Decode),
            Outcome::Failed(Failure::Vendor { code: 10013 }),
            Outcome::Failed(Failure::Transport),
            Outcome::Passed,
        ]
    );
    assert!(reports[0].detail.contains("HMAC signature cannot be verified"));
    assert_eq!(reports[2].detail, "input content audit failed");
    assert!(reports[3].detail.contains("connection refused"));
    assert_eq!(reports[4].name, "last");

    let summary = summarize(&reports);
    assert_eq!((summary.passed, summary.total), (1, 5));
    assert!(!summary.all_passed());
    assert_eq!(mock.requests().len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_config_error_sends_nothing() {
    let mock = MockHttpSend::default().respond(StatusCode::OK, success("unused"));
    let ctx = Context::new().with_http_send(mock.clone());

    let err = Verifier::new(ctx, Config::default())
        .run_all(&Credential::new("app-id", "test-secret", ""))
        .await
        .expect_err("empty api key must be rejected");

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_malformed_endpoint_sends_nothing() {
    let mock = MockHttpSend::default().respond(StatusCode::OK, success("unused"));

    for config in [
        Config::new().with_path("v1.1/chat"),
        Config::new().with_host(""),
    ] {
        let ctx = Context::new().with_http_send(mock.clone());
        let verifier = Verifier::new(ctx, config);

        let err = verifier
            .run_all(&cred())
            .await
            .expect_err("malformed endpoint must be rejected");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = verifier
            .run_case(&cred(), &DEFAULT_CASES[0])
            .await
            .expect_err("malformed endpoint must be rejected");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_custom_endpoint() -> Result<()> {
    let mock = MockHttpSend::default().respond(StatusCode::OK, success("ok"));
    let ctx = Context::new().with_http_send(mock.clone());
    let config = Config::new()
        .with_scheme("http")
        .with_host("127.0.0.1:8080")
        .with_path("/v1.1/chat")
        .with_domain("lite");

    let reports = Verifier::new(ctx, config)
        .with_cases(vec![DEFAULT_CASES[0].clone()])
        .run_all(&cred())
        .await?;
    assert_eq!(reports[0].outcome, Outcome::Passed);

    let req = &mock.requests()[0];
    assert_eq!(req.uri().scheme_str(), Some("http"));
    assert_eq!(req.uri().path(), "/v1.1/chat");
    let host = query(req.uri())
        .into_iter()
        .find(|(k, _)| k == "host")
        .map(|(_, v)| v);
    assert_eq!(host.as_deref(), Some("127.0.0.1:8080"));

    let body: Value = serde_json::from_slice(req.body())?;
    assert_eq!(body["parameter"]["chat"]["domain"], "lite");

    Ok(())
}
