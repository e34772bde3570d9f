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

//! iFlytek Spark signing for sparksign.
//!
//! This crate builds authorized urls for the Spark chat api. The signature
//! is an HMAC-SHA256 over `host`, `date` and the request line, and it is
//! carried in the query string, so the same url works for a plain HTTP call
//! and a websocket handshake.
//!
//! ## Quick Start
//!
//! ```no_run
//! use anyhow::Result;
//! use sparksign_core::{Context, OsEnv, Signer};
//! use sparksign_http_send_reqwest::ReqwestHttpSend;
//! use sparksign_xfyun_spark::{DefaultCredentialProvider, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Reads XUNFEI_APP_ID, XUNFEI_API_SECRET and XUNFEI_API_KEY.
//!     let loader = DefaultCredentialProvider::new();
//!     let signer = Signer::new(ctx, loader, RequestSigner::new());
//!
//!     let mut parts = http::Request::get("https://spark-api.xf-yun.com/v3.1/chat")
//!         .body(())?
//!         .into_parts()
//!         .0;
//!     signer.sign(&mut parts, None).await?;
//!
//!     println!("{}", parts.uri);
//!     Ok(())
//! }
//! ```
//!
//! ## One-off urls
//!
//! ```
//! use sparksign_xfyun_spark::{Credential, RequestSigner};
//!
//! let cred = Credential::new("app-id", "api-secret", "api-key");
//! let signed = RequestSigner::new()
//!     .build_authorized_url(&cred, "https://spark-api.xf-yun.com/v3.1/chat")
//!     .unwrap();
//! assert!(signed.url.contains("authorization="));
//! ```
//!
//! ## Verifying a configuration
//!
//! [`Verifier`] sends a few chat requests with fresh urls and reports the
//! outcome of each one. See the `spark-verify` binary in the `sparksign`
//! crate for a command line front end.

#![warn(missing_docs)]

mod constants;
pub use constants::{XUNFEI_API_KEY, XUNFEI_API_SECRET, XUNFEI_APP_ID};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{build_authorized_url, RequestSigner, SignedRequest};

mod provide_credential;
pub use provide_credential::*;

pub mod chat;

mod verify;
pub use verify::{
    summarize, Case, CaseReport, Failure, Outcome, Summary, Verifier, DEFAULT_CASES,
};
