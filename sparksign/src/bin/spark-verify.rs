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

//! `spark-verify` checks a set of Spark credentials against the live api.
//!
//! - `spark-verify [APP_ID API_SECRET API_KEY]` runs every case.
//! - `spark-verify --print-url` prints one signed url without network access.
//!
//! Exits with `0` when every case passed, `1` otherwise.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use log::debug;
use sparksign::xfyun::{
    summarize, CaseReport, Config, ConfigCredentialProvider, Outcome, RequestSigner, Verifier,
};
use sparksign::{Context, OsEnv, ProvideCredential};
use sparksign_http_send_reqwest::ReqwestHttpSend;

/// Detail longer than this is cut in the per-case line.
const DETAIL_WIDTH: usize = 80;

/// Verify iFlytek Spark credentials by sending a few signed chat requests.
#[derive(Parser, Debug)]
#[command(name = "spark-verify", version, about, long_about = None)]
struct Cli {
    /// Application id, overrides XUNFEI_APP_ID
    #[arg(requires_all = ["api_secret", "api_key"], value_parser = NonEmptyStringValueParser::new())]
    app_id: Option<String>,

    /// Shared secret, overrides XUNFEI_API_SECRET
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    api_secret: Option<String>,

    /// Access key, overrides XUNFEI_API_KEY
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    api_key: Option<String>,

    /// Api host, may include a port
    #[arg(long)]
    host: Option<String>,

    /// Api path, must start with '/'
    #[arg(long)]
    path: Option<String>,

    /// Url scheme
    #[arg(long)]
    scheme: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print one signed url and exit
    #[arg(long, default_value_t = false)]
    print_url: bool,
}

impl Cli {
    /// Explicit values only, env is merged later.
    fn config(&self) -> Config {
        let mut config = Config::new();
        if let Some(v) = &self.app_id {
            config = config.with_app_id(v);
        }
        if let Some(v) = &self.api_secret {
            config = config.with_api_secret(v);
        }
        if let Some(v) = &self.api_key {
            config = config.with_api_key(v);
        }
        if let Some(v) = &self.host {
            config = config.with_host(v);
        }
        if let Some(v) = &self.path {
            config = config.with_path(v);
        }
        if let Some(v) = &self.scheme {
            config = config.with_scheme(v);
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<sparksign::Error>() {
                Some(e) if e.is_config_error() => {
                    eprintln!("{e}");
                    eprintln!("nothing was sent, see `spark-verify --help`");
                }
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the run succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let http = ReqwestHttpSend::with_timeout(Duration::from_secs(cli.timeout))?;
    let ctx = Context::new().with_http_send(http).with_env(OsEnv);

    let config = cli.config();
    config.check()?;

    let loader = ConfigCredentialProvider::new(Arc::new(config.clone()));
    let Some(cred) = loader.provide_credential(&ctx).await? else {
        eprintln!("missing credentials, please set:");
        for name in config.from_env(&ctx).missing_env_vars() {
            eprintln!("  {name}");
        }
        return Ok(false);
    };
    cred.check()?;
    debug!("loaded config: {config:?}, credential: {cred:?}");

    if cli.print_url {
        let signed = RequestSigner::new().build_authorized_url(&cred, &config.endpoint())?;
        println!("{}", signed.url);
        return Ok(true);
    }

    println!("verifying {}", config.endpoint());
    let reports = Verifier::new(ctx, config).run_all(&cred).await?;
    for report in &reports {
        println!("{}", render(report));
    }

    let summary = summarize(&reports);
    println!("{}/{} cases passed", summary.passed, summary.total);
    Ok(summary.all_passed())
}

fn render(report: &CaseReport) -> String {
    match report.outcome {
        Outcome::Passed => format!("[PASS] {}: {}", report.name, truncate(&report.detail)),
        Outcome::Failed(failure) => format!(
            "[FAIL] {} ({failure}): {}",
            report.name,
            truncate(&report.detail)
        ),
    }
}

/// Single line, at most [`DETAIL_WIDTH`] chars.
fn truncate(detail: &str) -> String {
    let line = detail.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= DETAIL_WIDTH {
        return line;
    }

    let mut s: String = line.chars().take(DETAIL_WIDTH).collect();
    s.push_str("...");
    s
}
