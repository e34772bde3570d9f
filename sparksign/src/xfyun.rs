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

//! iFlytek Spark support with convenience APIs.

pub use sparksign_xfyun_spark::*;

use crate::{default_context, Signer};

/// Default Spark signer type.
pub type DefaultSigner = Signer<Credential>;

/// Create a default Spark signer.
///
/// This function creates a signer with:
///
/// - [`default_context`], reqwest plus the process environment
/// - [`DefaultCredentialProvider`], reading `XUNFEI_*` variables
/// - [`RequestSigner`] signing the request line with `GET`
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> sparksign::Result<()> {
/// let signer = sparksign::xfyun::default_signer();
///
/// let mut req = http::Request::post("https://spark-api.xf-yun.com/v3.1/chat")
///     .body(())
///     .unwrap()
///     .into_parts()
///     .0;
/// signer.sign(&mut req, None).await?;
/// # Ok(())
/// # }
/// ```
pub fn default_signer() -> DefaultSigner {
    Signer::new(
        default_context(),
        DefaultCredentialProvider::new(),
        RequestSigner::new(),
    )
}

/// Create a verifier for `config` on top of [`default_context`].
pub fn default_verifier(config: Config) -> Verifier {
    Verifier::new(default_context(), config)
}
