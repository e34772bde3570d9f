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

/// Env name of the application id.
pub const XUNFEI_APP_ID: &str = "XUNFEI_APP_ID";
/// Env name of the shared secret.
pub const XUNFEI_API_SECRET: &str = "XUNFEI_API_SECRET";
/// Env name of the access key.
pub const XUNFEI_API_KEY: &str = "XUNFEI_API_KEY";

// Default endpoint.
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "spark-api.xf-yun.com";
pub const DEFAULT_PATH: &str = "/v3.1/chat";
pub const DEFAULT_DOMAIN: &str = "general";
pub const DEFAULT_UID: &str = "12345";

// Signature parameters. Any change here breaks every signature.
pub const ALGORITHM: &str = "hmac-sha256";
pub const SIGNED_HEADERS: &str = "host date request-line";
pub const HTTP_VERSION: &str = "HTTP/1.1";

// Query keys of the authorized url, in emitted order.
pub const QUERY_AUTHORIZATION: &str = "authorization";
pub const QUERY_DATE: &str = "date";
pub const QUERY_HOST: &str = "host";
