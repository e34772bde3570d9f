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

use std::fmt::{Debug, Formatter};

use sparksign_core::{utils::Redact, Context, Error, Result};

use crate::constants::*;
use crate::Credential;

/// Config carries all the configuration for the spark api.
#[derive(Clone)]
pub struct Config {
    /// `app_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`XUNFEI_APP_ID`]
    pub app_id: Option<String>,
    /// `api_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`XUNFEI_API_SECRET`]
    pub api_secret: Option<String>,
    /// `api_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`XUNFEI_API_KEY`]
    pub api_key: Option<String>,

    /// Scheme of the endpoint, `https` by default.
    pub scheme: String,
    /// Host of the endpoint, `spark-api.xf-yun.com` by default.
    pub host: String,
    /// Path of the endpoint, `/v3.1/chat` by default.
    pub path: String,
    /// Model domain sent in `parameter.chat.domain`.
    pub domain: String,
    /// User id sent in `header.uid`.
    pub uid: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: None,
            api_secret: None,
            api_key: None,
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            path: DEFAULT_PATH.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            uid: DEFAULT_UID.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set app_id
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Set api_secret
    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(api_secret.into());
        self
    }

    /// Set api_key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Load config from env.
    ///
    /// Values already set on this config are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(XUNFEI_APP_ID) {
            self.app_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(XUNFEI_API_SECRET) {
            self.api_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(XUNFEI_API_KEY) {
            self.api_key.get_or_insert(v);
        }

        self
    }

    /// Build a credential if all three fields are present.
    pub fn credential(&self) -> Option<Credential> {
        match (&self.app_id, &self.api_secret, &self.api_key) {
            (Some(app_id), Some(api_secret), Some(api_key)) => {
                Some(Credential::new(app_id, api_secret, api_key))
            }
            _ => None,
        }
    }

    /// Names of the environment variables that are still unset.
    pub fn missing_env_vars(&self) -> Vec<&'static str> {
        [
            (XUNFEI_APP_ID, &self.app_id),
            (XUNFEI_API_SECRET, &self.api_secret),
            (XUNFEI_API_KEY, &self.api_key),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(k, _)| k)
        .collect()
    }

    /// Check that the endpoint parts join into a valid url.
    ///
    /// `host` may carry a port but nothing else, `path` must start with `/`.
    pub fn check(&self) -> Result<()> {
        if self.scheme.trim().is_empty() {
            return Err(Error::config_invalid("endpoint scheme must be set"));
        }
        if self.host.trim().is_empty() || self.host.contains(['/', '?', '#']) {
            return Err(Error::config_invalid(format!(
                "endpoint host {:?} must be a bare host with optional port",
                self.host
            )));
        }
        if !self.path.starts_with('/') {
            return Err(Error::config_invalid(format!(
                "endpoint path {:?} must start with '/'",
                self.path
            )));
        }

        Ok(())
    }

    /// The unsigned endpoint url, `<scheme>://<host><path>`.
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id.as_ref().map(Redact::from))
            .field("api_secret", &self.api_secret.as_ref().map(Redact::from))
            .field("api_key", &self.api_key.as_ref().map(Redact::from))
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("uid", &self.uid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparksign_core::StaticEnv;
    use std::collections::HashMap;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_default_endpoint() {
        let cfg = Config::default();
        assert_eq!(cfg.endpoint(), "https://spark-api.xf-yun.com/v3.1/chat");
        assert_eq!(cfg.domain, "general");
    }

    #[test]
    fn test_from_env_fills_gaps_only() {
        let ctx = ctx(&[
            (XUNFEI_APP_ID, "env-app"),
            (XUNFEI_API_SECRET, "env-secret"),
            (XUNFEI_API_KEY, "env-key"),
        ]);

        let cfg = Config::new().with_api_key("explicit-key").from_env(&ctx);
        assert_eq!(cfg.app_id.as_deref(), Some("env-app"));
        assert_eq!(cfg.api_secret.as_deref(), Some("env-secret"));
        assert_eq!(cfg.api_key.as_deref(), Some("explicit-key"));

        let cred = cfg.credential().expect("credential must be complete");
        assert_eq!(cred, Credential::new("env-app", "env-secret", "explicit-key"));
    }

    #[test]
    fn test_missing_env_vars() {
        let cfg = Config::new().with_app_id("app").with_api_secret(" ");
        assert!(cfg.credential().is_none());
        assert_eq!(
            cfg.missing_env_vars(),
            vec![XUNFEI_API_SECRET, XUNFEI_API_KEY]
        );
    }

    #[test]
    fn test_check_endpoint() {
        assert!(Config::default().check().is_ok());
        assert!(Config::new().with_host("127.0.0.1:8080").check().is_ok());

        for cfg in [
            Config::new().with_path("v1.1/chat"),
            Config::new().with_host(""),
            Config::new().with_host("spark-api.xf-yun.com/v3.1"),
            Config::new().with_scheme(" "),
        ] {
            let err = cfg.check().unwrap_err();
            assert_eq!(err.kind(), sparksign_core::ErrorKind::ConfigInvalid, "{cfg:?}");
        }
    }

    #[test]
    fn test_debug_redacts() {
        let cfg = Config::new().with_api_secret("a-very-long-shared-secret");
        let s = format!("{cfg:?}");
        assert!(!s.contains("a-very-long-shared-secret"));
    }
}
