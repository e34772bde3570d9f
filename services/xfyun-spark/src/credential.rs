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

use sparksign_core::{utils::Redact, Error, Result, SigningCredential};

/// Credential for the spark api.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Application id, sent in the request body header.
    pub app_id: String,
    /// Shared secret used as the HMAC key.
    pub api_secret: String,
    /// Access key placed in the authorization value.
    pub api_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(
        app_id: impl Into<String>,
        api_secret: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            api_secret: api_secret.into(),
            api_key: api_key.into(),
        }
    }

    /// Check that every field is present.
    ///
    /// Returns a config error naming the first empty field.
    pub fn check(&self) -> Result<()> {
        for (name, value) in [
            ("app_id", &self.app_id),
            ("api_secret", &self.api_secret),
            ("api_key", &self.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_invalid(format!(
                    "credential field {name} is missing or empty"
                )));
            }
        }

        Ok(())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("app_id", &Redact::from(&self.app_id))
            .field("api_secret", &Redact::from(&self.api_secret))
            .field("api_key", &Redact::from(&self.api_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}
