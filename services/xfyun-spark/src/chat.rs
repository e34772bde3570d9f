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

//! Wire types of the spark chat envelope.

use serde::{Deserialize, Serialize};

/// A chat request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Request header.
    pub header: RequestHeader,
    /// Generation parameters.
    pub parameter: Parameter,
    /// Conversation payload.
    pub payload: RequestPayload,
}

impl ChatRequest {
    /// Build a single-turn request with one user message.
    pub fn user_message(
        app_id: &str,
        uid: &str,
        domain: &str,
        content: &str,
        max_tokens: u32,
    ) -> Self {
        Self {
            header: RequestHeader {
                app_id: app_id.to_string(),
                uid: uid.to_string(),
            },
            parameter: Parameter {
                chat: ChatParameter {
                    domain: domain.to_string(),
                    temperature: 0.7,
                    max_tokens,
                },
            },
            payload: RequestPayload {
                message: Message {
                    text: vec![Text {
                        role: "user".to_string(),
                        content: content.to_string(),
                    }],
                },
            },
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize)]
pub struct RequestHeader {
    pub app_id: String,
    pub uid: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub chat: ChatParameter,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize)]
pub struct ChatParameter {
    pub domain: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize)]
pub struct RequestPayload {
    pub message: Message,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub text: Vec<Text>,
}

/// One message of the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Text {
    /// `user`, `assistant` or `system`.
    pub role: String,
    /// Message body.
    pub content: String,
}

/// A chat response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Response header, carries the vendor status code.
    pub header: ResponseHeader,
    /// Generated content. Absent on errors.
    #[serde(default)]
    pub payload: Option<ResponsePayload>,
}

impl ChatResponse {
    /// Vendor code `0` means success, anything else is an error.
    pub fn is_success(&self) -> bool {
        self.header.code == 0
    }

    /// All text chunks of the reply joined together.
    pub fn content(&self) -> String {
        self.payload
            .as_ref()
            .map(|p| {
                p.choices
                    .text
                    .iter()
                    .map(|t| t.content.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Response header.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseHeader {
    /// Vendor status code, `0` on success.
    pub code: i64,
    /// Vendor message, the error description when `code != 0`.
    #[serde(default)]
    pub message: String,
    /// Session id assigned by the server.
    #[serde(default)]
    pub sid: Option<String>,
    /// Frame status, `2` marks the last frame.
    #[serde(default)]
    pub status: Option<i64>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePayload {
    pub choices: Choices,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct Choices {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub seq: Option<i64>,
    #[serde(default)]
    pub text: Vec<ChoiceText>,
}

/// One generated chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceText {
    /// Generated text.
    #[serde(default)]
    pub content: String,
    #[allow(missing_docs)]
    #[serde(default)]
    pub role: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub index: Option<i64>,
}
