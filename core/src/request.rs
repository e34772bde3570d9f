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

use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// Query pairs are kept decoded. They are serialized with
/// `application/x-www-form-urlencoded` rules when applied back.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters, decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method.clone();
        parts.uri = self.uri()?;

        Ok(())
    }

    /// Build the full uri this context describes.
    pub fn uri(&self) -> Result<Uri> {
        let mut uri_parts = http::uri::Parts::default();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&self.path_and_query())?);

        Ok(Uri::from_parts(uri_parts)?)
    }

    /// Path followed by the encoded query, if any.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        format!("{}?{}", self.path, self.query_to_string())
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Serialize the query list in its current order.
    ///
    /// ```shell
    /// [(a, "b c"), (d, "e,f")] => "a=b+c&d=e%2Cf"
    /// ```
    pub fn query_to_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut p = parts("https://spark-api.xf-yun.com/v3.1/chat");
        let mut req = SigningRequest::build(&mut p)?;
        assert_eq!(req.authority.as_str(), "spark-api.xf-yun.com");
        assert_eq!(req.path, "/v3.1/chat");
        assert!(req.query.is_empty());

        req.query_push("date", "Mon, 01 Jan 2024 00:00:00 GMT");
        req.apply(&mut p)?;

        assert_eq!(
            p.uri.to_string(),
            "https://spark-api.xf-yun.com/v3.1/chat?date=Mon%2C+01+Jan+2024+00%3A00%3A00+GMT"
        );
        Ok(())
    }

    #[test]
    fn test_build_decodes_query() -> Result<()> {
        let mut p = parts("http://127.0.0.1:8080/chat?a=b+c&d=e%2Cf");
        let req = SigningRequest::build(&mut p)?;

        assert_eq!(req.authority.as_str(), "127.0.0.1:8080");
        assert_eq!(
            req.query,
            vec![
                ("a".to_string(), "b c".to_string()),
                ("d".to_string(), "e,f".to_string())
            ]
        );
        assert_eq!(req.query_to_string(), "a=b+c&d=e%2Cf");
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut p = parts("/v3.1/chat");
        let err = SigningRequest::build(&mut p).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }
}
