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

//! Spark api url authorization.
use std::time::Duration;

use async_trait::async_trait;
use http::request::Parts;
use http::Method;
use http::Uri;
use log::debug;
use sparksign_core::hash::{base64_encode, base64_hmac_sha256};
use sparksign_core::time::{format_http_date, now, DateTime};
use sparksign_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::*;
use crate::Credential;

/// RequestSigner that implements the spark api url authorization.
///
/// The signed material is `host`, `date` and the request line. The result is
/// carried in the query string as `authorization`, `date` and `host`, so the
/// url can be used for a plain HTTP call or a websocket handshake alike.
///
/// The request line is always signed with the signer's method (`GET` by
/// default), whatever verb is used to send the request afterwards.
#[derive(Debug)]
pub struct RequestSigner {
    method: Method,
    time: Option<DateTime>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer that signs the request line with `GET`.
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            time: None,
        }
    }

    /// Set the method used in the signed request line.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Build a one-time authorized url for `endpoint` with the current time.
    pub fn build_authorized_url(&self, cred: &Credential, endpoint: &str) -> Result<SignedRequest> {
        let uri: Uri = endpoint.parse()?;
        let (mut parts, _) = http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(())?
            .into_parts();

        let mut req = SigningRequest::build(&mut parts)?;
        authorize(&mut req, cred, &self.method, self.time.unwrap_or_else(now))
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        parts: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::config_invalid("missing credential"))?;
        if expires_in.is_some() {
            return Err(Error::request_invalid(
                "spark authorization has no client side expiry, expires_in is not supported",
            ));
        }

        let now = self.time.unwrap_or_else(now);
        let mut req = SigningRequest::build(parts)?;
        authorize(&mut req, cred, &self.method, now)?;

        req.apply(parts)
    }
}

/// All derived values of one authorization.
///
/// Every field is computed from the credential, the signing time and the
/// request target. Nothing here may be reused for another request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Signing time in RFC 1123 format.
    pub date: String,
    /// The exact text fed into HMAC-SHA256.
    pub signature_origin: String,
    /// Base64 encoded HMAC-SHA256 of `signature_origin`.
    pub signature: String,
    /// Base64 encoded authorization origin, sent as the `authorization` query.
    pub authorization: String,
    /// The full authorized url.
    pub url: String,
}

/// Build a one-time authorized url.
///
/// This is a pure function of its inputs: passing the same `now` always
/// produces the same url.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use http::Method;
/// use sparksign_xfyun_spark::{build_authorized_url, Credential};
///
/// let cred = Credential::new("app-id", "test-secret", "test-key");
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let signed = build_authorized_url(&cred, "https", "example.com", "/v1/chat", &Method::GET, now)?;
///
/// assert_eq!(
///     signed.signature_origin,
///     "host: example.com\ndate: Mon, 01 Jan 2024 00:00:00 GMT\nGET /v1/chat HTTP/1.1"
/// );
/// # Ok::<(), sparksign_core::Error>(())
/// ```
pub fn build_authorized_url(
    cred: &Credential,
    scheme: &str,
    host: &str,
    path: &str,
    method: &Method,
    now: DateTime,
) -> Result<SignedRequest> {
    cred.check()?;
    if scheme.is_empty() || host.is_empty() {
        return Err(Error::config_invalid("endpoint scheme and host must be set"));
    }
    if !path.starts_with('/') {
        return Err(Error::config_invalid(format!(
            "endpoint path {path:?} must start with '/'"
        )));
    }

    let uri = Uri::builder()
        .scheme(scheme)
        .authority(host)
        .path_and_query(path)
        .build()?;
    let (mut parts, _) = http::Request::builder()
        .method(method.clone())
        .uri(uri)
        .body(())?
        .into_parts();

    let mut req = SigningRequest::build(&mut parts)?;
    authorize(&mut req, cred, method, now)
}

/// Sign `req` and push the three authorization query pairs into it.
fn authorize(
    req: &mut SigningRequest,
    cred: &Credential,
    method: &Method,
    now: DateTime,
) -> Result<SignedRequest> {
    cred.check()?;
    if !req.query.is_empty() {
        return Err(Error::request_invalid(
            "request to authorize must not carry query parameters",
        ));
    }

    let host = req.authority.as_str().to_string();
    let date = format_http_date(now);

    let signature_origin = signature_origin(&host, &date, method, &req.path);
    debug!("signature origin: {signature_origin:?}");

    let signature = base64_hmac_sha256(cred.api_secret.as_bytes(), signature_origin.as_bytes());
    let authorization = base64_encode(authorization_origin(&cred.api_key, &signature).as_bytes());

    req.query_push(QUERY_AUTHORIZATION, authorization.as_str());
    req.query_push(QUERY_DATE, date.as_str());
    req.query_push(QUERY_HOST, host.as_str());
    let url = req.uri()?.to_string();

    Ok(SignedRequest {
        date,
        signature_origin,
        signature,
        authorization,
        url,
    })
}

/// Construct the signature origin.
///
/// ## Format
///
/// ```text
/// "host: " + Host + "\n" +
/// "date: " + Date + "\n" +
/// Method + " " + Path + " HTTP/1.1"
/// ```
///
/// There is no trailing newline.
pub(crate) fn signature_origin(host: &str, date: &str, method: &Method, path: &str) -> String {
    format!(
        "host: {host}\ndate: {date}\n{} {path} {HTTP_VERSION}",
        method.as_str()
    )
}

/// Construct the authorization origin, the value that gets base64 encoded.
pub(crate) fn authorization_origin(api_key: &str, signature: &str) -> String {
    format!(
        r#"api_key="{api_key}", algorithm="{ALGORITHM}", headers="{SIGNED_HEADERS}", signature="{signature}""#
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use sparksign_core::hash::base64_decode;
    use sparksign_core::{ErrorKind, Signer};

    use super::*;
    use crate::StaticCredentialProvider;

    const FIXTURE_DATE: &str = "Mon, 01 Jan 2024 00:00:00 GMT";
    const FIXTURE_ORIGIN: &str =
        "host: example.com\ndate: Mon, 01 Jan 2024 00:00:00 GMT\nGET /v1/chat HTTP/1.1";
    // Computed independently with a reference HMAC-SHA256 implementation.
    const FIXTURE_SIGNATURE: &str = "rjDYPLni6pt+mvBrGK4zu0PSABoRU3T3iJCubzWNQr0=";

    fn fixture_time() -> DateTime {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn fixture_credential() -> Credential {
        Credential::new("app-id", "test-secret", "test-key")
    }

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        let uri: Uri = url.parse().unwrap();
        form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_signature_origin_fixture() {
        let s = signature_origin("example.com", FIXTURE_DATE, &Method::GET, "/v1/chat");
        assert_eq!(s, FIXTURE_ORIGIN);
        assert!(!s.ends_with('\n'));
    }

    #[test]
    fn test_build_authorized_url_fixture() -> Result<()> {
        let signed = build_authorized_url(
            &fixture_credential(),
            "https",
            "example.com",
            "/v1/chat",
            &Method::GET,
            fixture_time(),
        )?;

        assert_eq!(signed.date, FIXTURE_DATE);
        assert_eq!(signed.signature_origin, FIXTURE_ORIGIN);
        assert_eq!(signed.signature, FIXTURE_SIGNATURE);
        assert_eq!(
            signed.url,
            "https://example.com/v1/chat?authorization=YXBpX2tleT0idGVzdC1rZXkiLCBhbGdvcml0aG09ImhtYWMtc2hhMjU2IiwgaGVhZGVycz0iaG9zdCBkYXRlIHJlcXVlc3QtbGluZSIsIHNpZ25hdHVyZT0icmpEWVBMbmk2cHQrbXZCckdLNHp1MFBTQUJvUlUzVDNpSkN1YnpXTlFyMD0i&date=Mon%2C+01+Jan+2024+00%3A00%3A00+GMT&host=example.com"
        );
        Ok(())
    }

    #[test]
    fn test_authorization_decodes_to_origin() -> Result<()> {
        let signed = build_authorized_url(
            &fixture_credential(),
            "https",
            "example.com",
            "/v1/chat",
            &Method::GET,
            fixture_time(),
        )?;

        let decoded = String::from_utf8(base64_decode(&signed.authorization)?)?;
        assert_eq!(
            decoded,
            format!(
                r#"api_key="test-key", algorithm="hmac-sha256", headers="host date request-line", signature="{}""#,
                FIXTURE_SIGNATURE
            )
        );
        Ok(())
    }

    #[test]
    fn test_url_carries_exactly_three_query_pairs() -> Result<()> {
        let signed = build_authorized_url(
            &fixture_credential(),
            "https",
            "example.com",
            "/v1/chat",
            &Method::GET,
            fixture_time(),
        )?;

        let pairs = query_pairs(&signed.url);
        assert_eq!(
            pairs,
            vec![
                ("authorization".to_string(), signed.authorization.clone()),
                ("date".to_string(), FIXTURE_DATE.to_string()),
                ("host".to_string(), "example.com".to_string()),
            ]
        );

        // Re-encoding the decoded pairs must give back the same query.
        let reencoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter())
            .finish();
        let uri: Uri = signed.url.parse().unwrap();
        assert_eq!(uri.query(), Some(reencoded.as_str()));
        Ok(())
    }

    #[test]
    fn test_signing_time_changes_signature() -> Result<()> {
        let cred = fixture_credential();
        let a = build_authorized_url(
            &cred,
            "https",
            "example.com",
            "/v1/chat",
            &Method::GET,
            fixture_time(),
        )?;
        let b = build_authorized_url(
            &cred,
            "https",
            "example.com",
            "/v1/chat",
            &Method::GET,
            fixture_time() + chrono::TimeDelta::seconds(1),
        )?;

        assert_eq!(b.date, "Mon, 01 Jan 2024 00:00:01 GMT");
        assert_ne!(a.signature, b.signature);
        assert_ne!(a.url, b.url);
        Ok(())
    }

    #[test]
    fn test_empty_credential_fails_fast() {
        for cred in [
            Credential::new("", "test-secret", "test-key"),
            Credential::new("app-id", "", "test-key"),
            Credential::new("app-id", "test-secret", ""),
        ] {
            let err = build_authorized_url(
                &cred,
                "https",
                "example.com",
                "/v1/chat",
                &Method::GET,
                fixture_time(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        }
    }

    #[test]
    fn test_invalid_endpoint() {
        let cred = fixture_credential();
        let err = build_authorized_url(&cred, "https", "", "/v1/chat", &Method::GET, fixture_time())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err =
            build_authorized_url(&cred, "https", "example.com", "v1", &Method::GET, fixture_time())
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_signer_builds_url_from_endpoint() -> Result<()> {
        let signer = RequestSigner::new().with_time(fixture_time());
        let signed = signer.build_authorized_url(&fixture_credential(), "https://example.com/v1/chat")?;

        assert_eq!(signed.signature, FIXTURE_SIGNATURE);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_rewrites_uri() -> Result<()> {
        let builder = RequestSigner::new().with_time(fixture_time());

        // The transport verb does not leak into the signed request line.
        let (mut parts, _) = http::Request::post("https://example.com/v1/chat")
            .body(())?
            .into_parts();
        builder
            .sign_request(&Context::new(), &mut parts, Some(&fixture_credential()), None)
            .await?;

        assert_eq!(parts.method, Method::POST);
        let pairs = query_pairs(&parts.uri.to_string());
        assert_eq!(pairs.len(), 3);
        let authorization = String::from_utf8(base64_decode(&pairs[0].1)?)?;
        assert!(authorization.ends_with(&format!(r#"signature="{FIXTURE_SIGNATURE}""#)));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_with_port_signs_authority() -> Result<()> {
        let builder = RequestSigner::new().with_time(fixture_time());

        let (mut parts, _) = http::Request::get("http://127.0.0.1:8080/v1/chat")
            .body(())?
            .into_parts();
        builder
            .sign_request(&Context::new(), &mut parts, Some(&fixture_credential()), None)
            .await?;

        let pairs = query_pairs(&parts.uri.to_string());
        assert_eq!(pairs[2], ("host".to_string(), "127.0.0.1:8080".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_rejects_bad_input() -> Result<()> {
        let builder = RequestSigner::new().with_time(fixture_time());
        let ctx = Context::new();

        let (mut parts, _) = http::Request::get("https://example.com/v1/chat")
            .body(())?
            .into_parts();
        let err = builder
            .sign_request(&ctx, &mut parts, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = builder
            .sign_request(
                &ctx,
                &mut parts,
                Some(&fixture_credential()),
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        let (mut parts, _) = http::Request::get("https://example.com/v1/chat?a=b")
            .body(())?
            .into_parts();
        let err = builder
            .sign_request(&ctx, &mut parts, Some(&fixture_credential()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_with_signer() -> Result<()> {
        let loader = StaticCredentialProvider::new("app-id", "test-secret", "test-key");
        let builder = RequestSigner::new().with_time(fixture_time());
        let signer = Signer::new(Context::new(), loader, builder);

        let (mut parts, _) = http::Request::get("https://example.com/v1/chat")
            .body(())?
            .into_parts();
        signer.sign(&mut parts, None).await?;

        let pairs = query_pairs(&parts.uri.to_string());
        assert_eq!(pairs[1], ("date".to_string(), FIXTURE_DATE.to_string()));
        Ok(())
    }
}
