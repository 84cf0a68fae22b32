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

use awsreq_aws_v4::X_AMZ_CONTENT_SHA_256;
use awsreq_core::hash::hex_sha256;
use awsreq_core::{Error, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::uri::Authority;
use http::{Method, Request};

/// The single request to sign and send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Service name used in the credential scope, like `es`.
    pub service: String,
    /// AWS region, like `us-east-1`.
    pub region: String,
    /// Destination host, optionally with `:port`.
    pub host: String,
    /// HTTP method.
    pub method: String,
    /// Request path, may include the query string.
    pub path: String,
    /// Raw request payload.
    pub body: String,
    /// `Content-Type` to send along with the body.
    pub content_type: Option<String>,
}

impl RequestParams {
    /// Create new request parameters.
    pub fn new(
        service: impl Into<String>,
        region: impl Into<String>,
        host: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            host: host.into(),
            method: method.into(),
            path: path.into(),
            body: body.into(),
            content_type: None,
        }
    }

    /// Set the `Content-Type` header.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Check that every component required for signing is present.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("service", &self.service),
            ("region", &self.region),
            ("host", &self.host),
            ("method", &self.method),
        ] {
            if value.trim().is_empty() {
                return Err(Error::request_invalid(format!("{name} must not be empty")));
            }
        }

        self.host.parse::<Authority>().map_err(|e| {
            Error::request_invalid(format!("host {:?} is not a valid host[:port]", self.host))
                .with_source(e)
        })?;
        self.http_method()?;
        Ok(())
    }

    /// The path to request, always starting with `/`.
    ///
    /// Consecutive slashes before the query string are collapsed, so an empty
    /// segment like `/logs//_search` is sent as `/logs/_search`.
    pub fn normalized_path(&self) -> String {
        let (path, query) = match self.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.path.as_str(), None),
        };

        let mut normalized = String::with_capacity(self.path.len() + 1);
        normalized.push('/');
        for c in path.chars() {
            if c == '/' && normalized.ends_with('/') {
                continue;
            }
            normalized.push(c);
        }
        if let Some(query) = query {
            normalized.push('?');
            normalized.push_str(query);
        }
        normalized
    }

    fn http_method(&self) -> Result<Method> {
        Ok(Method::from_bytes(
            self.method.trim().to_ascii_uppercase().as_bytes(),
        )?)
    }

    /// Build the unsigned http request.
    ///
    /// `x-amz-content-sha256` carries the hex encoded sha256 of the body, so
    /// the payload is part of the signature.
    pub fn to_http_request(&self, secure: bool) -> Result<Request<Bytes>> {
        self.validate()?;

        let scheme = if secure { "https" } else { "http" };
        let uri = format!("{scheme}://{}{}", self.host, self.normalized_path());

        let mut builder = Request::builder()
            .method(self.http_method()?)
            .uri(&uri)
            .header(X_AMZ_CONTENT_SHA_256, hex_sha256(self.body.as_bytes()));
        if let Some(content_type) = &self.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        builder
            .body(Bytes::from(self.body.clone()))
            .map_err(|e| Error::from(e).with_context(format!("uri: {uri}")))
    }
}
