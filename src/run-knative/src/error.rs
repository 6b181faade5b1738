// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Errors returned by the Cloud Run client.

use crate::Response;
use bytes::Bytes;
use http::StatusCode;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error returned by all operations in this crate.
///
/// Applications can match on the variants or use the predicates:
///
/// ```
/// use google_cloud_run_knative::Error;
/// match example_function() {
///     Err(e) if e.is_conflict() => { println!("already there: {e}"); },
///     Err(e) if e.is_http() => { println!("service error {:?}", e.http_status_code()); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<(), Error> {
///     // ... details omitted ...
///     # Err(Error::Conflict { service_name: "my-service".to_string() })
/// }
/// ```
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The service already exists, the service returned `409 CONFLICT`.
    #[error("The service with the name: {service_name} already exists")]
    Conflict { service_name: String },

    /// The service returned any other 4xx or 5xx status.
    #[error("HTTP error: code={status}, payload={}", String::from_utf8_lossy(.body))]
    Http { status: u16, body: Bytes },

    /// The token provider could not produce a bearer token.
    #[error("cannot obtain an access token")]
    Authentication(#[source] BoxError),

    /// The request could not be sent, or the response could not be read.
    #[error("cannot send the request or receive the response")]
    Transport(#[source] BoxError),

    /// The request is missing required fields.
    #[error("cannot bind the request: {0}")]
    Binding(#[from] BindingError),

    /// The service descriptor could not be serialized.
    #[error("cannot serialize the service descriptor")]
    Serialization(#[source] BoxError),

    /// The response body could not be decoded.
    #[error("cannot deserialize the response")]
    Deserialization(#[source] BoxError),
}

impl Error {
    /// Creates an error representing a token provider failure.
    pub fn authentication<T: Into<BoxError>>(source: T) -> Self {
        Self::Authentication(source.into())
    }

    /// Creates an error representing a transport failure.
    pub fn transport<T: Into<BoxError>>(source: T) -> Self {
        Self::Transport(source.into())
    }

    pub(crate) fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self::Serialization(source.into())
    }

    pub(crate) fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self::Deserialization(source.into())
    }

    /// The service already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The service rejected the request with a 4xx or 5xx status other than
    /// `409 CONFLICT`.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// The token provider failed.
    ///
    /// # Troubleshooting
    ///
    /// Verify Application Default Credentials are configured, for example
    /// with `gcloud auth application-default login`, or inject a different
    /// token provider.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// The request could not reach the service, or the response was lost.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// A required request field is empty.
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    /// The HTTP status code, if the service returned one.
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::Conflict { .. } => Some(StatusCode::CONFLICT.as_u16()),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw response body of a [Error::Http] error.
    pub fn http_payload(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Problems found in the request before it is sent.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum BindingError {
    #[error("missing required parameter {0}")]
    MissingRequiredParameter(String),
}

/// Maps a response to the error it represents, if any.
///
/// `409 CONFLICT` becomes [Error::Conflict], any other 4xx or 5xx status
/// becomes [Error::Http]. All other statuses are not errors. This function
/// does not log, callers decide how to report the response.
///
/// # Example
/// ```
/// # use google_cloud_run_knative::{Response, error::classify};
/// use http::{HeaderMap, StatusCode};
/// let response = Response::from_parts(StatusCode::CONFLICT, HeaderMap::new(), "exists");
/// let err = classify("my-service", &response).unwrap_err();
/// assert_eq!(err.to_string(), "The service with the name: my-service already exists");
/// ```
pub fn classify(service_name: &str, response: &Response) -> crate::Result<()> {
    match response.status() {
        StatusCode::CONFLICT => Err(Error::Conflict {
            service_name: service_name.to_string(),
        }),
        s if s.is_client_error() || s.is_server_error() => Err(Error::Http {
            status: s.as_u16(),
            body: response.body().clone(),
        }),
        _ => Ok(()),
    }
}
