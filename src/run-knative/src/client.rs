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

//! The client for the Cloud Run `serving.knative.dev/v1` services API.

use crate::credentials::{self, TokenSource};
use crate::error::{Error, classify};
use crate::model::{EnvVar, ServiceRequest};
use crate::{Response, Result};
use http::StatusCode;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;

/// The regional endpoint used when the application does not set one.
pub const DEFAULT_HOST: &str = "https://us-central1-run.googleapis.com/";

/// Path segments keep unreserved characters and encode everything else.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Implements a client for the Cloud Run services API.
///
/// # Example
/// ```no_run
/// # use google_cloud_run_knative::client::Services;
/// # async fn sample() -> anyhow::Result<()> {
/// let client = Services::builder().build().await?;
/// let response = client
///     .create_service()
///     .set_service_name("hello")
///     .set_project_id("my-project")
///     .set_image("us-docker.pkg.dev/cloudrun/container/hello")
///     .send()
///     .await?;
/// println!("{}", response.text());
/// # Ok(()) }
/// ```
///
/// # Configuration
///
/// Use [Services::builder] to override the endpoint or to inject a different
/// [TokenProvider][crate::credentials::TokenProvider]. By default the client
/// uses [DEFAULT_HOST] and Application Default Credentials.
///
/// # Pooling and Cloning
///
/// `Services` holds a connection pool internally, it is advised to create one
/// and reuse it. Cloning is cheap, the clones share the pool.
#[derive(Clone, Debug)]
pub struct Services {
    inner: Arc<ServicesInner>,
}

#[derive(Debug)]
pub(crate) struct ServicesInner {
    client: reqwest::Client,
    token_source: TokenSource,
    endpoint: String,
}

impl Services {
    /// Returns a builder for [Services].
    ///
    /// ```no_run
    /// # use google_cloud_run_knative::client::Services;
    /// # async fn sample() -> anyhow::Result<()> {
    /// let client = Services::builder()
    ///     .with_endpoint("https://europe-west1-run.googleapis.com")
    ///     .build()
    ///     .await?;
    /// # Ok(()) }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a new service.
    ///
    /// Returns a request builder, set the fields and call
    /// [send()][CreateService::send].
    ///
    /// # Errors
    ///
    /// `send()` returns [Error::Conflict] if a service with the same name
    /// already exists in the project, and [Error::Http] for any other 4xx or
    /// 5xx status. Any status other than `200 OK` is also logged at the
    /// `ERROR` level, including the response body.
    pub fn create_service(&self) -> CreateService {
        CreateService::new(self.inner.clone())
    }

    /// Creates a new service from an existing request.
    pub async fn create_service_from(&self, request: &ServiceRequest) -> Result<Response> {
        self.inner.create_service(request).await
    }

    pub(crate) fn new(builder: ClientBuilder) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(Error::transport)?;
        let token_source = builder
            .token_source
            .unwrap_or_else(TokenSource::application_default);
        let endpoint = builder
            .endpoint
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        Ok(Self {
            inner: Arc::new(ServicesInner {
                client,
                token_source,
                endpoint,
            }),
        })
    }
}

impl ServicesInner {
    async fn create_service(&self, request: &ServiceRequest) -> Result<Response> {
        request.validate()?;
        let token = self
            .token_source
            .token()
            .await
            .map_err(Error::authentication)?;
        let body = request.descriptor().to_json().map_err(Error::ser)?;
        let response = self
            .client
            .post(self.services_url(request.project_id()))
            .headers(credentials::headers(&token)?)
            .body(body)
            .send()
            .await
            .map_err(Error::transport)?;
        let response = Response::from_reqwest(response).await?;
        if response.status() != StatusCode::OK {
            tracing::error!(
                service_name = request.service_name(),
                status = response.status().as_u16(),
                "{}",
                response.text()
            );
        }
        classify(request.service_name(), &response)?;
        Ok(response)
    }

    fn services_url(&self, project_id: &str) -> String {
        format!(
            "{}/apis/serving.knative.dev/v1/namespaces/{}/services",
            self.endpoint.trim_end_matches('/'),
            utf8_percent_encode(project_id, PATH_SEGMENT)
        )
    }
}

/// A builder for [Services].
///
/// ```no_run
/// # use google_cloud_run_knative::client::Services;
/// # use google_cloud_run_knative::credentials::ApplicationDefault;
/// # async fn sample() -> anyhow::Result<()> {
/// let client = Services::builder()
///     .with_token_provider(ApplicationDefault::new())
///     .build()
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    token_source: Option<TokenSource>,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [Error::Transport] if the HTTP client cannot be initialized.
    pub async fn build(self) -> Result<Services> {
        Services::new(self)
    }

    /// Sets the endpoint.
    ///
    /// The request path is appended to this value. A trailing `/` is optional.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Configures the token provider.
    ///
    /// Accepts any [TokenProvider][crate::credentials::TokenProvider] or a
    /// [TokenSource].
    pub fn with_token_provider<V: Into<TokenSource>>(mut self, v: V) -> Self {
        self.token_source = Some(v.into());
        self
    }
}

/// The request builder for [Services::create_service] calls.
///
/// ```no_run
/// # use google_cloud_run_knative::client::Services;
/// # async fn sample(client: &Services) -> anyhow::Result<()> {
/// let response = client
///     .create_service()
///     .set_service_name("hello")
///     .set_project_id("my-project")
///     .set_service_account("runner@my-project.iam.gserviceaccount.com")
///     .set_image("us-docker.pkg.dev/cloudrun/container/hello")
///     .set_environment_variables([("GREETING", "hello")])
///     .send()
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct CreateService {
    inner: Arc<ServicesInner>,
    request: ServiceRequest,
}

impl CreateService {
    pub(crate) fn new(inner: Arc<ServicesInner>) -> Self {
        Self {
            inner,
            request: ServiceRequest::default(),
        }
    }

    /// Sets the full request.
    pub fn with_request<V: Into<ServiceRequest>>(mut self, v: V) -> Self {
        self.request = v.into();
        self
    }

    /// Sets the value of `service_name`. Required.
    pub fn set_service_name<T: Into<String>>(mut self, v: T) -> Self {
        self.request = self.request.set_service_name(v);
        self
    }

    /// Sets the value of `project_id`. Required.
    pub fn set_project_id<T: Into<String>>(mut self, v: T) -> Self {
        self.request = self.request.set_project_id(v);
        self
    }

    /// Sets the value of `image`. Required.
    pub fn set_image<T: Into<String>>(mut self, v: T) -> Self {
        self.request = self.request.set_image(v);
        self
    }

    /// Sets the value of `service_account`.
    pub fn set_service_account<T: Into<String>>(mut self, v: T) -> Self {
        self.request = self.request.set_service_account(v);
        self
    }

    /// Sets or clears the value of `service_account`.
    pub fn set_or_clear_service_account<T: Into<String>>(mut self, v: Option<T>) -> Self {
        self.request = self.request.set_or_clear_service_account(v);
        self
    }

    /// Sets the value of `environment_variables`.
    pub fn set_environment_variables<I, V>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnvVar>,
    {
        self.request = self.request.set_environment_variables(v);
        self
    }

    /// Sets or clears the value of `environment_variables`.
    pub fn set_or_clear_environment_variables<I, V>(mut self, v: Option<I>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnvVar>,
    {
        self.request = self.request.set_or_clear_environment_variables(v);
        self
    }

    /// Sends the request.
    pub async fn send(self) -> Result<Response> {
        self.inner.create_service(&self.request).await
    }
}
