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

//! Google Cloud Client Libraries for Rust - Cloud Run (Knative serving v1)
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases. Testing is also incomplete, we do
//! **not** recommend that you use this crate in production. We welcome feedback
//! about the APIs, documentation, missing features, bugs, etc.
//!
//! This crate creates [Cloud Run] services using the Knative-compatible
//! `serving.knative.dev/v1` REST surface. Each call obtains a bearer token,
//! builds a fixed-shape [service descriptor][model::ServiceDescriptor], and
//! sends it with a single `POST` request. There are no retries.
//!
//! Most applications use the [Services][client::Services] client:
//!
//! ```no_run
//! # use google_cloud_run_knative::client::Services;
//! # async fn sample() -> anyhow::Result<()> {
//! let client = Services::builder().build().await?;
//! let response = client
//!     .create_service()
//!     .set_service_name("hello")
//!     .set_project_id("my-project")
//!     .set_image("us-docker.pkg.dev/cloudrun/container/hello")
//!     .set_environment_variables([("GREETING", "hello")])
//!     .send()
//!     .await?;
//! println!("{:?}", response.status());
//! # Ok(()) }
//! ```
//!
//! Applications that only need a one-shot call can use [create_service].
//!
//! [Cloud Run]: https://cloud.google.com/run

pub mod client;
pub mod credentials;
pub mod error;
pub mod model;

mod response;
pub use response::Response;

pub use error::Error;

/// A `Result` alias where the `Err` case is [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Request builders.
pub mod builder {
    pub mod services {
        pub use crate::client::ClientBuilder;
        pub use crate::client::CreateService;
    }
}

/// Creates a Cloud Run service using Application Default Credentials.
///
/// Builds a [Services][client::Services] client with the default
/// configuration and sends one create request. Use the client directly to
/// override the endpoint or the token provider.
///
/// An absent `environment_variables` is sent as JSON `null`, which is not the
/// same as an empty list.
///
/// # Example
/// ```no_run
/// # async fn sample() -> anyhow::Result<()> {
/// use google_cloud_run_knative::model::EnvVar;
/// let response = google_cloud_run_knative::create_service(
///     "hello",
///     "my-project",
///     Some("runner@my-project.iam.gserviceaccount.com"),
///     "us-docker.pkg.dev/cloudrun/container/hello",
///     Some(vec![EnvVar::new("GREETING", "hello")]),
/// )
/// .await?;
/// println!("{:?}", response.status());
/// # Ok(()) }
/// ```
pub async fn create_service(
    service_name: &str,
    project_id: &str,
    service_account: Option<&str>,
    image: &str,
    environment_variables: Option<Vec<model::EnvVar>>,
) -> Result<Response> {
    create_service_with(
        client::Services::builder(),
        service_name,
        project_id,
        service_account,
        image,
        environment_variables,
    )
    .await
}

pub(crate) async fn create_service_with(
    builder: client::ClientBuilder,
    service_name: &str,
    project_id: &str,
    service_account: Option<&str>,
    image: &str,
    environment_variables: Option<Vec<model::EnvVar>>,
) -> Result<Response> {
    let client = builder.build().await?;
    client
        .create_service()
        .set_service_name(service_name)
        .set_project_id(project_id)
        .set_or_clear_service_account(service_account)
        .set_image(image)
        .set_or_clear_environment_variables(environment_variables)
        .send()
        .await
}
