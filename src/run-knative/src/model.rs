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

//! Request and payload types for the Knative `serving.knative.dev/v1` API.

use crate::error::BindingError;

pub(crate) const API_VERSION: &str = "serving.knative.dev/v1";
pub(crate) const KIND: &str = "Service";
pub(crate) const MIN_SCALE: &str = "0";
pub(crate) const MAX_SCALE: &str = "1";
pub(crate) const TIMEOUT_SECONDS: i32 = 180;
pub(crate) const MEMORY_LIMIT: &str = "128Mi";

/// An environment variable set in the service container.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct EnvVar {
    /// The variable name.
    pub name: String,
    /// The variable value.
    pub value: String,
}

impl EnvVar {
    /// Creates a variable from its name and value.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N, V> From<(N, V)> for EnvVar
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// The caller-supplied parameters to create a service.
///
/// # Example
/// ```
/// # use google_cloud_run_knative::model::ServiceRequest;
/// let request = ServiceRequest::new("hello", "my-project", "us-docker.pkg.dev/cloudrun/container/hello")
///     .set_service_account("runner@my-project.iam.gserviceaccount.com")
///     .set_environment_variables([("GREETING", "hello")]);
/// assert_eq!(request.service_name(), "hello");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServiceRequest {
    service_name: String,
    project_id: String,
    service_account: Option<String>,
    image: String,
    environment_variables: Option<Vec<EnvVar>>,
}

impl ServiceRequest {
    pub fn new<N, P, I>(service_name: N, project_id: P, image: I) -> Self
    where
        N: Into<String>,
        P: Into<String>,
        I: Into<String>,
    {
        Self {
            service_name: service_name.into(),
            project_id: project_id.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Sets the service name, sent as `metadata.name`.
    pub fn set_service_name<T: Into<String>>(mut self, v: T) -> Self {
        self.service_name = v.into();
        self
    }

    /// Sets the project id, sent as `metadata.namespace` and used in the path.
    pub fn set_project_id<T: Into<String>>(mut self, v: T) -> Self {
        self.project_id = v.into();
        self
    }

    /// Sets the container image reference.
    pub fn set_image<T: Into<String>>(mut self, v: T) -> Self {
        self.image = v.into();
        self
    }

    /// Sets the identity the service runs as.
    pub fn set_service_account<T: Into<String>>(mut self, v: T) -> Self {
        self.service_account = Some(v.into());
        self
    }

    /// Sets or clears the identity the service runs as.
    ///
    /// When cleared the provider picks its default identity.
    pub fn set_or_clear_service_account<T: Into<String>>(mut self, v: Option<T>) -> Self {
        self.service_account = v.map(Into::into);
        self
    }

    /// Sets the container environment, in order.
    pub fn set_environment_variables<I, V>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnvVar>,
    {
        self.environment_variables = Some(v.into_iter().map(Into::into).collect());
        self
    }

    /// Sets or clears the container environment.
    ///
    /// A cleared environment is sent as JSON `null`, not as an empty list.
    pub fn set_or_clear_environment_variables<I, V>(mut self, v: Option<I>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnvVar>,
    {
        self.environment_variables = v.map(|v| v.into_iter().map(Into::into).collect());
        self
    }

    /// The service name, also the resource name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The project, used as the Knative namespace.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The identity the revision runs as, if set.
    pub fn service_account(&self) -> Option<&str> {
        self.service_account.as_deref()
    }

    /// The container image.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The container environment, if set.
    pub fn environment_variables(&self) -> Option<&[EnvVar]> {
        self.environment_variables.as_deref()
    }

    /// Returns the payload sent to the service.
    pub fn descriptor(&self) -> ServiceDescriptor<'_> {
        ServiceDescriptor::new(self)
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), BindingError> {
        [
            ("service_name", &self.service_name),
            ("project_id", &self.project_id),
            ("image", &self.image),
        ]
        .into_iter()
        .find(|(_, v)| v.is_empty())
        .map_or(Ok(()), |(name, _)| {
            Err(BindingError::MissingRequiredParameter(name.to_string()))
        })
    }
}

/// The JSON document describing the service to create.
///
/// Only the name, namespace, service account, image and environment come from
/// the request. The API version, kind, autoscaling bounds, request timeout,
/// and memory limit are fixed. The descriptor is not validated locally, the
/// service rejects malformed descriptors.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: ObjectMeta<'a>,
    spec: ServiceSpec<'a>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct ObjectMeta<'a> {
    name: &'a str,
    namespace: &'a str,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct ServiceSpec<'a> {
    template: RevisionTemplate<'a>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct RevisionTemplate<'a> {
    metadata: TemplateMeta,
    spec: RevisionSpec<'a>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct TemplateMeta {
    annotations: Annotations,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct Annotations {
    #[serde(rename = "autoscaling.knative.dev/minScale")]
    min_scale: &'static str,
    #[serde(rename = "autoscaling.knative.dev/maxScale")]
    max_scale: &'static str,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RevisionSpec<'a> {
    timeout_seconds: i32,
    service_account_name: Option<&'a str>,
    containers: [Container<'a>; 1],
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct Container<'a> {
    image: &'a str,
    env: Option<&'a [EnvVar]>,
    resources: Resources,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct Resources {
    limits: Limits,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
struct Limits {
    memory: &'static str,
}

impl<'a> ServiceDescriptor<'a> {
    fn new(request: &'a ServiceRequest) -> Self {
        Self {
            api_version: API_VERSION,
            kind: KIND,
            metadata: ObjectMeta {
                name: request.service_name(),
                namespace: request.project_id(),
            },
            spec: ServiceSpec {
                template: RevisionTemplate {
                    metadata: TemplateMeta {
                        annotations: Annotations {
                            min_scale: MIN_SCALE,
                            max_scale: MAX_SCALE,
                        },
                    },
                    spec: RevisionSpec {
                        timeout_seconds: TIMEOUT_SECONDS,
                        service_account_name: request.service_account(),
                        containers: [Container {
                            image: request.image(),
                            env: request.environment_variables(),
                            resources: Resources {
                                limits: Limits {
                                    memory: MEMORY_LIMIT,
                                },
                            },
                        }],
                    },
                },
            },
        }
    }

    /// Serializes the descriptor to the JSON request body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
