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

//! Examples showing how to handle errors.

use google_cloud_run_knative as run;

// [START rust_create_or_reuse] ANCHOR: rust_create_or_reuse
/// Creates the service, treating an existing service as success.
///
/// Returns `true` if this call created the service.
pub async fn create_or_reuse(
    client: &run::client::Services,
    project_id: &str,
    service_name: &str,
) -> crate::Result<bool> {
    let result = client
        .create_service()
        .set_service_name(service_name)
        .set_project_id(project_id)
        .set_image("us-docker.pkg.dev/cloudrun/container/hello")
        .send()
        .await;
    match result {
        // [START rust_create_or_reuse_success] ANCHOR: rust_create_or_reuse_success
        Ok(response) => {
            println!("created {service_name}: {}", response.status());
            Ok(true)
        }
        // [END rust_create_or_reuse_success] ANCHOR_END: rust_create_or_reuse_success
        // [START rust_create_or_reuse_conflict] ANCHOR: rust_create_or_reuse_conflict
        Err(e) if e.is_conflict() => {
            println!("{e}");
            Ok(false)
        }
        // [END rust_create_or_reuse_conflict] ANCHOR_END: rust_create_or_reuse_conflict
        // [START rust_create_or_reuse_http] ANCHOR: rust_create_or_reuse_http
        Err(e) if e.is_http() => {
            let payload = e
                .http_payload()
                .map(|p| String::from_utf8_lossy(p).to_string())
                .unwrap_or_default();
            println!("the service rejected the request: {payload}");
            Err(e.into())
        }
        // [END rust_create_or_reuse_http] ANCHOR_END: rust_create_or_reuse_http
        Err(e) => Err(e.into()),
    }
}
// [END rust_create_or_reuse] ANCHOR_END: rust_create_or_reuse
