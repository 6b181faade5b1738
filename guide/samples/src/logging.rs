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

// [START rust_logging] ANCHOR: rust_logging
/// # Parameters
/// - `project_id`: the id of a Google Cloud project. For example: `my-project`.
/// - `service_name`: the name of the new service.
pub async fn sample(project_id: &str, service_name: &str) -> anyhow::Result<()> {
    // [START rust_logging_use] ANCHOR: rust_logging_use
    use google_cloud_run_knative::client::Services;
    // [END rust_logging_use] ANCHOR_END: rust_logging_use

    // [START rust_logging_init] ANCHOR: rust_logging_init
    // Fails if the application already installed a subscriber.
    let _ = tracing_subscriber::fmt().try_init();
    // [END rust_logging_init] ANCHOR_END: rust_logging_init

    // [START rust_logging_call] ANCHOR: rust_logging_call
    let client = Services::builder().build().await?;
    // Any status other than 200 is logged at ERROR level with the response body.
    let response = client
        .create_service()
        .set_service_name(service_name)
        .set_project_id(project_id)
        .set_image("us-docker.pkg.dev/cloudrun/container/hello")
        .send()
        .await?;
    let body = response.json::<serde_json::Value>()?;
    println!("created {}", body["metadata"]["name"]);
    // [END rust_logging_call] ANCHOR_END: rust_logging_call
    Ok(())
}
// [END rust_logging] ANCHOR_END: rust_logging
