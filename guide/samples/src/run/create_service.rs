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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use google_cloud_run_knative::client::Services;

    tracing_subscriber::fmt::init();

    let project_id = std::env::var("GCP_PROJECT")?;
    let service_account = std::env::var("SERVICE_ACCOUNT")?;
    let client = Services::builder().build().await?;

    let response = client
        .create_service()
        .set_service_name("cloud-run-name")
        .set_project_id(project_id)
        .set_service_account(service_account)
        .set_image("us-docker.pkg.dev/cloudrun/container/hello")
        .set_environment_variables([("test_d", "value"), ("test_d1", "value1")])
        .send()
        .await?;

    println!("{response:?}");

    Ok(())
}
