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

#[cfg(test)]
mod tests {
    use google_cloud_run_knative::client::Services;
    use google_cloud_run_knative::credentials::{Result as TokenResult, Token, TokenProvider};
    use google_cloud_run_knative::model::{EnvVar, ServiceRequest};
    use google_cloud_test_utils::test_layer::{CaptureGuard, CapturedEvent, TestLayer};
    use http::StatusCode;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::{Value, json};
    use test_case::test_case;

    type Result<T> = anyhow::Result<T>;

    const PATH: &str = "/apis/serving.knative.dev/v1/namespaces/my-project/services";

    mockall::mock! {
        #[derive(Debug)]
        Provider {}

        impl TokenProvider for Provider {
            async fn token(&self) -> TokenResult<Token>;
        }
    }

    fn test_provider() -> MockProvider {
        let mut mock = MockProvider::new();
        mock.expect_token()
            .times(1)
            .returning(|| Ok(Token::new("test-token")));
        mock
    }

    async fn test_client(server: &Server) -> Result<Services> {
        let client = Services::builder()
            .with_endpoint(server.url_str("/"))
            .with_token_provider(test_provider())
            .build()
            .await?;
        Ok(client)
    }

    fn errors(guard: &CaptureGuard) -> Vec<CapturedEvent> {
        guard
            .capture_level(tracing::Level::ERROR)
            .into_iter()
            .filter(|e| e.target.starts_with("google_cloud_run_knative"))
            .collect()
    }

    fn expected_payload(env: Value) -> Value {
        json!({
            "apiVersion": "serving.knative.dev/v1",
            "kind": "Service",
            "metadata": {
                "name": "my-service",
                "namespace": "my-project"
            },
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            "autoscaling.knative.dev/minScale": "0",
                            "autoscaling.knative.dev/maxScale": "1"
                        }
                    },
                    "spec": {
                        "timeoutSeconds": 180,
                        "serviceAccountName": "runner@my-project.iam.gserviceaccount.com",
                        "containers": [{
                            "image": "us-docker.pkg.dev/cloudrun/container/hello",
                            "env": env,
                            "resources": {"limits": {"memory": "128Mi"}}
                        }]
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn success() -> Result<()> {
        let guard = TestLayer::initialize();
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", PATH),
                request::headers(contains(("authorization", "Bearer test-token"))),
                request::headers(contains(("content-type", "application/json"))),
                request::body(json_decoded(eq(expected_payload(json!([
                    {"name": "test_d", "value": "value"},
                    {"name": "test_d1", "value": "value1"}
                ]))))),
            ])
            .respond_with(status_code(200).body(r#"{"status":"ok"}"#)),
        );

        let client = test_client(&server).await?;
        let response = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_service_account("runner@my-project.iam.gserviceaccount.com")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .set_environment_variables([("test_d", "value"), ("test_d1", "value1")])
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"status":"ok"}"#);
        assert_eq!(response.json::<Value>()?, json!({"status": "ok"}));

        let logged = errors(&guard);
        assert!(logged.is_empty(), "{logged:?}");
        Ok(())
    }

    #[tokio::test]
    async fn absent_environment_is_null() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", PATH),
                request::body(json_decoded(eq(expected_payload(Value::Null)))),
            ])
            .respond_with(status_code(200).body("{}")),
        );

        let client = test_client(&server).await?;
        let request = ServiceRequest::new(
            "my-service",
            "my-project",
            "us-docker.pkg.dev/cloudrun/container/hello",
        )
        .set_service_account("runner@my-project.iam.gserviceaccount.com");
        let response = client.create_service_from(&request).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn empty_environment_is_empty_list() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", PATH),
                request::body(json_decoded(eq(expected_payload(json!([]))))),
            ])
            .respond_with(status_code(200).body("{}")),
        );

        let client = test_client(&server).await?;
        let response = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_service_account("runner@my-project.iam.gserviceaccount.com")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .set_environment_variables(Vec::<EnvVar>::new())
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn conflict() -> Result<()> {
        let guard = TestLayer::initialize();
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .respond_with(status_code(409).body("service already exists")),
        );

        let client = test_client(&server).await?;
        let err = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await
            .unwrap_err();
        assert!(err.is_conflict(), "{err:?}");
        assert_eq!(
            err.to_string(),
            "The service with the name: my-service already exists"
        );
        assert_eq!(err.http_status_code(), Some(409));

        let logged = errors(&guard);
        assert_eq!(logged.len(), 1, "{logged:?}");
        assert_eq!(logged[0].message(), Some("service already exists"));
        assert_eq!(logged[0].fields.get("status"), Some(&"409".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn server_error() -> Result<()> {
        let guard = TestLayer::initialize();
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .respond_with(status_code(500).body("internal error")),
        );

        let client = test_client(&server).await?;
        let err = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await
            .unwrap_err();
        assert!(err.is_http(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(500));
        assert_eq!(
            err.http_payload().map(|b| b.as_ref()),
            Some(b"internal error".as_slice())
        );

        let logged = errors(&guard);
        assert_eq!(logged.len(), 1, "{logged:?}");
        assert!(
            logged[0]
                .message()
                .is_some_and(|m| m.contains("internal error")),
            "{logged:?}"
        );
        Ok(())
    }

    #[tokio::test]
    #[test_case(400)]
    #[test_case(403)]
    #[test_case(404)]
    #[test_case(429)]
    #[test_case(503)]
    async fn other_errors(code: u16) -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .respond_with(status_code(code).body("nope")),
        );

        let client = test_client(&server).await?;
        let err = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await
            .unwrap_err();
        assert!(err.is_http(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(code));
        Ok(())
    }

    #[tokio::test]
    async fn non_ok_success_is_logged_and_returned() -> Result<()> {
        let guard = TestLayer::initialize();
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .respond_with(status_code(201).body("created")),
        );

        let client = test_client(&server).await?;
        let response = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.text(), "created");

        let logged = errors(&guard);
        assert_eq!(logged.len(), 1, "{logged:?}");
        assert_eq!(logged[0].message(), Some("created"));
        Ok(())
    }

    #[tokio::test]
    async fn authentication_error() -> Result<()> {
        // The server fails the test if it receives any request.
        let server = Server::run();
        let mut mock = MockProvider::new();
        mock.expect_token()
            .times(1)
            .returning(|| Err("test-only: credentials not found".into()));
        let client = Services::builder()
            .with_endpoint(server.url_str("/"))
            .with_token_provider(mock)
            .build()
            .await?;

        let err = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await
            .unwrap_err();
        assert!(err.is_authentication(), "{err:?}");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("test-only: credentials not found")
        );
        Ok(())
    }

    #[tokio::test]
    async fn transport_error() -> Result<()> {
        let _guard = google_cloud_test_utils::tracing::enable_tracing();
        // Nothing listens on port 1.
        let client = Services::builder()
            .with_endpoint("http://127.0.0.1:1")
            .with_token_provider(test_provider())
            .build()
            .await?;

        let err = client
            .create_service()
            .set_service_name("my-service")
            .set_project_id("my-project")
            .set_image("us-docker.pkg.dev/cloudrun/container/hello")
            .send()
            .await
            .unwrap_err();
        assert!(err.is_transport(), "{err:?}");
        assert_eq!(err.http_status_code(), None);
        Ok(())
    }

    #[tokio::test]
    async fn one_request_per_call() -> Result<()> {
        let _guard = google_cloud_test_utils::tracing::enable_tracing();
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .times(2)
                .respond_with(status_code(200).body("{}")),
        );

        let mut mock = MockProvider::new();
        mock.expect_token()
            .times(2)
            .returning(|| Ok(Token::new("test-token")));
        let client = Services::builder()
            .with_endpoint(server.url_str("/"))
            .with_token_provider(mock)
            .build()
            .await?;

        for _ in 0..2 {
            let response = client
                .create_service()
                .set_service_name("my-service")
                .set_project_id("my-project")
                .set_image("us-docker.pkg.dev/cloudrun/container/hello")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
        }
        Ok(())
    }
}
