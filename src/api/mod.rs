pub mod chat;
pub mod contact;
pub mod health;
pub mod newsletter;
pub mod test_email;

use axum::Router;

use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(health::health_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(chat::chat_routes())
        .merge(contact::contact_routes())
        .merge(newsletter::newsletter_routes())
        .merge(test_email::test_email_routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::create_router;
    use crate::config::Config;
    use crate::mail::{
        MailError, MailTransport, MailTransportConfig, OutgoingMail, TransportConnector,
    };
    use crate::newsletter::NewsletterStore;
    use crate::state::AppState;

    pub const CONFIGURED_OUTLOOK: &[(&str, &str)] = &[
        ("EMAIL_PROVIDER", "outlook"),
        ("EMAIL_USER", "a@b.com"),
        ("EMAIL_APP_PASSWORD", "x"),
    ];

    #[derive(Default)]
    struct Recorder {
        connects: AtomicUsize,
        fail_verify: AtomicBool,
        fail_send: AtomicBool,
        configs: Mutex<Vec<MailTransportConfig>>,
        sent: Mutex<Vec<OutgoingMail>>,
    }

    /// Connector that records traffic instead of talking SMTP
    #[derive(Clone, Default)]
    pub struct FakeConnector {
        recorder: Arc<Recorder>,
    }

    impl FakeConnector {
        pub fn fail_verify(&self) {
            self.recorder.fail_verify.store(true, Ordering::SeqCst);
        }

        pub fn fail_send(&self) {
            self.recorder.fail_send.store(true, Ordering::SeqCst);
        }

        pub fn connects(&self) -> usize {
            self.recorder.connects.load(Ordering::SeqCst)
        }

        pub fn configs(&self) -> Vec<MailTransportConfig> {
            self.recorder.configs.lock().unwrap().clone()
        }

        pub fn sent(&self) -> Vec<OutgoingMail> {
            self.recorder.sent.lock().unwrap().clone()
        }
    }

    impl TransportConnector for FakeConnector {
        fn connect(
            &self,
            config: &MailTransportConfig,
        ) -> Result<Box<dyn MailTransport>, MailError> {
            self.recorder.connects.fetch_add(1, Ordering::SeqCst);
            self.recorder.configs.lock().unwrap().push(config.clone());
            Ok(Box::new(FakeTransport {
                recorder: self.recorder.clone(),
            }))
        }
    }

    struct FakeTransport {
        recorder: Arc<Recorder>,
    }

    #[async_trait]
    impl MailTransport for FakeTransport {
        async fn verify(&self) -> Result<(), MailError> {
            if self.recorder.fail_verify.load(Ordering::SeqCst) {
                return Err(MailError::VerificationFailed(
                    "535 Authentication failed".to_string(),
                ));
            }
            Ok(())
        }

        async fn send_mail(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            if self.recorder.fail_send.load(Ordering::SeqCst) {
                return Err(MailError::SendFailed("421 Service not available".to_string()));
            }
            self.recorder.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    pub struct TestApp {
        pub router: Router,
        pub connector: FakeConnector,
        pub data_dir: PathBuf,
    }

    impl TestApp {
        pub fn new(vars: &[(&str, &str)]) -> Self {
            let env: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let data_dir =
                std::env::temp_dir().join(format!("pupito-api-{}", uuid::Uuid::new_v4()));
            let config = Config {
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
                data_dir: data_dir.display().to_string(),
                jwt_secret: "test-secret-key".to_string(),
            };
            let connector = FakeConnector::default();
            let state = AppState::with_parts(
                config,
                Arc::new(env),
                Arc::new(connector.clone()),
                NewsletterStore::new(&data_dir),
            );

            Self {
                router: create_router(state),
                connector,
                data_dir,
            }
        }
    }

    impl Drop for TestApp {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.data_dir).ok();
        }
    }

    async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Should build request");
        call(app, request).await
    }

    pub async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri)
            .body(Body::empty())
            .expect("Should build request");
        call(app, request).await
    }
}
