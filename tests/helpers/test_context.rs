//! Test context
//!
//! One mock backend, settings pointing at it and a temporary directory for
//! the session file, logs and downloaded certificates.

use std::path::PathBuf;
use tempfile::TempDir;
use vpass::config::Settings;
use vpass::services::ServiceFactory;
use vpass::state::{AuthShell, SessionStore};

use super::backend_mock::BackendMockServer;

pub struct TestContext {
    pub backend: BackendMockServer,
    pub settings: Settings,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_redirect_delay(50).await
    }

    pub async fn with_redirect_delay(redirect_delay_ms: u64) -> Self {
        let backend = BackendMockServer::new().await;
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut settings = Settings::default();
        settings.api.base_url = backend.uri();
        settings.api.timeout_seconds = 5;
        settings.session.storage_path = temp_dir
            .path()
            .join("session.json")
            .to_string_lossy()
            .into_owned();
        settings.logging.file_path = temp_dir.path().join("logs").to_string_lossy().into_owned();
        settings.flow.redirect_delay_ms = redirect_delay_ms;

        Self {
            backend,
            settings,
            temp_dir,
        }
    }

    pub fn services(&self) -> ServiceFactory {
        ServiceFactory::new(&self.settings).expect("Failed to create services")
    }

    /// Services with a bearer token already set
    pub fn signed_in_services(&self) -> ServiceFactory {
        let services = self.services();
        services.api.set_token(Some("test-token".to_string()));
        services
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::from_config(&self.settings.session)
    }

    pub async fn shell(&self) -> AuthShell {
        AuthShell::start(self.services(), &self.settings)
            .await
            .expect("Failed to start auth shell")
    }

    pub fn download_dir(&self) -> PathBuf {
        self.temp_dir.path().join("certificates")
    }
}
