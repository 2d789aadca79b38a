//! Command line handlers module
//!
//! This module contains the handlers behind each CLI subcommand and the
//! context they share: settings, the auth shell and the terminal prompter.

pub mod commands;
pub mod prompt;

pub use commands::{handle_command, Command};
pub use prompt::Prompter;

use tracing::debug;

use crate::config::Settings;
use crate::models::User;
use crate::services::{Permission, ServiceFactory};
use crate::state::{AuthShell, AuthState};
use crate::utils::errors::Result;

/// Everything a command handler needs
pub struct CliContext {
    pub settings: Settings,
    pub shell: AuthShell,
    pub prompt: Prompter,
}

impl CliContext {
    pub async fn new(settings: Settings) -> Result<Self> {
        let services = ServiceFactory::new(&settings)?;
        let shell = AuthShell::start(services, &settings).await?;
        Ok(Self {
            settings,
            shell,
            prompt: Prompter::new(),
        })
    }

    pub fn services(&self) -> &ServiceFactory {
        self.shell.services()
    }

    /// Confirm the stored session and check `required`
    pub async fn signed_in(&mut self, required: Permission) -> Result<User> {
        let state = self.shell.state().clone();
        match state {
            AuthState::Verifying => {
                self.shell.verify().await?;
            }
            AuthState::Authenticated { .. } => self.shell.ensure_fresh().await?,
            AuthState::Unauthenticated => {
                debug!("No stored session");
            }
        }
        self.shell.require(required).cloned()
    }
}
