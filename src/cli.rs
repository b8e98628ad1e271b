use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::client::{DEFAULT_BASE_URL, EchoClient, create_echo_client};
use crate::credentials::{CredentialStore, FileTokenStore, StaticTokenStore};
use crate::error::{ServiceError, ServiceResult};
use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArguments,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Send one message to the echo endpoint and print the reply
    Send(SendArguments),
    /// Read messages from a prompt, sending each one as it is entered
    Interactive,
    /// Probe the backend's health endpoint
    Health(HealthArguments),
    /// Show the resolved connection configuration
    Status,
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct SendArguments {
    /// Text to send; prompts for it when omitted
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct HealthArguments {
    /// Print a multi-line report
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArguments {
    /// Backend base URL
    #[arg(long, global = true, env = "ECHOES_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Bearer token (takes precedence over the token file)
    #[arg(long, global = true, env = "ECHOES_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File holding the bearer token [default: ~/.echoes/token]
    #[arg(long, global = true, env = "ECHOES_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,
}

impl ConnectionArguments {
    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        create_echo_client(&self.base_url)
            .map(|_| ())
            .map_err(|e| format!("Invalid ECHOES_BASE_URL '{}': {e}", self.base_url))?;
        if let Some(path) = &self.token_file
            && path.as_os_str().is_empty()
        {
            return Err("ECHOES_TOKEN_FILE cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn client(&self) -> ServiceResult<EchoClient> {
        create_echo_client(&self.base_url)
    }

    pub fn credential_store(&self) -> ServiceResult<Arc<dyn CredentialStore>> {
        if let Some(token) = &self.token {
            return Ok(Arc::new(StaticTokenStore::new(Some(token.clone()))));
        }
        let path = match &self.token_file {
            Some(path) => path.clone(),
            None => FileTokenStore::default_path()?,
        };
        Ok(Arc::new(FileTokenStore::new(path)))
    }

    /// Report for `status`. Never includes the token itself.
    pub fn describe(&self) -> ServiceResult<String> {
        let client = self.client()?;
        let store = self.credential_store()?;
        let token_state = match store.load() {
            Ok(Some(_)) => "present".to_string(),
            Ok(None) => "absent (requests send `Bearer null`)".to_string(),
            Err(e) => format!("unreadable ({e})"),
        };
        Ok(format!(
            "base_url: {}\nendpoint: {}\ntoken_source: {}\ntoken: {}",
            client.base_url(),
            client.echo_url(),
            store.describe(),
            token_state
        ))
    }
}

impl Cli {
    pub fn validate(&self) -> ServiceResult<()> {
        self.connection.validate().map_err(ServiceError::Config)
    }
}
