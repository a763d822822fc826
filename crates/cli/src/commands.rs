//! CLI commands

use anyhow::Result;
use clap::Subcommand;
use portal_http::{PortalClient, ProfileChanges, UserProfile};
use std::io::Write;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,

        /// Password (read from PORTAL_PASSWORD when omitted)
        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with an existing account
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (read from PORTAL_PASSWORD when omitted)
        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show whether a session token is stored
    Status,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the current profile
    Show,

    /// Change profile fields
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Replace all editable fields (PUT) instead of patching the given ones
        #[arg(long)]
        replace: bool,
    },
}

impl Commands {
    pub async fn execute(self, client: &PortalClient, out: &mut impl Write) -> Result<()> {
        match self {
            Commands::Register { username, password } => {
                let session = client.register(&username, &password).await?;
                writeln!(
                    out,
                    "Registered {} (id {}), you are now signed in",
                    session.user.username, session.user.id
                )?;
            }
            Commands::Login { username, password } => {
                let session = client.login(&username, &password).await?;
                writeln!(out, "Signed in as {}", session.user.username)?;
            }
            Commands::Logout => {
                client.logout()?;
                writeln!(out, "Signed out")?;
            }
            Commands::Status => {
                if client.is_authenticated() {
                    writeln!(out, "Signed in to {}", client.base_url())?;
                } else {
                    writeln!(out, "Not signed in")?;
                }
            }
            Commands::Profile { command } => command.execute(client, out).await?,
        }
        Ok(())
    }
}

impl ProfileCommands {
    pub async fn execute(self, client: &PortalClient, out: &mut impl Write) -> Result<()> {
        match self {
            ProfileCommands::Show => {
                let profile = client.get_profile().await?;
                print_profile(out, &profile)?;
            }
            ProfileCommands::Update {
                username,
                email,
                first_name,
                last_name,
                replace,
            } => {
                let changes = ProfileChanges {
                    username,
                    email,
                    first_name,
                    last_name,
                };

                let profile = if replace {
                    info!("Replacing profile");
                    client.replace_profile(&changes).await?
                } else {
                    info!("Updating profile");
                    client.update_profile(&changes).await?
                };

                writeln!(out, "Profile updated")?;
                print_profile(out, &profile)?;
            }
        }
        Ok(())
    }
}

fn print_profile(out: &mut impl Write, profile: &UserProfile) -> Result<()> {
    writeln!(out, "ID:         {}", profile.id)?;
    writeln!(out, "Username:   {}", profile.username)?;
    if let Some(name) = profile.full_name() {
        writeln!(out, "Name:       {name}")?;
    }
    if let Some(email) = profile.email.as_deref().filter(|email| !email.is_empty()) {
        writeln!(out, "Email:      {email}")?;
    }
    if let Some(created_at) = profile.created_at {
        writeln!(out, "Member since {}", created_at.format("%Y-%m-%d"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_http::MemoryTokenStore;
    use std::sync::Arc;

    fn offline_client(token: Option<&str>) -> PortalClient {
        let store = token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token);
        PortalClient::builder()
            .base_url("http://127.0.0.1:1")
            .token_store(Arc::new(store))
            .build()
            .unwrap()
    }

    async fn run(command: Commands, client: &PortalClient) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = command.execute(client, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn status_reports_session() {
        let (result, out) = run(Commands::Status, &offline_client(None)).await;
        assert!(result.is_ok());
        assert_eq!(out, "Not signed in\n");

        let (_, out) = run(Commands::Status, &offline_client(Some("abc"))).await;
        assert_eq!(out, "Signed in to http://127.0.0.1:1\n");
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let client = offline_client(Some("abc"));
        let (result, out) = run(Commands::Logout, &client).await;
        assert!(result.is_ok());
        assert_eq!(out, "Signed out\n");
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn invalid_registration_fails_before_network() {
        let command = Commands::Register {
            username: "ab".to_string(),
            password: "longenough1".to_string(),
        };
        let (result, out) = run(command, &offline_client(None)).await;

        let error = result.unwrap_err();
        let client_error = error.downcast_ref::<portal_http::ClientError>().unwrap();
        assert!(client_error.field_errors().unwrap().contains("username"));
        assert!(out.is_empty());
    }

    #[test]
    fn profile_printout_skips_missing_fields() {
        let profile = UserProfile {
            id: 7,
            username: "alice".to_string(),
            email: Some(String::new()),
            first_name: Some("Alice".to_string()),
            last_name: None,
            created_at: None,
        };

        let mut out = Vec::new();
        print_profile(&mut out, &profile).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Username:   alice"));
        assert!(out.contains("Name:       Alice"));
        assert!(!out.contains("Email"));
    }
}
