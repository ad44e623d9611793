//! Loginflow CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use loginflow::backend::BackendClient;
use loginflow::callback::CallbackCodeSource;
use loginflow::config::{self, Provider};
use loginflow::coordinator::{AuthFlowCoordinator, AuthOutcome};
use loginflow::session::{FileTokenStore, TokenStore};
use loginflow::strategy::{
    AuthStrategy, Credential, RedirectStrategy, StaticCredential, SystemBrowser,
    TokenExchangeStrategy,
};

#[derive(Parser)]
#[command(name = "loginflow")]
#[command(about = "🔐 Loginflow - social sign-in for JWT backends")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize loginflow configuration
    Init,

    /// Sign in with a provider
    Login {
        /// Provider to use: github or google
        #[arg(short, long)]
        provider: String,

        /// Sign-in method: redirect, authorize, token, or callback
        #[arg(short, long, default_value = "redirect")]
        strategy: String,

        /// Access token to exchange (token strategy; prompts if omitted)
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Refresh the stored access token
    Refresh,

    /// Show configuration and session status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => run_init()?,
        Commands::Login {
            provider,
            strategy,
            token,
        } => run_login(&provider, &strategy, token).await?,
        Commands::Logout => {
            FileTokenStore::new().clear()?;
            println!("✓ Logged out successfully");
        }
        Commands::Refresh => run_refresh().await?,
        Commands::Status => run_status()?,
    }

    Ok(())
}

fn run_init() -> Result<()> {
    use inquire::Text;

    println!("🔐 Loginflow setup\n");

    let mut config = config::Config::default();

    let base_url = Text::new("Backend base URL:")
        .with_default(&config.base_url)
        .prompt()?;
    config.base_url = base_url;

    let github_id = Text::new("GitHub OAuth client id (optional):").prompt()?;
    config.github.client_id = github_id;

    let google_id = Text::new("Google OAuth client id (optional):").prompt()?;
    config.google.client_id = google_id;

    config::save(&config)?;
    println!("\n✓ Configuration saved to {:?}", config::config_path());
    println!("\nNext: loginflow login --provider github");
    Ok(())
}

async fn run_login(provider: &str, strategy_name: &str, token: Option<String>) -> Result<()> {
    let provider: Provider = provider.parse()?;
    let config = config::load()?;

    let backend = BackendClient::new(config.base_url.clone())?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new());
    let mut provider_config = config.provider_config(provider);

    let strategy: Box<dyn AuthStrategy> = match strategy_name {
        "redirect" => {
            println!("🌐 Requesting {} authorization URL...", provider.display_name());
            Box::new(RedirectStrategy::backend(Arc::new(SystemBrowser)))
        }
        "authorize" => {
            println!("🌐 Opening {} authorization page...", provider.display_name());
            Box::new(RedirectStrategy::local(Arc::new(SystemBrowser)))
        }
        "token" => {
            let value = match token {
                Some(value) => value,
                None => {
                    inquire::Text::new(&format!(
                        "Enter your {} access token:",
                        provider.display_name()
                    ))
                    .prompt()?
                }
            };

            let source = if value.is_empty() {
                StaticCredential::empty()
            } else {
                StaticCredential::new(Credential::access_token(value))
            };
            Box::new(TokenExchangeStrategy::new(Arc::new(source)))
        }
        "callback" => {
            let source = CallbackCodeSource::new();
            provider_config.redirect_uri = source.redirect_uri();

            // Send the browser off first; the code comes back to the listener
            let authorize_url = provider_config.authorize_url()?;
            println!("🌐 Opening browser for {} authorization...", provider.display_name());
            println!("If it doesn't open, visit:\n{}\n", authorize_url);
            if let Err(e) = open::that(&authorize_url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
            println!("⏳ Waiting for authorization on {}...", source.redirect_uri());

            Box::new(TokenExchangeStrategy::new(Arc::new(source)))
        }
        other => {
            anyhow::bail!("Unknown strategy: {} (expected redirect, authorize, token, or callback)", other);
        }
    };

    let coordinator = AuthFlowCoordinator::new(provider_config, backend, store);

    match coordinator.sign_in(strategy.as_ref()).await {
        AuthOutcome::Redirecting => {
            println!("✓ Browser redirected; finish signing in there.");
        }
        AuthOutcome::SignedIn(tokens) => {
            println!("\n✓ Signed in successfully!");
            if let Some(username) = tokens.user.get("username").and_then(|u| u.as_str()) {
                println!("  Welcome, {}", username);
            }
            println!("  Session saved to {:?}", FileTokenStore::new().path());
        }
        AuthOutcome::Cancelled => {
            println!("Sign-in cancelled.");
        }
        AuthOutcome::Failed(message) => {
            println!("❌ {}", message);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_refresh() -> Result<()> {
    let config = config::load()?;
    let store = FileTokenStore::new();

    let Some(mut tokens) = store.load()? else {
        println!("No stored session. Run 'loginflow login' first.");
        return Ok(());
    };

    let backend = BackendClient::new(config.base_url)?;
    tokens.access = backend.refresh(&tokens.refresh).await?;
    store.persist(&tokens)?;

    println!("✓ Access token refreshed");
    Ok(())
}

fn run_status() -> Result<()> {
    let config = config::load()?;
    println!("🔐 Loginflow Status\n");
    println!("Backend: {}", config.base_url);
    println!(
        "GitHub client id: {}",
        if config.github.client_id.is_empty() { "not set" } else { "✓" }
    );
    println!(
        "Google client id: {}",
        if config.google.client_id.is_empty() { "not set" } else { "✓" }
    );

    match FileTokenStore::new().load()? {
        Some(tokens) => {
            let who = tokens
                .user
                .get("username")
                .or_else(|| tokens.user.get("email"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown user");
            println!("Session: ✓ ({})", who);
        }
        None => println!("Session: not signed in"),
    }

    Ok(())
}
