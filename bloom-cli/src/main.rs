//! bloom - headless shell for the Bloom feed client
//!
//! Runs the same coordination core a browser page would, against the real
//! backend, and prints what the visible units render.

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libbloom::api::http::HttpBackend;
use libbloom::error::ApiError;
use libbloom::logging::LoggingConfig;
use libbloom::service::session::FileSessionStorage;
use libbloom::service::validation::{validate_credentials, validate_signup, ContentValidator};
use libbloom::types::ErrorNotice;
use libbloom::{App, BloomError, Config, Document, DomEvent, MemoryHistory, UnitKind};

#[derive(Parser, Debug)]
#[command(name = "bloom")]
#[command(version, about = "Read and write blooms from the terminal")]
#[command(long_about = r#"Read and write blooms from the terminal.

EXAMPLES:
    # Log in (prompts for the password)
    bloom login sample

    # Post a bloom
    bloom post "Hello #forest"

    # Read your home timeline
    bloom feed
    bloom feed --format json | jq '.feed[] | .content'

    # Browse
    bloom profile alice
    bloom hashtag rust
    bloom show 42

EXIT CODES:
    0 - Success
    1 - Backend or configuration error
    2 - Authentication error (not logged in, or session expired)
    3 - Invalid input
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the session
    Login {
        username: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "BLOOM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and log in
    Signup {
        username: String,

        /// Password (prompted twice when omitted)
        #[arg(long, env = "BLOOM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Post a bloom
    Post {
        /// Content of the bloom
        content: String,
    },

    /// Show the home timeline
    Feed,

    /// Show a user's profile and recent blooms
    Profile { username: String },

    /// Follow a user
    Follow { username: String },

    /// Show blooms mentioning a hashtag
    Hashtag { tag: String },

    /// Show a single bloom
    Show { id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e.downcast_ref::<BloomError>().map_or(1, BloomError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    // Checks that need no session run before anything touches the network
    match &cli.command {
        Commands::Post { content } => {
            ContentValidator::new(config.composer.max_chars)
                .validate(content)
                .map_err(BloomError::from)?;
        }
        Commands::Login {
            username,
            password: Some(password),
        } => validate_credentials(username, password).map_err(BloomError::from)?,
        _ => {}
    }

    tracing::debug!(base_url = %config.api.base_url, "using backend");
    let backend = HttpBackend::from_config(&config.api).map_err(BloomError::from)?;
    let storage = FileSessionStorage::new(config.storage.expanded_path());
    let document = Rc::new(Document::standard());
    let app = App::new(
        config,
        Rc::new(backend),
        Rc::new(storage),
        document.clone(),
        Rc::new(MemoryHistory::default()),
    );
    app.attach_all().map_err(BloomError::from)?;
    app.start().await;

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")
                    .context("Failed to read password")?,
            };
            validate_credentials(&username, &password).map_err(BloomError::from)?;

            app.navigate("/login");
            app.trigger_kind(
                UnitKind::Login,
                "login",
                DomEvent::submit([("username", username.as_str()), ("password", password.as_str())]),
            )
            .map_err(BloomError::from)?;
            app.settle().await;
            check(&app)?;
            if !app.store().get().is_logged_in() {
                return Err(BloomError::Api(ApiError::Authentication(
                    "Login was not accepted".to_string(),
                ))
                .into());
            }
            println!("Logged in as @{}", username);
            Ok(())
        }
        Commands::Signup { username, password } => {
            let (password, confirmation) = match password {
                Some(password) => (password.clone(), password),
                None => (
                    rpassword::prompt_password("Password: ").context("Failed to read password")?,
                    rpassword::prompt_password("Confirm password: ")
                        .context("Failed to read password")?,
                ),
            };
            validate_signup(&username, &password, Some(&confirmation)).map_err(BloomError::from)?;

            app.navigate("/signup");
            app.trigger_kind(
                UnitKind::Signup,
                "signup",
                DomEvent::submit([
                    ("username", username.as_str()),
                    ("password", password.as_str()),
                    ("confirm_password", confirmation.as_str()),
                ]),
            )
            .map_err(BloomError::from)?;
            app.settle().await;
            check(&app)?;
            println!("Welcome to the forest, @{}", username);
            Ok(())
        }
        Commands::Logout => {
            if app.store().get().is_logged_in() {
                app.trigger_kind(UnitKind::Logout, "logout", DomEvent::click())
                    .map_err(BloomError::from)?;
                app.settle().await;
            }
            println!("Logged out");
            Ok(())
        }
        Commands::Post { content } => {
            require_login(&app)?;
            app.trigger_kind(
                UnitKind::Composer,
                "compose",
                DomEvent::submit([("content", content.as_str())]),
            )
            .map_err(BloomError::from)?;
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
        Commands::Feed => {
            require_login(&app)?;
            app.navigate("/");
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
        Commands::Profile { username } => {
            app.navigate(&format!("/profile/{}", username));
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
        Commands::Follow { username } => {
            require_login(&app)?;
            app.navigate(&format!("/profile/{}", username));
            app.settle().await;
            check(&app)?;
            app.trigger_kind(UnitKind::Profile, "follow", DomEvent::click_on(username.as_str()))
                .map_err(BloomError::from)?;
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
        Commands::Hashtag { tag } => {
            app.navigate(&format!("/hashtag/{}", tag.trim_start_matches('#')));
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
        Commands::Show { id } => {
            app.navigate(&format!("/bloom/{}", id));
            app.settle().await;
            check(&app)?;
            print_page(&app, &document, &cli.format)
        }
    }
}

fn require_login(app: &App) -> Result<()> {
    if app.store().get().is_logged_in() {
        return Ok(());
    }
    Err(BloomError::Api(ApiError::Authentication(
        "Not logged in, run `bloom login` first".to_string(),
    ))
    .into())
}

/// Fail with whatever the error surface is showing
fn check(app: &App) -> Result<()> {
    match &app.store().get().error {
        Some(notice) => Err(BloomError::Api(api_error(notice)).into()),
        None => Ok(()),
    }
}

fn api_error(notice: &ErrorNotice) -> ApiError {
    match notice.status {
        Some(401) => ApiError::Authentication(notice.detail.clone()),
        Some(status) => ApiError::Server {
            status,
            detail: notice.detail.clone(),
        },
        None => ApiError::Network(notice.detail.clone()),
    }
}

fn print_page(app: &App, document: &Document, format: &str) -> Result<()> {
    if format == "json" {
        let state = app.store().get();
        println!(
            "{}",
            serde_json::to_string_pretty(&*state).context("Failed to serialize state")?
        );
    } else {
        println!("{}", document.text());
    }
    Ok(())
}
