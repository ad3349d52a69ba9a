//! Pagetree server.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pagetree_kernel::config::Config;
use pagetree_kernel::error::AppError;
use pagetree_kernel::models::Actor;
use pagetree_kernel::routes;
use pagetree_kernel::routes::page::load_page;
use pagetree_kernel::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "pagetree", version, about = "Multilingual page tree server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Resolve a URL path and print the page with its breadcrumb.
    Resolve {
        /// Language code, e.g. "en".
        locale: String,

        /// URL path, e.g. "about/team".
        #[arg(default_value = "")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Resolve { locale, path } => resolve(&state, &locale, &path).await,
    }
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    info!(
        default_language = state.default_language(),
        "Starting pagetree server"
    );

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn resolve(state: &AppState, locale: &str, path: &str) -> Result<()> {
    let page = match load_page(state, locale, path, Actor::anonymous()).await {
        Ok(page) => page,
        Err(AppError::NotFound) => {
            println!("no page at /{locale}/{path}");
            return Ok(());
        }
        Err(AppError::BadRequest(msg)) => anyhow::bail!(msg),
        Err(AppError::Internal(e)) => return Err(e),
    };

    let trail: Vec<&str> = page.breadcrumb.iter().map(|e| e.title.as_str()).collect();
    println!("{} [{}]", page.translation.title, page.translation.id);
    if page.locale != locale {
        println!("  served in: {}", page.locale);
    }
    println!("  breadcrumb: {}", trail.join(" > "));
    if !page.remainder.is_empty() {
        println!("  remainder: {}", page.remainder);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
