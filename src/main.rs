use anyhow::{Context, Result};
use postvote::{
    api::routes::build_app,
    auth::jwt::{SigningSecret, TokenService},
    cli::{output::Output, Cli, Commands},
    db::{migrations, DatabaseProvider},
    utils::toml_config::{ConfigError, LogFormat, PostvoteConfig, ServerConfig},
    AppState,
};
use std::{path::Path, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may live in .env; load it before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::new(!cli.no_color);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config, cli.verbose, &output).await,
        Commands::Config { validate } => show_config(&cli.config, validate, &output),
        Commands::Migrate => migrate(&cli.config, cli.verbose, &output).await,
    }
}

/// Reads the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path, output: &Output) -> Result<PostvoteConfig> {
    match PostvoteConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(path)) => {
            output.note(&format!(
                "{} not found, using default configuration",
                path.display()
            ));
            Ok(PostvoteConfig::default())
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> Result<()> {
    let config = load_config(config_path, output)?;
    init_tracing(&config.server, verbose);

    config.validate().context("Invalid configuration")?;
    let secret = SigningSecret::new(config.jwt_secret()?);
    let token_service = TokenService::new(secret, config.auth.token_lifetime());

    let turso = DatabaseProvider::from_config(&config.database)
        .create_client()
        .await
        .context("Failed to open database")?;

    let bind_address = config.bind_address();
    let state = AppState {
        config: Arc::new(config),
        turso: Arc::new(turso),
        token_service: Arc::new(token_service),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    output.listening(&bind_address);
    tracing::info!(address = %bind_address, "postvote listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

fn show_config(config_path: &Path, validate: bool, output: &Output) -> Result<()> {
    let config = load_config(config_path, output)?;

    output.settings(
        "Configuration",
        &[
            ("file", config_path.display().to_string()),
            ("listen", config.bind_address()),
            ("log level", config.server.log_level.clone()),
            ("database", config.database.url.clone()),
            ("secret env", config.auth.jwt_secret_env.clone()),
            (
                "token lifetime",
                format!("{} minutes", config.auth.access_token_expire_minutes),
            ),
            ("cors origins", config.cors.allowed_origins.join(", ")),
        ],
    );

    if validate {
        match config.validate() {
            Ok(()) => output.ok("Configuration is valid"),
            Err(e) => {
                output.fail(&e.to_string());
                std::process::exit(1);
            }
        }
    } else {
        output.note("Run with --validate to check the signing secret and settings");
    }

    Ok(())
}

async fn migrate(config_path: &Path, verbose: bool, output: &Output) -> Result<()> {
    let config = load_config(config_path, output)?;
    init_tracing(&config.server, verbose);

    // Opening a client applies anything pending
    let turso = DatabaseProvider::from_config(&config.database)
        .create_client()
        .await
        .context("Failed to open database")?;

    let conn = turso.connection()?;
    let applied = migrations::applied_versions(&conn).await?;
    let latest = applied.iter().max().copied().unwrap_or(0);

    output.ok(&format!(
        "Database at schema version {} ({} migrations applied)",
        latest,
        applied.len()
    ));

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
