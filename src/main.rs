use property_portal::{
    AppState, RouteTable, ViewRegistry,
    config::{AppConfig, Env, SessionVerifier},
    create_router,
    session::{AuthClientState, JwtAuthClient, SupabaseAuthClient},
};
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the route table, view
/// registry and auth client, then serves the portal.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "property_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal starting in {:?} mode", config.env);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "portal stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let routes = Arc::new(RouteTable::portal()?);
    let views = Arc::new(ViewRegistry::portal());

    let missing = views.missing_for(&routes);
    if !missing.is_empty() {
        return Err(format!("views without a factory: {missing:?}").into());
    }

    let auth: AuthClientState = match config.session_verifier {
        SessionVerifier::Remote => Arc::new(SupabaseAuthClient::new(
            &config.supabase_url,
            &config.supabase_key,
            config.auth_timeout,
        )?),
        SessionVerifier::Jwt => Arc::new(JwtAuthClient::new(&config.jwt_secret)),
    };

    tracing::info!(
        routes = routes.records().len(),
        verifier = ?config.session_verifier,
        "navigation table loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        routes,
        views,
        auth,
        config,
    });

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API documentation available at /swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
