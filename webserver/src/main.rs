//! WebServer entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use generator::{GeneratorConfig, LimitedModelClient, RealModelClient};
use shared::logging::{self, ServiceId};
use shared::service_info;
use webserver::{build_router, AppState, HttpTokenVerifier, InMemoryArtifactStore};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Drill, plan and recommendation API")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: String,

    /// API key for the text-generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Root of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = generator::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Model for the drill stages
    #[arg(long, env = "MODEL")]
    model: Option<String>,

    /// Model for training plans
    #[arg(long, env = "PLAN_MODEL")]
    plan_model: Option<String>,

    /// Identity endpoint used to verify bearer tokens
    #[arg(long, env = "IDENTITY_URL")]
    identity_url: Option<String>,

    /// Let requests without a valid token through as the anonymous user
    #[arg(long, env = "ALLOW_UNAUTHENTICATED", default_value_t = false)]
    allow_unauthenticated: bool,

    /// Seconds an identical request from the same user is refused
    #[arg(long, env = "COOLDOWN_SECS", default_value_t = 10)]
    cooldown_secs: i64,

    /// Per model call timeout in seconds
    #[arg(long, env = "CALL_TIMEOUT_SECS", default_value_t = 60)]
    call_timeout_secs: u64,

    /// Upper bound on simultaneous model calls across all requests
    #[arg(long, env = "MAX_CONCURRENT_CALLS", default_value_t = 8)]
    max_concurrent_calls: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let service = ServiceId::init_webserver();
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(service, &format!("webserver v{}", env!("CARGO_PKG_VERSION")));

    let mut config = GeneratorConfig {
        base_url: args.base_url.clone(),
        call_timeout_secs: args.call_timeout_secs,
        max_concurrent_calls: args.max_concurrent_calls,
        ..Default::default()
    };
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(plan_model) = args.plan_model {
        config.plan_model = plan_model;
    }
    config.validate().context("invalid generator configuration")?;

    let client = RealModelClient::new(args.api_key, &config.base_url).context("failed to build model client")?;
    let client = Arc::new(LimitedModelClient::new(client, config.max_concurrent_calls));
    logging::log_progress(service, "Model client", &format!("{} via {}", config.model, config.base_url));

    let mut state = AppState::new(client, config, Arc::new(InMemoryArtifactStore::new()))
        .with_cooldown(chrono::Duration::seconds(args.cooldown_secs.max(0)))
        .allow_unauthenticated(args.allow_unauthenticated);

    match args.identity_url {
        Some(url) => {
            let verifier = HttpTokenVerifier::new(&url, Duration::from_secs(10)).context("failed to build token verifier")?;
            state = state.with_verifier(Arc::new(verifier));
            logging::log_progress(service, "Auth", &format!("verifying tokens against {url}"));
        }
        None if args.allow_unauthenticated => {
            logging::log_progress(service, "Auth", "no identity endpoint, every caller is anonymous");
        }
        None => {
            logging::log_progress(service, "Auth", "no identity endpoint, every request will be refused");
        }
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    service_info!(service, %addr, "🌐 listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    logging::log_success(service, "WebServer stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(ServiceId::current(), "Received Ctrl+C signal"),
        Err(err) => logging::log_error(ServiceId::current(), "Signal handling", &err),
    }
}
