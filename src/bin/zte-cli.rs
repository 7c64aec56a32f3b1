#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI and HTTP front-end for reading SMS from a ZTE router

use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use zte_sms_client::{Error, Message, RouterConfig, SmsQuery, fetch_messages};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "zte-cli")]
#[command(about = "Read SMS messages from a ZTE LTE router (read-only)")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve messages as JSON on GET /getSMS
    Serve {
        /// Listen address (default: $SERVER_LISTEN_ADDR or 127.0.0.1:8080)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Log in once and list messages
    List {
        /// Page number
        #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=100))]
        page: u32,

        /// Messages per page
        #[arg(long, default_value = "500", value_parser = clap::value_parser!(u32).range(1..=1000))]
        per_page: u32,

        /// Storage area on the device
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(0..=2))]
        mem_store: u32,

        /// Tag filter (10 = all)
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(0..=10))]
        tag: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = RouterConfig::from_env()?;

    match &args.command {
        Command::Serve { listen } => {
            cmd_serve(config, listen.clone()).await?;
        }
        Command::List {
            page,
            per_page,
            mem_store,
            tag,
        } => {
            let query = SmsQuery {
                page: *page,
                per_page: *per_page,
                mem_store: *mem_store,
                tag: *tag,
            };
            cmd_list(config, &args, query).await?;
        }
    }

    Ok(())
}

async fn cmd_list(config: RouterConfig, args: &Args, query: SmsQuery) -> anyhow::Result<()> {
    let messages = fetch_messages(config, query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        print_message_table(&messages);
    }

    Ok(())
}

async fn cmd_serve(config: RouterConfig, listen: Option<String>) -> anyhow::Result<()> {
    let addr = listen
        .or_else(|| std::env::var("SERVER_LISTEN_ADDR").ok())
        .filter(|addr| !addr.is_empty())
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

    let app = Router::new()
        .route("/getSMS", get(get_sms))
        .layer(middleware::from_fn(cors))
        .with_state(Arc::new(config));

    let listener = TcpListener::bind(&addr).await?;
    info!("Server started on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_sms(
    State(config): State<Arc<RouterConfig>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = match SmsQuery::from_params(&params) {
        Ok(query) => query,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match fetch_messages(config.as_ref().clone(), query).await {
        Ok(messages) => Json(messages).into_response(),
        Err(e) => {
            let (status, body) = error_response(&e);
            if e.is_login_phase() {
                warn!("Login error: {e}");
            } else {
                error!("GetSMS error: {e}");
            }
            (status, body).into_response()
        }
    }
}

/// Status code and body reported to HTTP callers for a failed cycle.
const fn error_response(e: &Error) -> (StatusCode, &'static str) {
    if e.is_login_phase() {
        (StatusCode::UNAUTHORIZED, "Authentication failed")
    } else if matches!(e, Error::Fetch(_)) {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to retrieve SMS messages",
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to initialize connector",
        )
    }
}

/// Allow any origin; answer preflight requests directly.
async fn cors(req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        let headers = resp.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, HEAD"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Accept, Content-Type, X-Requested-With"),
        );
        resp
    } else {
        next.run(req).await
    };

    resp.headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    resp
}

fn print_message_table(messages: &[Message]) {
    if messages.is_empty() {
        println!("No messages found.");
        return;
    }

    let header = format!(
        "{:<8} {:<20} {:<18} {:<6} {}",
        "ID", "Date", "From", "Read", "Content"
    );
    println!("{header}");
    println!("{}", "-".repeat(100));

    for msg in messages {
        println!(
            "{:<8} {:<20} {:<18} {:<6} {}",
            msg.id,
            msg.timestamp.format("%Y-%m-%d %H:%M"),
            truncate(&msg.sender, 16),
            if msg.read { "yes" } else { "no" },
            truncate(&msg.body.replace('\n', " "), 50),
        );
    }

    println!("\n{} message(s)", messages.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
