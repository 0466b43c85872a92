use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use gitodo::api::auth::Sessions;
use gitodo::api::{self, AppState};
use gitodo::git::GitStore;
use gitodo::{TodoStore, config, telemetry};

#[derive(Parser)]
#[command(name = "gitodo", about = "Todo list served from a git-tracked Markdown file")]
struct Args {
    /// Serving port (overrides GITODO_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Local working-copy directory (overrides GITODO_REPO_DIR).
    #[arg(long)]
    repo_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    telemetry::init(args.verbose);

    let mut config = config::load();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(repo_dir) = args.repo_dir {
        config.repo_dir = repo_dir;
    }

    if let Err(err) = run(config).await {
        tracing::error!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(config: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(remote_url) = config.remote_url.clone() else {
        return Err("GITODO_REMOTE_URL is not set".into());
    };

    let git = GitStore::new(
        config.repo_dir.clone(),
        remote_url,
        config.token.clone(),
        config.branch.clone(),
    );

    // First-time setup is the one remote failure that is fatal.
    let setup = git.clone();
    tokio::task::spawn_blocking(move || setup.ensure_ready()).await??;

    let state = AppState {
        store: Arc::new(TodoStore::new(git)),
        sessions: Arc::new(Sessions::new(
            config.session_secret,
            config.auth_user,
            config.auth_pass,
        )),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, api::app(state)).await?;
    Ok(())
}
