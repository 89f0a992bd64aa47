//! terrain-api entry point.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use terrain_api::cli::{self, HeightArgs, IntersectionArgs};
use terrain_api::config::CommonOpts;
use terrain_api::server;
use terrain_api::state::AppState;

/// Terrain elevation and raycast intersection service.
#[derive(Parser, Debug)]
#[command(name = "terrain-api")]
#[command(about = "Height lookup and raycast terrain intersection over tiled DEMs")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get terrain elevation at a location
    Height(HeightArgs),

    /// Find the terrain intersection of a camera ray
    Intersection(IntersectionArgs),

    /// Start the HTTP API server
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(short = 'a', long, default_value = "0.0.0.0:8080", env = "ADDR")]
    addr: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.common.log_level));
    fmt().with_env_filter(filter).init();

    let state = match AppState::from_opts(&args.common) {
        Ok(state) => std::sync::Arc::new(state),
        Err(err) => {
            eprintln!("{}: {}", err.kind(), err);
            std::process::exit(1);
        }
    };

    let zoom = args.common.zoom;

    let outcome = match &args.command {
        Command::Height(height) => cli::run_height(&state, height, zoom)
            .await
            .map_err(|e| format!("{}: {}", e.kind(), e)),
        Command::Intersection(intersection) => cli::run_intersection(&state, intersection, zoom)
            .await
            .map_err(|e| format!("{}: {}", e.kind(), e)),
        Command::Serve(serve) => server::serve(state.clone(), &serve.addr)
            .await
            .map_err(|e| format!("serve: {e:#}")),
    };

    if let Err(message) = outcome {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
