use clap::Parser;
use log::{error, info};
use server::api::{ApiContext, ApiRouter};
use server::config::{self, Args};
use server::http::{self, AppState};
use server::logging;
use server::static_files::StaticFiles;
use server::ticker::Ticker;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Main-method of the application.
/// Parses command-line arguments, loads the game and serves it until a shutdown signal arrives.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => {
            logging::server_exited(0);
            Ok(())
        }
        Err(e) => {
            logging::server_failed(1, &e.to_string());
            Err(e)
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = config::load_game(&args.config_file)?;
    game.set_randomize_spawn_points(args.randomize_spawn_points);

    let maps = game.maps().clone();
    let game = server::shared(game);
    let tick_period = args.tick_period();

    let files = StaticFiles::new(&args.www_root)?;
    let router = ApiRouter::new(ApiContext::new(maps, game.clone(), tick_period.is_some()));

    // Ticker and server stop together on the first shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ticker = tick_period.map(|period| Ticker::new(game.clone(), period).spawn(shutdown_rx));

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    let address = listener.local_addr()?;
    logging::server_started(&address.ip().to_string(), address.port());

    http::serve(listener, AppState::new(router, files), async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    })
    .await?;

    if let Some(handle) = ticker {
        handle.await?;
    }
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received shutdown signal, shutting down gracefully...");
}
