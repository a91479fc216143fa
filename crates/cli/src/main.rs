use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Book catalog service")]
struct Cli {
    /// Database URL, overriding configuration (e.g. `sqlite://livros.db`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on, overriding configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply migrations and seed data, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load libris settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    libris_telemetry::init(&settings.telemetry)?;
    tracing::info!(env = ?settings.environment, command = ?cli.command, "libris CLI starting");

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            libris_app::bootstrap::serve(settings).await
        }
        Command::Migrate => libris_app::bootstrap::migrate(settings).await,
    }
}
