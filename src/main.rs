use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
#[command(name = "eftt")]
#[command(about = "Encrypted file transfer tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a file to a server
    Send {
        /// Server hostname or IP address
        host: String,
        /// Server port
        port: u16,
        /// Path to the file to send
        #[arg(default_value = eftt::DEFAULT_FILE)]
        file_path: String,
    },
    /// Run the receiving server
    Serve {
        /// Port to bind to (default: 8080)
        #[arg(default_value_t = eftt::DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Configure logging based on verbose flag
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
        log::info!("Verbose logging enabled");
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    match cli.command {
        Commands::Send {
            host,
            port,
            file_path,
        } => {
            eftt::commands::send::run(&host, port, &file_path).await?;
        }
        Commands::Serve { port } => {
            eftt::commands::serve::run(port).await?;
        }
    }

    Ok(())
}
