use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(about = "Command-line client for the GM dashboard daemon", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard
    Status,
    /// Connect the configured wallet
    Connect,
    /// Drop the wallet session
    Disconnect,
    /// Send a greeting and wait for confirmation
    Send,
    /// Reload total and recent greetings now
    Refresh,
    /// Show the send cooldown of an address
    Cooldown {
        /// Wallet address (0x-prefixed)
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/api/status", base)).send().await?,
        Commands::Connect => client.post(format!("{}/api/connect", base)).send().await?,
        Commands::Disconnect => client.post(format!("{}/api/disconnect", base)).send().await?,
        Commands::Send => client.post(format!("{}/api/send", base)).send().await?,
        Commands::Refresh => client.post(format!("{}/api/refresh", base)).send().await?,
        Commands::Cooldown { address } => {
            client
                .get(format!("{}/api/cooldown/{}", base, address))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: dashboard returned status {}", status);
        match res.json::<Value>().await {
            Ok(body) => eprintln!("{}", serde_json::to_string_pretty(&body)?),
            Err(e) => eprintln!("Unreadable error body: {}", e),
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
