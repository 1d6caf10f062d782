use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "bff-cli")]
#[command(about = "Operator CLI for the hotel BFF", long_about = None)]
struct Cli {
    #[arg(short, long, env = "BFF_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Sent as x-request-id.
    #[arg(long)]
    request_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show breaker and rate limiter state
    Health,
    /// Search availability for a destination
    Search {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
        #[arg(long, default_value_t = 2)]
        adults: u8,
        #[arg(long, default_value_t = 0)]
        children: u8,
        #[arg(long, default_value_t = 1)]
        rooms: u8,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Quote rates for one or more hotels
    Quote {
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
        #[arg(long, default_value_t = 2)]
        adults: u8,
        #[arg(long, default_value_t = 0)]
        children: u8,
        #[arg(long, default_value_t = 1)]
        rooms: u8,
        #[arg(long)]
        currency: Option<String>,
        /// Hotel ids, repeat or comma-separate
        #[arg(long = "hotel", required = true, value_delimiter = ',')]
        hotels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Search {
            destination,
            check_in,
            check_out,
            adults,
            children,
            rooms,
            currency,
        } => {
            let mut query = vec![
                ("destination", destination),
                ("check_in", check_in),
                ("check_out", check_out),
                ("adults", adults.to_string()),
                ("children", children.to_string()),
                ("rooms", rooms.to_string()),
            ];
            if let Some(currency) = currency {
                query.push(("currency", currency));
            }
            client.get(format!("{}/v1/hotels/search", base)).query(&query)
        }
        Commands::Quote {
            check_in,
            check_out,
            adults,
            children,
            rooms,
            currency,
            hotels,
        } => client.post(format!("{}/v1/hotels/quote", base)).json(&json!({
            "stay": {"check_in": check_in, "check_out": check_out},
            "occupancy": {"rooms": rooms, "adults": adults, "children": children},
            "hotel_ids": hotels,
            "currency": currency,
        })),
    };

    let request = match cli.request_id {
        Some(id) => request.header("x-request-id", id),
        None => request,
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", body);
    } else {
        eprintln!("Error: BFF returned status {}", status);
        eprintln!("{}", body);
        std::process::exit(1);
    }
    Ok(())
}
