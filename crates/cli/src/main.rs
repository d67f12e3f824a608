//! Walk-in CLI - operator commands over the queue engine's HTTP API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tabled::{Table, Tabled};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "walkin")]
#[command(about = "Walk-in queue engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// HTTP API base URL
    #[arg(long, env = "WALKIN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon status
    Status,

    /// Print a shop's queue
    List {
        /// Shop ID
        shop: String,
    },

    /// Add a customer to the back of the queue
    Join {
        shop: String,
        name: String,

        /// Customer reference (guests end with '=')
        #[arg(long)]
        customer: Option<String>,

        /// Requested service (repeatable)
        #[arg(short, long = "service")]
        services: Vec<String>,

        /// Ticket code shown to the customer
        #[arg(long)]
        code: Option<String>,

        #[arg(long, default_value = "0")]
        cost: f64,
    },

    /// Swap an entry with the one behind it
    MoveDown { shop: String, entry: String },

    /// Serve the head of the queue
    Next { shop: String },

    /// Remove a customer's entry
    Remove {
        shop: String,

        #[arg(long)]
        customer: String,
    },

    /// Record a finished service
    Complete {
        shop: String,
        customer: String,
        barber: String,

        /// Performed service (repeatable)
        #[arg(short, long = "service", required = true)]
        services: Vec<String>,

        #[arg(long)]
        cost: f64,
    },

    /// Rate the barber of the customer's last service
    Rate {
        shop: String,
        customer: String,
        /// 1-5
        stars: i64,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryView {
    id: String,
    customer_ref: Option<String>,
    name: String,
    position: i64,
    code: Option<String>,
    services: Vec<String>,
    total_cost: f64,
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "#")]
    position: i64,
    name: String,
    customer: String,
    code: String,
    services: String,
    cost: String,
    id: String,
}

impl From<EntryView> for QueueRow {
    fn from(e: EntryView) -> Self {
        Self {
            position: e.position,
            name: e.name,
            customer: e.customer_ref.unwrap_or_else(|| "-".to_string()),
            code: e.code.unwrap_or_else(|| "-".to_string()),
            services: e.services.join(", "),
            cost: format!("{:.2}", e.total_cost),
            id: e.id,
        }
    }
}

struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .context("Failed to connect to daemon")?;
        let status = response.status();
        let body: Value = response.json().await.context("Failed to parse response")?;

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            anyhow::bail!("API error ({}): {}", status.as_u16(), message);
        }
        Ok(body)
    }
}

fn print_removed(body: &Value) {
    match body.get("removed").filter(|r| !r.is_null()) {
        Some(entry) => println!(
            "{}",
            format!(
                "✓ Removed {} (#{})",
                entry["name"].as_str().unwrap_or("?"),
                entry["position"]
            )
                .green()
                .bold()
        ),
        None => println!("{}", "Queue is empty".yellow()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url);

    match cli.command {
        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match api.send(api.request(Method::GET, "/health")).await {
                Ok(health) => {
                    println!("  {} {}", "API URL:".bold(), cli.api_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Version:".bold(), health["version"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::List { shop } => {
            let body = api
                .send(api.request(Method::GET, "/queue").query(&[("shopId", &shop)]))
                .await?;
            let entries: Vec<EntryView> =
                serde_json::from_value(body["data"].clone()).context("Unexpected queue shape")?;

            if entries.is_empty() {
                println!("{}", format!("Queue for {} is empty", shop).yellow());
                return Ok(());
            }

            println!(
                "{}",
                format!("Queue for {} ({} waiting)", shop, entries.len())
                    .cyan()
                    .bold()
            );
            let rows: Vec<QueueRow> = entries.into_iter().map(Into::into).collect();
            println!("{}", Table::new(rows));
        }

        Commands::Join {
            shop,
            name,
            customer,
            services,
            code,
            cost,
        } => {
            let body = json!({
                "shopId": shop,
                "name": name,
                "customerRef": customer,
                "services": services,
                "code": code,
                "totalCost": cost,
            });
            let entry = api
                .send(api.request(Method::POST, "/queue").json(&body))
                .await?;
            let entry: EntryView = serde_json::from_value(entry)?;

            println!("{}", "✓ Joined the queue".green().bold());
            println!();
            println!("{}", Table::new(vec![QueueRow::from(entry)]));
        }

        Commands::MoveDown { shop, entry } => {
            api.send(
                api.request(Method::PATCH, "/queue/move")
                    .json(&json!({ "shopId": shop, "id": entry })),
            )
            .await?;
            println!("{}", format!("✓ Moved {} down", entry).green().bold());
        }

        Commands::Next { shop } => {
            let body = api
                .send(api.request(Method::DELETE, "/queue").query(&[("shopId", &shop)]))
                .await?;
            print_removed(&body);
        }

        Commands::Remove { shop, customer } => {
            let body = api
                .send(
                    api.request(Method::DELETE, "/queue")
                        .query(&[("shopId", &shop), ("uid", &customer)]),
                )
                .await?;
            print_removed(&body);
        }

        Commands::Complete {
            shop,
            customer,
            barber,
            services,
            cost,
        } => {
            let body = json!({
                "shopId": shop,
                "customerRef": customer,
                "barberId": barber,
                "service": services,
                "cost": cost,
            });
            let summary = api
                .send(api.request(Method::POST, "/barber/add-history").json(&body))
                .await?;

            println!("{}", "✓ Service recorded".green().bold());
            if summary["removedEntry"].is_null() {
                println!("  ○ No queue entry matched");
            } else {
                println!("  {} Removed from queue", "✓".green());
            }
            if summary["customerUpdated"].as_bool().unwrap_or(false) {
                println!("  {} Rating requested from customer", "✓".green());
            }
        }

        Commands::Rate {
            shop,
            customer,
            stars,
        } => {
            let body = json!({ "shopId": shop, "customerRef": customer, "rating": stars });
            let outcome = api
                .send(api.request(Method::POST, "/barber/rate").json(&body))
                .await?;

            println!("{}", "✓ Rating submitted".green().bold());
            if let Some(avg) = outcome["averageRating"].as_f64() {
                println!("  {} {:.2}", "Average:".bold(), avg);
            }
        }
    }

    Ok(())
}
