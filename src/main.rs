//! CLI consumer of the routing engine.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use smartroute::{InMemoryRecorder, RouterConfig, SmartRouter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartroute", about = "Route prompts to the cheapest capable model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate a prompt's complexity without executing anything.
    Estimate { prompt: String },
    /// Show the routing decision for a prompt without executing it.
    Route { prompt: String },
    /// Route and execute a prompt.
    Process {
        prompt: String,
        /// Skip routing and execute on this backend.
        #[arg(long)]
        backend: Option<String>,
    },
    /// Show aggregate routing statistics.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = RouterConfig::from_env()?;
    let router = SmartRouter::connect(config, Arc::new(InMemoryRecorder::new())).await;

    match cli.command {
        Command::Estimate { prompt } => {
            let assessment = router.estimate(&prompt);
            println!("{}", assessment.reasoning());
        }
        Command::Route { prompt } => {
            let decision = router.route(&prompt);
            println!("Model: {} ({})", decision.model, decision.tier);
            println!("Complexity: {:.2}", decision.complexity);
            println!("Estimated cost: ${}", decision.estimated_cost);
            println!("Reasoning: {}", decision.reasoning);
        }
        Command::Process { prompt, backend } => {
            let result = match backend {
                Some(name) => router.process_with_override(&prompt, &name).await?,
                None => router.process(&prompt).await?,
            };
            println!("{}", "=".repeat(60));
            println!("Model: {} ({})", result.model, result.tier);
            if let Some(routing) = &result.routing {
                println!("Complexity: {:.2}", routing.complexity);
                println!("Reasoning: {}", routing.reasoning);
            }
            println!("Cost: ${}", result.cost);
            println!("Latency: {:?}", result.latency);
            println!("{}", "=".repeat(60));
            println!("{}", result.response);
        }
        Command::Stats => {
            let stats = router.stats().await;
            println!("Total requests: {}", stats.total_requests);
            println!(
                "Local: {} | Ternary: {} | Cloud: {}",
                stats.local_requests, stats.ternary_requests, stats.cloud_requests
            );
            println!("Served free: {:.1}%", stats.local_percentage);
            println!("Total cost: ${}", stats.total_cost);
        }
    }

    Ok(())
}
