use anyhow::Result;
use clap::{Parser, Subcommand};
use deskmind::FrameDecoder;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "deskctl")]
#[command(about = "CLI for the Deskmind desktop agent")]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8765")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a command and print the final reply.
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Send a command and print progress events as they arrive.
    Stream {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print reminders and other notifications from the daemon until interrupted.
    Watch,
    Status,
    Tasks {
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(long)]
        stats: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base_url = cli.addr;

    match cli.command {
        Commands::Ask { text } => {
            let body = serde_json::json!({
                "message": text.join(" "),
                "stream": false,
            });
            let resp: Value = client
                .post(format!("{}/api/chat", base_url))
                .json(&body)
                .send()
                .await?
                .json()
                .await?;
            print_response(&resp);
        }
        Commands::Stream { text } => {
            let body = serde_json::json!({
                "message": text.join(" "),
                "stream": true,
            });
            let resp = client
                .post(format!("{}/api/chat", base_url))
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
            read_events(resp).await?;
        }
        Commands::Watch => {
            let resp = client
                .get(format!("{}/api/events", base_url))
                .send()
                .await?
                .error_for_status()?;
            read_events(resp).await?;
        }
        Commands::Status => {
            let resp: Value = client
                .get(format!("{}/api/status", base_url))
                .send()
                .await?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Commands::Tasks { limit, stats } => {
            let url = if stats {
                format!("{}/api/tasks/stats", base_url)
            } else {
                format!("{}/api/tasks?limit={}", base_url, limit)
            };
            let resp: Value = client.get(url).send().await?.json().await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}

async fn read_events(mut resp: reqwest::Response) -> Result<()> {
    let mut decoder = FrameDecoder::new();
    while let Some(chunk) = resp.chunk().await? {
        for data in decoder.push(&chunk)? {
            let event: Value = serde_json::from_str(&data)?;
            print_event(&event);
        }
    }
    Ok(())
}

fn print_response(resp: &Value) {
    println!(
        "[{}] {}",
        resp["brain"].as_str().unwrap_or("?"),
        resp["reply"].as_str().unwrap_or("")
    );
    if let Some(actions) = resp["actions"].as_array() {
        for action in actions {
            println!(
                "  {} {}",
                action["tool"].as_str().unwrap_or("?"),
                action["result"].as_str().unwrap_or("")
            );
        }
    }
}

fn print_event(event: &Value) {
    match event["type"].as_str().unwrap_or("") {
        "thinking" => println!("… {}", event["message"].as_str().unwrap_or("")),
        "action_start" => println!(
            "→ [{}/{}] {}",
            event["step"],
            event["total"],
            event["description"].as_str().unwrap_or("")
        ),
        "action" => println!(
            "  [{}/{}] {}",
            event["step"],
            event["total"],
            event["result"].as_str().unwrap_or("")
        ),
        "error" => eprintln!("error: {}", event["message"].as_str().unwrap_or("")),
        "complete" => print_response(event),
        "reminder" => println!("⏰ {}", event["text"].as_str().unwrap_or("")),
        other => println!("{}: {}", other, event),
    }
}
