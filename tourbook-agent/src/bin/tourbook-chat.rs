use anyhow::{bail, Context};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tourbook_agent::{AgentSettings, TourAgent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_ID: &str = "default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourbook_agent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = AgentSettings::load().context("loading agent settings")?;
    if !settings.is_ready() {
        bail!("agent is disabled or has no API key; set OPENAI_API_KEY or TOURBOOK__AGENT__API_KEY");
    }

    println!("Tour booking assistant");
    println!("Backend: {}", settings.backend_url);
    println!("Model:   {}", settings.model);
    let agent = TourAgent::from_settings(&settings).context("building the agent")?;
    println!("Type 'exit' or 'quit' to leave, 'clear' to forget the conversation.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "clear" => {
                match agent.clear_session(SESSION_ID).await {
                    Ok(()) => println!("Conversation cleared.\n"),
                    Err(e) => eprintln!("Could not clear the conversation: {}\n", e),
                }
                continue;
            }
            _ => {}
        }

        let reply = agent.process(input, SESSION_ID).await;
        println!("\nAssistant: {}\n", reply.output);
    }

    println!("Goodbye!");
    Ok(())
}
