use clap::{Parser, Subcommand};
use eyre::Context;
use std::io::IsTerminal;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vmix_api::Vmix;

/// Drive a vMix instance from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address of the vMix web API
    #[arg(
        long,
        env = "VMIX_SERVER",
        default_value = "http://127.0.0.1:8088",
        value_name = "URL"
    )]
    server: String,

    /// Give up on a request after this many seconds
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full state document as JSON
    Info,
    /// Print all inputs and their text fields as JSON
    Inputs,
    /// Set a text field, by index or by name
    SetText {
        input: String,
        field: String,
        value: String,
    },
    /// Start the countdown of an input
    Start { input: String },
    /// Stop the countdown of an input
    Stop { input: String },
    /// Pause the countdown of an input
    Pause { input: String },
    /// Set the countdown duration of an input
    SetCountdown {
        input: String,
        #[arg(value_name = "HH:MM:SS")]
        value: String,
    },
    /// Add (or, if negative, subtract) seconds to the countdown of an input
    AdjustCountdown {
        input: String,
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("build HTTP client")?;
    let vmix = Vmix::with_client(&args.server, http)
        .with_context(|| format!("connect to vMix at {}", args.server))?;

    match args.command {
        Command::Info => {
            let info = vmix.info().await.context("fetch vMix state")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Inputs => {
            let inputs = vmix.inputs().await.context("list inputs")?;
            println!("{}", serde_json::to_string_pretty(&inputs)?);
        }
        Command::SetText {
            input,
            field,
            value,
        } => {
            vmix.set_text(&input, field.as_str(), &value)
                .await
                .with_context(|| format!("set text field {field} on {input}"))?;
        }
        Command::Start { input } => {
            vmix.start_countdown(&input)
                .await
                .with_context(|| format!("start countdown on {input}"))?;
        }
        Command::Stop { input } => {
            vmix.stop_countdown(&input)
                .await
                .with_context(|| format!("stop countdown on {input}"))?;
        }
        Command::Pause { input } => {
            vmix.pause_countdown(&input)
                .await
                .with_context(|| format!("pause countdown on {input}"))?;
        }
        Command::SetCountdown { input, value } => {
            vmix.set_countdown(&input, &value)
                .await
                .with_context(|| format!("set countdown on {input}"))?;
        }
        Command::AdjustCountdown { input, seconds } => {
            vmix.adjust_countdown(&input, seconds)
                .await
                .with_context(|| format!("adjust countdown on {input}"))?;
        }
    }

    Ok(())
}
