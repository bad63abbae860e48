use bedrock_genai::api;
use bedrock_genai::aws::BedrockRuntime;
use bedrock_genai::commands::CommandHandler;
use bedrock_genai::config::{AwsConfig, ModelConfig};
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the JSON API server instead of the interactive CLI
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    colored::control::set_override(true);

    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    if args.serve {
        run_api_server(&args).await
    } else {
        run_cli_mode().await
    }
}

async fn run_cli_mode() -> Result<(), AppError> {
    let (runtime, models) = build_runtime()?;
    let mut command_handler = CommandHandler::new(runtime, &models);

    // Show initial help menu
    if let Err(e) = command_handler.handle_command("help").await {
        println!("{}", e.red());
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(args: &Args) -> Result<(), AppError> {
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port)
        .parse()
        .map_err(|e| AppError::Server(format!("Invalid address: {}", e)))?;

    let (runtime, models) = build_runtime()?;
    let app = api::create_api(runtime, &models);

    log::info!("starting API server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    println!("🚀 Server listening on {}", addr.to_string().cyan());

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

fn build_runtime() -> Result<(BedrockRuntime, ModelConfig), AppError> {
    let aws = AwsConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
    let models = ModelConfig::from_env();
    Ok((BedrockRuntime::new(&aws), models))
}
