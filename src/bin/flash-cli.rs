use clap::{Parser, Subcommand};
use reqwest::header::SET_COOKIE;
use reqwest::redirect::Policy;

use flash_embed::flash::store::token_header;
use flash_embed::flash::{codec, TokenOptions};
use flash_embed::Message;

#[derive(Parser)]
#[command(name = "flash-cli")]
#[command(about = "Inspect and produce flash message cookies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Set-Cookie header carrying one message
    Encode {
        #[arg(short, long, default_value = "info")]
        category: String,
        #[arg(short, long)]
        text: String,
    },
    /// Decode a flash cookie value
    Decode { value: String },
    /// Submit messages to a running demo server and print the cookies it sets
    Push {
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
        #[arg(short, long, default_value = "info")]
        category: String,
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { category, text } => {
            let header = token_header(&Message::new(category, text), &TokenOptions::default())?;
            println!("{}", header.to_str()?);
        }
        Commands::Decode { value } => {
            let value = value.split_once('=').map_or(value.as_str(), |(name, v)| {
                if codec::is_flash_cookie(name) {
                    v
                } else {
                    value.as_str()
                }
            });
            let message = codec::decode(value)?;
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
        Commands::Push {
            url,
            category,
            text,
        } => {
            let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
            let res = client
                .post(format!("{}/", url.trim_end_matches('/')))
                .form(&[("category", category.as_str()), ("text", text.as_str())])
                .send()
                .await?;

            let status = res.status();
            if !status.is_redirection() {
                eprintln!("Error: server returned status {}", status);
                return Ok(());
            }
            for cookie in res.headers().get_all(SET_COOKIE) {
                println!("{}", cookie.to_str()?);
            }
        }
    }

    Ok(())
}
