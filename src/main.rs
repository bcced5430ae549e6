use anyhow::Result;
use skydeck_core::AppError;
use tokio::io::{AsyncBufReadExt, BufReader};

mod app;
mod command;
mod render;

use app::{App, Flow};
use command::Command;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    skydeck_core::init()?;

    let (config, _validation) = match skydeck_core::Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = AppError::from(e);
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };
    let mut app = App::new(&config)?;

    tracing::info!("Skydeck started");

    println!("Skydeck - Weather Dashboard");
    println!("  Config directory: {}", config.config_dir.display());
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match app.handle(command) {
            Flow::Continue(output) => {
                if !output.is_empty() {
                    println!("{}", output.trim_end());
                }
            }
            Flow::Quit => break,
        }
    }

    // Graceful shutdown
    app.shutdown();

    Ok(())
}
