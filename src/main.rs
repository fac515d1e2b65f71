use std::io::Write;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_wall::client::FeedbackClient;
use feedback_wall::config::WallConfig;
use feedback_wall::render;
use feedback_wall::wall::{FeedbackWall, SubmitError, WallEvent, SUBMIT_FAILURE_NOTICE};

#[derive(Parser)]
#[command(name = "feedback-wall")]
#[command(about = "Read and post messages on the User Feedback Wall")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides FEEDBACK_WALL_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the wall
    List,
    /// Post a new message
    Post {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        message: String,
    },
    /// Browse the wall and post from a prompt
    Interactive,
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration
    Show,
    /// Store a backend base URL in the config file
    SetUrl { url: String },
}

/// Logs go to stderr; stdout carries the rendered wall.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "feedback_wall=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = WallConfig::resolve(cli.url);
    let wall = FeedbackWall::new(FeedbackClient::from_config(&config));

    match cli.command {
        Some(Commands::List) | None => {
            wall.load().await.ok();
            let state = wall.snapshot();
            tracing::debug!(view = state.presentation().as_str(), "rendering wall");
            print!("{}", render::render_header());
            print!("{}", render::render_wall(&state, Utc::now()));
            if state.error().is_some() {
                std::process::exit(1);
            }
        }
        Some(Commands::Post { name, message }) => {
            wall.set_name(name);
            wall.set_message(message);
            match wall.submit().await {
                Ok(entry) => {
                    println!("{}", render::submit_label(&wall.snapshot()));
                    print!("{}", render::render_entry(&entry, Utc::now()));
                }
                Err(SubmitError::Validation(errors)) => {
                    eprint!("{}", render::render_field_errors(&errors));
                    std::process::exit(2);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "post failed");
                    eprintln!("{}", SUBMIT_FAILURE_NOTICE);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Interactive) => run_interactive(wall).await?,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                println!("api_url = {}", config.api_url);
                println!("endpoint = {}", config.feedback_url());
            }
            ConfigAction::SetUrl { url } => {
                let mut stored = WallConfig::load();
                stored.api_url = url;
                let path = stored.save()?;
                println!("Saved {}", path.display());
            }
        },
    }

    Ok(())
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

/// Read one line, keeping `current` when the user just presses enter.
async fn read_field(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
    current: &str,
) -> anyhow::Result<Option<String>> {
    if current.is_empty() {
        prompt(&format!("{}: ", label))?;
    } else {
        prompt(&format!("{} [{}]: ", label, current))?;
    }
    Ok(lines.next_line().await?.map(|line| {
        if line.is_empty() {
            current.to_string()
        } else {
            line
        }
    }))
}

async fn run_interactive(wall: FeedbackWall) -> anyhow::Result<()> {
    let mut events = wall.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let WallEvent::EntryInserted { entry } = event {
                println!("+ {} joined the wall", entry.name);
            }
        }
    });

    print!("{}", render::render_header());
    wall.load().await.ok();
    print!("{}", render::render_wall(&wall.snapshot(), Utc::now()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let state = wall.snapshot();
        prompt(&format!(
            "\n[n] {}  [r] reload  [q] quit > ",
            render::submit_label(&state)
        ))?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "q" => break,
            "r" => {
                wall.retry().await.ok();
                print!("{}", render::render_wall(&wall.snapshot(), Utc::now()));
            }
            "n" => {
                let draft = wall.snapshot().draft().clone();
                let Some(name) = read_field(&mut lines, "Name", &draft.name).await? else {
                    break;
                };
                let Some(message) = read_field(&mut lines, "Message", &draft.message).await?
                else {
                    break;
                };
                wall.set_name(name);
                wall.set_message(message);

                match wall.submit().await {
                    Ok(_) => {
                        println!("{}", render::submit_label(&wall.snapshot()));
                        print!("{}", render::render_wall(&wall.snapshot(), Utc::now()));
                    }
                    Err(SubmitError::Validation(errors)) => {
                        print!("{}", render::render_field_errors(&errors));
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "post failed");
                        println!("{}", SUBMIT_FAILURE_NOTICE);
                    }
                }
            }
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    Ok(())
}
