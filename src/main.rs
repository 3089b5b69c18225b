//! SuperMaya CLI
//!
//! Terminal client for the SuperMaya assistant:
//! - Log in / register
//! - Ask text and image questions
//! - Rate answers and browse history
//! - Interactive chat

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use supermaya::api::{Attachment, ChatBackend, InteractionId};
use supermaya::auth::{AuthMode, Credentials};
use supermaya::chat::{self, ChatState, FeedbackOutcome, Vote};
use supermaya::config::{generate_default_config, Config};
use supermaya::terminal::{error_hint, render, repl, App};

#[derive(Parser)]
#[command(name = "supermaya")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for the SuperMaya AI assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and SUPERMAYA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: <config_dir>/supermaya/config.toml, then ./supermaya.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        #[arg(short, long)]
        email: Option<String>,
        /// Read from SUPERMAYA_PASSWORD or prompted when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show session and profile
    Status,

    /// Ask a question
    Ask {
        /// The question
        query: Vec<String>,
    },

    /// Ask about an image
    Image {
        /// Path to the image
        path: PathBuf,
        /// Question about the image
        query: Vec<String>,
    },

    /// Rate an answer by interaction id
    Feedback {
        id: String,
        #[arg(value_enum)]
        rating: Rating,
    },

    /// Show earlier exchanges
    History {
        /// Page number, starting at 0
        #[arg(long, default_value = "0")]
        page: u32,
    },

    /// Replace your system prompt
    Prompt {
        /// New prompt text
        text: Vec<String>,
    },

    /// Interactive chat
    Chat,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Rating {
    Good,
    Bad,
}

impl From<Rating> for Vote {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Good => Vote::Good,
            Rating::Bad => Vote::Bad,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    supermaya::logging::init(&config.logging);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = error_hint(&e) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    if let Commands::Config { output } = &command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut app = App::from_config(config);
    let mut stdout = std::io::stdout();

    match command {
        Commands::Login { email, password } => {
            let credentials = read_credentials(email, password)?;
            app.authenticate(AuthMode::Login, &credentials).await?;
            println!("Logged in as {}", credentials.email);
        }

        Commands::Register { email, password } => {
            let credentials = read_credentials(email, password)?;
            app.authenticate(AuthMode::Register, &credentials).await?;
            println!("Registered and logged in as {}", credentials.email);
        }

        Commands::Logout => {
            app.logout()?;
            println!("Logged out");
        }

        Commands::Status => {
            println!("Backend: {}", app.config.api.base_url);
            if app.require_chat().is_err() {
                println!("Session: logged out");
                return Ok(());
            }
            let profile = app.backend.profile().await?;
            println!("Session: logged in as {}", profile.email);
            println!("Active:  {}", profile.is_active);
            println!("System prompt:\n{}", profile.system_prompt);
        }

        Commands::Ask { query } => {
            app.require_chat()?;
            let mut chat = ChatState::new();
            chat.set_input(query.join(" "));
            ask(&app, &mut chat).await?;
        }

        Commands::Image { path, query } => {
            app.require_chat()?;
            let attachment = Attachment::from_path(&path).await?;
            let mut chat = ChatState::new();
            chat.attach(attachment);
            chat.set_input(query.join(" "));
            ask(&app, &mut chat).await?;
        }

        Commands::Feedback { id, rating } => {
            app.require_chat()?;
            let id = InteractionId::new(id);
            match chat::submit_feedback(&app.backend, Some(&id), rating.into()).await {
                FeedbackOutcome::Submitted => println!("{}", chat::FEEDBACK_SUBMITTED),
                _ => bail!(chat::FEEDBACK_FAILED),
            }
        }

        Commands::History { page } => {
            app.require_chat()?;
            let records = app.backend.history(app.config.history.page(page)).await?;
            if records.is_empty() {
                println!("No history on page {}", page);
            }
            let mut chat = ChatState::new();
            chat.replay_history(&records)?;
            for message in chat.messages() {
                write!(stdout, "{}", render::render_message(message))?;
            }
        }

        Commands::Prompt { text } => {
            app.require_chat()?;
            let prompt = text.join(" ");
            if prompt.trim().is_empty() {
                bail!("The prompt cannot be empty.");
            }
            let profile = app.backend.update_system_prompt(&prompt).await?;
            println!("System prompt updated:\n{}", profile.system_prompt);
        }

        Commands::Chat => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&mut app, stdin, &mut stdout).await?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Send the prepared question and print the answer
async fn ask<B: ChatBackend>(app: &App<B>, chat: &mut ChatState) -> Result<()> {
    if chat.send(&app.backend, None).await.is_err() {
        bail!("Nothing to ask. Give a question or an image.");
    }
    if let Some(reply) = chat.messages().last() {
        print!("{}", render::render_message(reply));
        if reply.text.as_deref() == Some(chat::SEND_FAILED_MESSAGE) {
            bail!("The request failed. Run with RUST_LOG=supermaya=debug for details.");
        }
    }
    Ok(())
}

fn read_credentials(email: Option<String>, password: Option<String>) -> Result<Credentials> {
    let email = match email {
        Some(email) => email,
        None => read_line("Email: ")?,
    };
    let password = match password.or_else(|| std::env::var("SUPERMAYA_PASSWORD").ok()) {
        Some(password) => password,
        None => read_line("Password: ")?,
    };
    Ok(Credentials::new(email.trim(), password))
}

fn read_line(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
