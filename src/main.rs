use std::io::{self, BufRead, IsTerminal, Read};

use anyhow::{Result, anyhow};
use clap::Parser;
use time::OffsetDateTime;

use wordweave::{Config, ExecutionOutput, WordWeave};

#[derive(Parser, Debug)]
#[command(
    name = "wordweave",
    version,
    about = "Translate text, images, documents and speech with a local LLM"
)]
struct Cli {
    /// Source language name (e.g. English)
    #[arg(short = 'L', long = "source-lang", default_value = "English")]
    source_lang: String,

    /// Target language name (e.g. French)
    #[arg(short = 'l', long = "lang", default_value = "Hindi")]
    lang: String,

    /// Tone of the translation
    #[arg(short = 't', long = "tone", default_value = "Neutral")]
    tone: String,

    /// File to translate (jpg/jpeg/png, pdf/txt, or audio)
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Append an explanation of the translation
    #[arg(long = "explain")]
    explain: bool,

    /// Speak the translation into a temporary wav file
    #[arg(long = "speak")]
    speak: bool,

    /// Print the transcript of --data audio instead of translating it
    #[arg(long = "transcribe")]
    transcribe: bool,

    /// Show supported languages and exit
    #[arg(long = "show-languages")]
    show_languages: bool,

    /// Show supported tones and exit
    #[arg(long = "show-tones")]
    show_tones: bool,

    /// Interactive mode
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Run the HTTP API (address defaults to [server] addr)
    #[arg(long = "server", num_args = 0..=1, default_missing_value = "")]
    server: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            source_lang: self.source_lang.clone(),
            lang: self.lang.clone(),
            tone: self.tone.clone(),
            data: self.data.clone(),
            explain: self.explain,
            speak: self.speak,
            transcribe: self.transcribe,
            settings_path: self.read_settings.clone(),
            show_languages: self.show_languages,
            show_tones: self.show_tones,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    wordweave::logging::init(cli.verbose, cli.server.is_some())?;
    let config = cli.config();

    if let Some(addr) = cli.server.as_deref() {
        let settings = wordweave::load_settings(&config)?;
        let addr = if addr.trim().is_empty() {
            settings.server_addr.clone()
        } else {
            addr.trim().to_string()
        };
        let state = wordweave::server::ServerState::new(
            WordWeave::from_settings(&settings),
            settings.server_max_body_bytes,
        );
        return wordweave::server::run_server(state, addr).await;
    }
    if cli.interactive {
        return run_interactive(config).await;
    }

    let needs_input = !(cli.show_languages || cli.show_tones || cli.data.is_some());
    let input = if needs_input {
        if io::stdin().is_terminal() {
            return Err(anyhow!("no input: pipe text on stdin or pass --data <file>"));
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(buffer)
    } else {
        None
    };

    let output = wordweave::run(config, input).await?;
    println!("{}", output.text);
    wait_for_artifact(output).await;
    Ok(())
}

/// Keeps the process alive until the spoken file has been removed.
async fn wait_for_artifact(output: ExecutionOutput) {
    let Some(artifact) = output.artifact else {
        return;
    };
    println!("audio: {}", artifact.path.display());
    let remaining: std::time::Duration = (artifact.delete_at - OffsetDateTime::now_utc())
        .try_into()
        .unwrap_or_default();
    tokio::time::sleep(remaining).await;
    wordweave::artifacts::delete_artifact(&artifact.path);
}

async fn run_interactive(mut config: Config) -> Result<()> {
    use std::io::Write;

    let settings = wordweave::load_settings(&config)?;
    let service = WordWeave::from_settings(&settings);
    config.data = None;
    config.transcribe = false;

    println!("Interactive mode. Use /quit or /exit to finish.");
    println!("Type /help to see available commands.");

    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.starts_with('/') {
            if handle_interactive_command(input, &service, &mut config).await {
                break;
            }
            continue;
        }

        match wordweave::execute(&service, &config, Some(input.to_string())).await {
            Ok(output) => println!("{}", output.text),
            Err(err) => eprintln!("{}", err),
        }
    }
    Ok(())
}

async fn handle_interactive_command(input: &str, service: &WordWeave, config: &mut Config) -> bool {
    let trimmed = input.trim();
    match trimmed {
        "/quit" | "/exit" => return true,
        "/help" => {
            print_interactive_help();
            return false;
        }
        "/history" => {
            println!("{}", service.history());
            return false;
        }
        "/favourites" => {
            println!("{}", service.favourites());
            return false;
        }
        "/save" => {
            match service.save_latest_to_favourites() {
                Ok(outcome) => println!("{}", outcome.message()),
                Err(err) => eprintln!("{}", err),
            }
            return false;
        }
        "/explain" | "/speak" => {
            let Some(latest) = service.history_store().latest() else {
                eprintln!("{}", wordweave::WordWeaveError::NoHistory);
                return false;
            };
            if trimmed == "/explain" {
                match service
                    .explain(
                        &latest.translated_text,
                        &latest.source_language,
                        &latest.target_language,
                    )
                    .await
                {
                    Ok(explanation) => println!("{}", explanation),
                    Err(err) => eprintln!("{}", err),
                }
            } else {
                match service
                    .speak(&latest.translated_text, &latest.target_language)
                    .await
                {
                    Ok(artifact) => println!("audio: {}", artifact.path.display()),
                    Err(err) => eprintln!("{}", err),
                }
            }
            return false;
        }
        _ => {}
    }

    if let Some(arg) = command_arg(trimmed, "/source-lang") {
        set_or_show("source-lang", arg, &mut config.source_lang);
        return false;
    }
    if let Some(arg) = command_arg(trimmed, "/lang") {
        set_or_show("lang", arg, &mut config.lang);
        return false;
    }
    if let Some(arg) = command_arg(trimmed, "/tone") {
        set_or_show("tone", arg, &mut config.tone);
        return false;
    }

    eprintln!("unknown command: {}", trimmed);
    false
}

/// Argument of `command` when `input` is that command, alone or followed by
/// whitespace.
fn command_arg<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(command)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn set_or_show(name: &str, arg: &str, slot: &mut String) {
    let value = arg.trim();
    if value.is_empty() {
        println!("{}: {}", name, slot);
    } else {
        *slot = value.to_string();
        println!("{} set to {}", name, value);
    }
}

fn print_interactive_help() {
    println!("Commands:");
    println!("  /quit, /exit           Exit interactive mode");
    println!("  /history               Show the last translations");
    println!("  /favourites            Show saved favourites");
    println!("  /save                  Save the latest translation to favourites");
    println!("  /explain               Explain the latest translation");
    println!("  /speak                 Speak the latest translation");
    println!("  /lang <name>           Set target language (or show current)");
    println!("  /source-lang <name>    Set source language (or show current)");
    println!("  /tone <name>           Set tone (or show current)");
}
