use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::PersonaName;
use crate::domain::models::TransportMode;
use crate::domain::models::ViewName;
use crate::domain::services::actions::help_text;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Verde")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Verde with environment variable RUST_LOG=verde")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_persona() -> Arg {
    return Arg::new(ConfigKey::Persona.to_string())
        .short('p')
        .long(ConfigKey::Persona.to_string())
        .env("VERDE_PERSONA")
        .num_args(1)
        .help(format!(
            "Which Verde to talk to: the garden advisor or the green infrastructure planner. [default: {}]",
            Config::default(ConfigKey::Persona)
        ))
        .value_parser(PossibleValuesParser::new(PersonaName::VARIANTS));
}

fn arg_transport() -> Arg {
    return Arg::new(ConfigKey::Transport.to_string())
        .short('t')
        .long(ConfigKey::Transport.to_string())
        .env("VERDE_TRANSPORT")
        .num_args(1)
        .help(format!(
            "Call the Gemini API directly with an API key, or go through a proxy that holds the key. [default: {}]",
            Config::default(ConfigKey::Transport)
        ))
        .value_parser(PossibleValuesParser::new(TransportMode::VARIANTS));
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("VERDE_MODEL")
        .num_args(1)
        .help(format!(
            "The Gemini model to generate replies with. [default: {}]",
            Config::default(ConfigKey::Model)
        ));
}

fn arg_view() -> Arg {
    return Arg::new(ConfigKey::View.to_string())
        .long(ConfigKey::View.to_string())
        .env("VERDE_VIEW")
        .num_args(1)
        .help(format!(
            "Where the transcript is shown: printed to the terminal, or written to an HTML file. [default: {}]",
            Config::default(ConfigKey::View)
        ))
        .value_parser(PossibleValuesParser::new(ViewName::VARIANTS));
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a new chat session.")
        .arg(arg_persona())
        .arg(arg_transport())
        .arg(arg_model())
        .arg(arg_view());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("SENDING:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("verde")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_persona())
        .arg(arg_transport())
        .arg(arg_model())
        .arg(arg_view())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("VERDE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("VERDE_API_URL")
                .num_args(1)
                .help(format!("Gemini API URL when using the direct transport. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ApiKey.to_string())
                .long(ConfigKey::ApiKey.to_string())
                .env("VERDE_API_KEY")
                .num_args(1)
                .help("Gemini API key when using the direct transport.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ProxyURL.to_string())
                .long(ConfigKey::ProxyURL.to_string())
                .env("VERDE_PROXY_URL")
                .num_args(1)
                .help(format!("Endpoint that forwards requests to Gemini when using the proxy transport. [default: {}]", Config::default(ConfigKey::ProxyURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::MaxRetries.to_string())
                .long(ConfigKey::MaxRetries.to_string())
                .env("VERDE_MAX_RETRIES")
                .num_args(1)
                .help(format!("Retries after a rate limit, server or network error before giving up on a reply. [default: {}]", Config::default(ConfigKey::MaxRetries)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RetryDelay.to_string())
                .long(ConfigKey::RetryDelay.to_string())
                .env("VERDE_RETRY_DELAY")
                .num_args(1)
                .help(format!("Milliseconds to wait before the first retry. Doubles on every retry after. [default: {}]", Config::default(ConfigKey::RetryDelay)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("VERDE_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Milliseconds a single request attempt may take before it counts as a network error. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TranscriptFile.to_string())
                .long(ConfigKey::TranscriptFile.to_string())
                .env("VERDE_TRANSCRIPT_FILE")
                .num_args(1)
                .help(format!("HTML file the transcript is written to when using the html view. [default: {}]", Config::default(ConfigKey::TranscriptFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("VERDE_USERNAME")
                .num_args(1)
                .help("Your name, shown on your messages in the transcript.")
                .global(true),
        );
}

pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("VERDE_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("verde");
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
