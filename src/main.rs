use anyhow::Result;
use clap::{CommandFactory, Parser};
use micnote::app::run_record_command;
use micnote::audio::capture::list_devices;
use micnote::cli::{Cli, Commands, ConfigAction};
use micnote::config::Config;
use micnote::daemon::run_daemon;
use micnote::ipc::client::send_command;
use micnote::ipc::protocol::{Command, Response};
use micnote::ipc::server::IpcServer;
use micnote::session::state::ControlSet;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_record_command(config, cli.device, cli.server, cli.export, cli.quiet).await?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Daemon { socket }) => {
            let config = load_config(cli.config.as_deref())?;
            run_daemon(config, socket).await?;
        }
        Some(Commands::Start { socket }) => {
            handle_ipc_command(socket, Command::Start).await?;
        }
        Some(Commands::Stop { socket }) => {
            handle_ipc_command(socket, Command::Stop).await?;
        }
        Some(Commands::Transcribe { socket }) => {
            handle_ipc_command(socket, Command::Transcribe).await?;
        }
        Some(Commands::Export { socket }) => {
            handle_ipc_command(socket, Command::Export).await?;
        }
        Some(Commands::Status { socket }) => {
            handle_ipc_command(socket, Command::Status).await?;
        }
        Some(Commands::Shutdown { socket }) => {
            handle_ipc_command(socket, Command::Shutdown).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "micnote",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/micnote/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}

/// List available audio input devices.
fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

/// Render the control projection as one line, enabled controls green.
fn controls_line(controls: &ControlSet) -> String {
    [
        ("record", controls.record),
        ("stop", controls.stop),
        ("transcribe", controls.transcribe),
        ("export", controls.export),
    ]
    .iter()
    .map(|(name, enabled)| {
        if *enabled {
            name.green().to_string()
        } else {
            name.dimmed().to_string()
        }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Send an IPC command to the daemon and render the response.
async fn handle_ipc_command(socket: Option<std::path::PathBuf>, command: Command) -> Result<()> {
    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);

    match send_command(&socket_path, command).await {
        Ok(response) => match response {
            Response::Ok => {
                println!("{}", "ok".green());
            }
            Response::Stopped { bytes } => {
                println!("Recording stopped ({bytes} bytes)");
            }
            Response::Transcript { text } => {
                println!("{}", text);
            }
            Response::Exported { path } => {
                println!("Transcript saved to {}", path);
            }
            Response::Status {
                state,
                controls,
                asset_bytes,
            } => {
                println!("Status:");
                println!("  {}    {}", "State:".dimmed(), state);
                println!("  {} {}", "Controls:".dimmed(), controls_line(&controls));
                if let Some(bytes) = asset_bytes {
                    println!("  {}    {} bytes", "Asset:".dimmed(), bytes);
                }
            }
            Response::Error { message } => {
                eprintln!("{}", format!("Error: {}", message).red());
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!(
                "{}",
                format!("Failed to communicate with daemon: {}", e).red()
            );
            eprintln!("Is the daemon running? Start it with: micnote daemon");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Handle configuration inspection commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            match config.to_display_toml() {
                Ok(toml) => print!("{}", toml),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Dump => {
            print!("{}", Config::dump_template());
        }
    }
    Ok(())
}
