//! # ClipSlots — 命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与退出码。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clipslots::clipboard::{EnigoKeys, NativeClipboard};
use clipslots::error::AppError;
use clipslots::paths::AppPaths;
use clipslots::{commands, daemon};

#[derive(Parser, Debug)]
#[command(name = "clipslots", version, about = "Save and paste full clipboard snapshots from numbered slots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save current clipboard content to a slot
    Save {
        /// Slot number to save to
        slot: u32,
    },
    /// Load slot content to clipboard
    Paste {
        /// Slot number to paste from
        slot: u32,
    },
    /// Show all slots with content preview
    List,
    /// Clear one or all slots
    Clear {
        /// Slot number to clear (omit to clear all)
        slot: Option<u32>,
        /// Skip the confirmation prompt when clearing all slots
        #[arg(short, long)]
        yes: bool,
    },
    /// Show configuration and permission status
    Status,
    /// Run the hotkey daemon in the foreground
    Daemon,
}

fn init_logger(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn confirm_clear_all() -> bool {
    print!("Clear all slots? [y/N]: ");
    let _ = io::stdout().flush();

    let mut response = String::new();
    if io::stdin().lock().read_line(&mut response).is_err() {
        return false;
    }
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

fn run(cli: Cli, paths: &AppPaths) -> Result<Option<String>, AppError> {
    let output = match cli.command {
        Command::Save { slot } => commands::save(paths, &NativeClipboard::new(), slot)?,
        Command::Paste { slot } => commands::paste(paths, &NativeClipboard::new(), slot)?,
        Command::List => commands::list(paths)?,
        Command::Clear { slot, yes } => commands::clear(paths, slot, || yes || confirm_clear_all())?,
        Command::Status => commands::status(paths, &NativeClipboard::new(), &EnigoKeys::new())?,
        Command::Daemon => {
            daemon::run(paths.clone())?;
            return Ok(None);
        }
    };
    Ok(Some(output))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = match AppPaths::resolve() {
        Ok(paths) => paths,
        Err(err) => {
            init_logger("warn");
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let default_filter = match cli.command {
        Command::Daemon => commands::daemon_log_filter(&paths),
        _ => "warn",
    };
    init_logger(default_filter);

    match run(cli, &paths) {
        Ok(Some(output)) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("命令失败: {:?}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
