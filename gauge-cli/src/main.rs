//! Gauge CLI - Command line interface
//!
//! `gauge run <file>` 运行一个模块（相对导入通过文件系统加载），
//! 或用 `-e` 直接运行一段代码。

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;

mod config;
mod error;
mod logging;
mod platform;

use crate::config::{build_run_config, read_config_file, resolve_entry_path, ConfigFile, LogConfig, RunOverrides};
use crate::error::CliError;
use crate::logging::LogFormat;
use crate::platform::{print_error_with_source, print_notice, print_output, OutputMode};
use gauge_api::{init_config, FileLinker, GaugeError, Project};
use gauge_config::targets;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "gauge", about = "Gauge probabilistic estimation language", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a .gauge file or a code snippet
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Source file to run
    #[arg(value_name = "FILE", conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Run this code instead of a file
    #[arg(short = 'e', long = "eval", value_name = "CODE")]
    eval: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of samples per distribution
    #[arg(long, env = "SAMPLE_COUNT")]
    sample_count: Option<usize>,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<String>,

    /// Record and print per-statement timings
    #[arg(long)]
    profile: bool,

    /// Print nothing on success
    #[arg(short, long, conflicts_with = "show_bindings")]
    quiet: bool,

    /// Print both the result and the bindings
    #[arg(short = 'b', long)]
    show_bindings: bool,

    /// Print the execution time
    #[arg(short, long)]
    time: bool,

    /// Runner: embedded or thread
    #[arg(long, value_name = "NAME")]
    runner: Option<String>,

    /// Worker threads for the thread runner
    #[arg(long, value_name = "N")]
    runner_threads: Option<usize>,

    /// Per-module timeout for the thread runner
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Print project events (loads, committed outputs)
    #[arg(long)]
    log_events: bool,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: pretty, compact, json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,
}

impl RunArgs {
    fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::None
        } else if self.show_bindings {
            OutputMode::Both
        } else {
            OutputMode::ResultOrBindings
        }
    }

    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            sample_count: self.sample_count,
            seed: self.seed.clone(),
            profile: self.profile,
            runner: self.runner.clone(),
            runner_threads: self.runner_threads,
            timeout_ms: self.timeout_ms,
            log_events: self.log_events,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run_command(&args),
    };
    if let Err(e) = result {
        match &e {
            CliError::Program { error, code } => print_error_with_source(error, code),
            other => eprintln!("Error: {other}"),
        }
        process::exit(e.exit_code());
    }
}

/// 入口：模块名和源码
struct Entry {
    name: String,
    code: String,
}

fn run_command(args: &RunArgs) -> Result<(), CliError> {
    let file_config = args.config.as_deref().map(read_config_file).transpose()?;

    // Logging first, so config and load steps are visible
    let log_section = file_config.as_ref().and_then(|c| c.log.as_ref());
    let log_config = LogConfig::from_section(log_section, args.log_level.as_deref())?;
    let format = args
        .log_format
        .as_deref()
        .or_else(|| log_section.and_then(|l| l.format.as_deref()))
        .map(LogFormat::parse)
        .transpose()?
        .unwrap_or_default();
    logging::init(&log_config, format);

    let run_config = build_run_config(file_config.as_ref(), &args.overrides())?;
    debug!(target: targets::CLI, ?run_config, "Resolved configuration");
    init_config(run_config.clone());

    let entry = read_entry(args, args.config.as_deref(), file_config.as_ref())?;
    info!(target: targets::CLI, module = %entry.name, "Running");

    let project = Project::from_config(&run_config).with_linker(Arc::new(FileLinker::new()));
    let events = run_config.log_events.then(|| {
        let notices = project.subscribe();
        thread::spawn(move || {
            for notice in notices.iter() {
                print_notice(&notice);
            }
        })
    });

    project.set_source(&entry.name, entry.code.as_str());
    let outcome = project
        .run(&entry.name)
        .and_then(|output| match &output.result {
            Ok(success) => {
                print_output(&output, success, args.output_mode(), args.time);
                Ok(())
            }
            Err(error) => Err(GaugeError::Module(error.clone())),
        });

    // 订阅端在 project 释放后结束
    drop(project);
    if let Some(events) = events {
        let _ = events.join();
    }

    outcome.map_err(|error| CliError::Program {
        error,
        code: entry.code,
    })
}

fn read_entry(args: &RunArgs, config_path: Option<&Path>, file_config: Option<&ConfigFile>) -> Result<Entry, CliError> {
    if let Some(code) = &args.eval {
        return Ok(Entry {
            name: "main".to_string(),
            code: code.clone(),
        });
    }
    let path = match (&args.file, config_path, file_config.and_then(|c| c.entry.as_deref())) {
        (Some(file), _, _) => file.clone(),
        (None, Some(config_path), Some(entry)) => resolve_entry_path(config_path, entry),
        _ => return Err(CliError::Usage("Provide a FILE, -e CODE, or a config with an 'entry'".to_string())),
    };
    let code = std::fs::read_to_string(&path).map_err(|e| CliError::Io {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(Entry {
        name: FileLinker::module_name(&path),
        code,
    })
}
