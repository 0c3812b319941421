//! CLI smoke entry point.
//!
//! # Responsibility
//! - Import one JSON story onto an in-memory board, read it back and print
//!   a deterministic summary.
//! - Exercise `storyboard_core` wiring without a canvas platform.
//!
//! Usage: `storyboard_cli <story.json> [--config <engine.json>] [--json]`.
//! Set `STORYBOARD_LOG_DIR` to an absolute path to enable file logs.

use log::info;
use std::process::ExitCode;
use storyboard_core::{
    default_log_level, init_logging, EngineConfig, ExtractionService, InMemoryBoard,
    JsonStoryParser, PublishService, StartMode,
};

const LOG_DIR_ENV: &str = "STORYBOARD_LOG_DIR";

struct Args {
    story_path: String,
    config_path: Option<String>,
    print_json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut story_path = None;
    let mut config_path = None;
    let mut print_json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(args.next().ok_or("--config needs a file path")?);
            }
            "--json" => print_json = true,
            _ if story_path.is_none() => story_path = Some(arg),
            other => return Err(format!("unexpected argument `{other}`")),
        }
    }

    Ok(Args {
        story_path: story_path
            .ok_or("usage: storyboard_cli <story.json> [--config <engine.json>] [--json]")?,
        config_path,
        print_json,
    })
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let config = match &args.config_path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{path}`: {err}"))?;
            EngineConfig::from_json(&source)?
        }
        None => EngineConfig::default(),
    };

    let contents = std::fs::read_to_string(&args.story_path)
        .map_err(|err| format!("failed to read `{}`: {err}", args.story_path))?;

    let mut board = InMemoryBoard::new();
    let projected = PublishService::new(&mut board, &config)
        .import_file(&JsonStoryParser, &args.story_path, &contents)
        .map_err(|err| err.to_string())?;
    info!(
        "event=cli_import module=cli status=ok passages={}",
        projected.cards.len()
    );

    let story = ExtractionService::new(&board, &config)
        .extract(projected.container, StartMode::FromMarker)
        .map_err(|err| err.to_string())?;

    println!("storyboard_core version={}", storyboard_core::core_version());
    println!("story name={}", story.name);
    println!("story ifid={}", story.ifid);
    println!("story format={}-{}", story.format, story.format_version);
    println!("story start={}", story.start);
    println!(
        "board cards={} tags={} connectors={}",
        projected.cards.len(),
        projected.tags.len(),
        projected.connectors.len()
    );
    if args.print_json {
        let json = serde_json::to_string_pretty(&story).map_err(|err| err.to_string())?;
        println!("{json}");
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
