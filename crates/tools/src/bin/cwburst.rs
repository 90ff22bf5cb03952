//! cwburst - Morse code player
//!
//! Plays text given on the command line, or line by line from standard
//! input, through the configured audio device.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cwburst_engine::prelude::*;
use cwburst_tools::{code_chart, init_logging, save_config, session_texts, timing_report, EngineArgs};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{error, info};

/// Morse code synthesis and playback
#[derive(Parser)]
#[command(name = "cwburst")]
#[command(about = "Morse code synthesis and playback")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play text through the audio device
    Play(PlayArgs),
    /// Render text to a WAV file
    Render(RenderArgs),
    /// Show timing for the current settings
    Info(InfoArgs),
}

#[derive(clap::Args)]
struct PlayArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Send "73" after the text
    #[arg(long)]
    farewell: bool,

    /// Send the end-of-message sign "+" after the text
    #[arg(long)]
    end: bool,

    /// Texts to play, one rendering each; standard input is read line by
    /// line when omitted
    text: Vec<String>,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Output WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Append "73"
    #[arg(long)]
    farewell: bool,

    /// Append the end-of-message sign "+"
    #[arg(long)]
    end: bool,

    /// Texts to render into one file, each after its own lead-in silence
    #[arg(required = true)]
    text: Vec<String>,
}

#[derive(clap::Args)]
struct InfoArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Print the code table
    #[arg(long)]
    chart: bool,

    /// Write the effective configuration to this file
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn play(args: PlayArgs) -> Result<()> {
    let config = args.engine.engine_config()?;
    let keying = config.keying();
    info!("Playing on {} at {} CpM", config.device, config.code_speed);

    let worker = RenderWorker::spawn(move || AudioEngine::from_config(&config))
        .context("Failed to start audio engine")?;

    let send = |text: &str| -> Result<()> {
        let summary = worker
            .render_and_play(RenderRequest::new(text, keying))
            .with_context(|| format!("Failed to play {:?}", text))?;
        info!(
            "Sent {} characters at {} Hz ({} frames)",
            summary.characters, summary.frequency, summary.frames
        );
        Ok(())
    };

    if args.text.is_empty() {
        // Each line waits for the previous one to finish
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read standard input")?;
            for text in session_texts([line], false, false) {
                send(&text)?;
            }
        }
        for text in session_texts(Vec::<String>::new(), args.farewell, args.end) {
            send(&text)?;
        }
    } else {
        for text in session_texts(&args.text, args.farewell, args.end) {
            send(&text)?;
        }
    }

    worker.shutdown()?;
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = args.engine.engine_config()?;
    config.device = DeviceConfig::Wav {
        path: args.output.clone(),
    };

    let keying = config.keying();
    let requests: Vec<RenderRequest> = session_texts(&args.text, args.farewell, args.end)
        .into_iter()
        .map(|text| RenderRequest::new(text, keying))
        .collect();

    let mut engine = AudioEngine::from_config(&config).context("Failed to open WAV output")?;
    let summaries = engine.render_and_play_sequence(&requests)?;
    let frames = engine.buffer().len();
    engine.close()?;

    println!(
        "✓ Rendered {} texts ({} characters): {} frames ({:.2} s) written to {:?}",
        summaries.len(),
        summaries.iter().map(|s| s.characters).sum::<usize>(),
        frames,
        frames as f64 / config.sample_rate as f64,
        args.output
    );
    Ok(())
}

fn show_info(args: InfoArgs) -> Result<()> {
    let config = args.engine.engine_config()?;
    println!("\n=== cwburst ===");
    print!("{}", timing_report(&config)?);

    if args.chart {
        println!("\n=== Code table ===");
        print!("{}", code_chart());
    }

    if let Some(path) = args.save_config {
        save_config(&config, &path)?;
        println!("\nConfiguration written to {:?}", path);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let result = match cli.command {
        Commands::Play(args) => play(args),
        Commands::Render(args) => render(args),
        Commands::Info(args) => show_info(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
