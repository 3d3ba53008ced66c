//! FocusFlow - a terminal pomodoro timer with focus streaks.
//!
//! Sessions and settings live in a small SQLite database in the platform
//! data directory (override with `--db` or `FOCUSFLOW_DB`).

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use focusflow::audio::{AudioSession, PlayOptions, RodioOutput, SoundCatalog, SoundSource};
use focusflow::date::{format_duration, to_calendar_date};
use focusflow::models::Period;
use focusflow::settings::set_value;
use focusflow::timer::format_status;
use focusflow::{CalendarDate, CompletionEvent, FocusApp, Metrics, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "focusflow", about = "Pomodoro focus timer with streak tracking")]
struct Cli {
    /// Database file for sessions and settings.
    #[arg(long, env = "FOCUSFLOW_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record focus time by hand.
    Record {
        #[arg(long)]
        minutes: u32,
        /// Day to credit (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Today's totals and streaks.
    Stats,
    /// Minutes per day for the last few days.
    Week {
        #[arg(long, default_value_t = 7)]
        days: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Every stored day.
    History,
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Run the timer in the terminal.
    Run {
        /// Stop after this many work periods.
        #[arg(long, default_value_t = 4)]
        cycles: u32,
        /// Ambient sound id from the catalog, played during work.
        #[arg(long)]
        ambient: Option<String>,
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Play an ambient sound (catalog id or file path).
    Play {
        sound: String,
        #[arg(long, default_value_t = false)]
        once: bool,
        #[arg(long)]
        assets: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommands {
    Show,
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let store = match &cli.db {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::new(),
    }
    .context("failed to open session database")?;
    let mut app = FocusApp::new(store);

    match cli.command {
        Commands::Record { minutes, date } => {
            let date = date.unwrap_or_else(|| to_calendar_date(&Local::now()));
            let secs = i64::from(minutes) * 60;
            let records = app.record_session_on(date, secs)?;
            let total = records
                .iter()
                .find(|r| r.date == date)
                .map(|r| r.duration)
                .unwrap_or(secs);
            println!("Recorded {} on {} ({} total)", format_duration(secs), date, format_duration(total));
            Ok(())
        }
        Commands::Stats => {
            print_metrics(&app.metrics(&Local::now()));
            Ok(())
        }
        Commands::Week { days, json } => handle_week(&app, days, json),
        Commands::History => {
            let mut records = app.history()?;
            records.sort_by_key(|r| r.date);
            for record in records {
                println!("{}  {:>8}", record.date, format_duration(record.duration));
            }
            Ok(())
        }
        Commands::Settings { command } => handle_settings(&mut app, command),
        Commands::Run {
            cycles,
            ambient,
            assets,
        } => run_timer(&mut app, cycles, ambient, assets),
        Commands::Play {
            sound,
            once,
            assets,
        } => play_sound(&sound, once, assets),
    }
}

fn print_metrics(metrics: &Metrics) {
    let plural = |n: u32| if n == 1 { "" } else { "s" };
    println!(
        "Today: {} ({} session{})",
        format_duration(metrics.total_today),
        metrics.sessions_today,
        plural(metrics.sessions_today)
    );
    println!(
        "Current streak: {} day{}",
        metrics.current_streak,
        plural(metrics.current_streak)
    );
    println!(
        "Longest streak: {} day{}",
        metrics.longest_streak,
        plural(metrics.longest_streak)
    );
}

fn handle_week(app: &FocusApp<SqliteStore>, days: usize, json: bool) -> Result<()> {
    let summary = app.summary(&Local::now(), days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let peak = summary
        .chart
        .iter()
        .map(|bar| bar.minutes)
        .fold(0.0_f64, f64::max);
    for bar in &summary.chart {
        let width = if peak > 0.0 {
            (bar.minutes / peak * 30.0).round() as usize
        } else {
            0
        };
        println!("{} {}  {:<30} {:>4.0}m", bar.label, bar.date, "#".repeat(width), bar.minutes);
    }
    println!();
    println!(
        "Total sessions: {}  Total minutes: {:.0}  Avg/day: {:.0}m",
        summary.total_sessions, summary.total_minutes, summary.average_minutes
    );
    print_metrics(&summary.metrics);
    if !summary.badges.is_empty() {
        let labels: Vec<&str> = summary.badges.iter().map(|b| b.label()).collect();
        println!("Badges: {}", labels.join(", "));
    }
    Ok(())
}

fn handle_settings(app: &mut FocusApp<SqliteStore>, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&app.settings)?);
        }
        SettingsCommands::Set { key, value } => {
            let mut updated = app.settings.clone();
            set_value(&mut updated, &key, &value)?;
            app.update_setting(|s| *s = updated)?;
            println!("Setting saved: {key} = {value}");
        }
    }
    Ok(())
}

fn open_audio() -> Option<AudioSession<RodioOutput>> {
    match RodioOutput::new() {
        Ok(output) => Some(AudioSession::new(output)),
        Err(e) => {
            warn!(error = %e, "audio unavailable, continuing without sound");
            None
        }
    }
}

fn asset_dir(assets: Option<PathBuf>) -> PathBuf {
    assets.unwrap_or_else(|| PathBuf::from("assets"))
}

fn run_timer(
    app: &mut FocusApp<SqliteStore>,
    cycles: u32,
    ambient: Option<String>,
    assets: Option<PathBuf>,
) -> Result<()> {
    let catalog = SoundCatalog::builtin(&asset_dir(assets));
    let ambient = match ambient {
        Some(id) => match catalog.source(&id) {
            Some(source) => Some(source),
            None => bail!("unknown sound: {id}"),
        },
        None => None,
    };

    let mut audio = open_audio();
    let start_ambient = |audio: &mut Option<AudioSession<RodioOutput>>| {
        if let (Some(session), Some(source)) = (audio.as_mut(), ambient.as_ref()) {
            if let Err(e) = session.play(source.clone(), PlayOptions::default()) {
                warn!(error = %e, "could not start ambient sound");
            }
        }
    };

    app.timer.toggle();
    start_ambient(&mut audio);
    let mut completed = 0;

    while completed < cycles {
        thread::sleep(Duration::from_secs(1));
        let now = Local::now();

        if let Some(event) = app.tick(&now) {
            if app.settings.sound_enabled {
                if let Some(session) = audio.as_mut() {
                    session.play_chime();
                }
            }
            match event {
                CompletionEvent::WorkComplete {
                    focus_secs,
                    recorded,
                    metrics,
                } => {
                    completed += 1;
                    println!();
                    if recorded {
                        println!("Focus session done: {}", format_duration(i64::from(focus_secs)));
                    } else {
                        println!("Focus session done, but it could not be saved");
                    }
                    print_metrics(&metrics);
                }
                CompletionEvent::BreakComplete { period } => {
                    println!();
                    println!("{} over, back to work", period.label());
                }
            }
            if app.timer.period() == Period::Work {
                start_ambient(&mut audio);
            }
        }

        print!("\r{}   ", format_status(&app.timer));
        std::io::stdout().flush()?;
    }

    println!();
    Ok(())
}

fn play_sound(sound: &str, once: bool, assets: Option<PathBuf>) -> Result<()> {
    let catalog = SoundCatalog::builtin(&asset_dir(assets));
    let source = catalog
        .source(sound)
        .unwrap_or_else(|| SoundSource::File(PathBuf::from(sound)));

    let output = RodioOutput::new().context("no audio output available")?;
    let mut session = AudioSession::new(output);
    session
        .play(source, PlayOptions { looping: !once })
        .with_context(|| format!("failed to play {sound}"))?;

    while session.is_playing() {
        thread::sleep(Duration::from_millis(200));
    }
    Ok(())
}
