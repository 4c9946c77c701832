use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder, WindowCloseBehaviour};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use services::{Clock, SlideSessionService, VideoSessionService};
use storage::progress::ProgressStore;
use training_core::model::{DocumentInfo, TrainingVideo};
use ui::{App, UiApp, build_app_context};

const DEFAULT_TOTAL_SLIDES: u32 = 5;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSlides { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSlides { raw } => write!(f, "invalid --slides value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    total_slides: u32,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--slides <count>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:trainview.sqlite3");
    eprintln!("  --slides {DEFAULT_TOTAL_SLIDES}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINVIEW_DB_URL, TRAINVIEW_SLIDES");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRAINVIEW_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://trainview.sqlite3".into(), normalize_sqlite_url);
        let mut total_slides = std::env::var("TRAINVIEW_SLIDES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_TOTAL_SLIDES);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--slides" => {
                    let value = require_value(args, "--slides")?;
                    total_slides = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSlides { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            total_slides,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Content shipped with the build. Paths are relative to the bundled
/// assets directory.
fn bundled_documents() -> Vec<DocumentInfo> {
    [
        ("Employee Handbook", "assets/docs/handbook.pdf"),
        ("Safety Guidelines", "assets/docs/safety-guidelines.pdf"),
    ]
    .into_iter()
    .filter_map(|(title, path)| DocumentInfo::new(title, path))
    .collect()
}

fn bundled_videos() -> Vec<TrainingVideo> {
    vec![
        TrainingVideo::new("intro", "assets/videos/intro.mp4", "Introduction"),
        TrainingVideo::new("safety", "assets/videos/safety.mp4", "Safety Briefing"),
    ]
}

struct DesktopApp {
    clock: Clock,
    documents: Vec<DocumentInfo>,
    training_videos: Vec<TrainingVideo>,
    slide_session: Arc<Mutex<SlideSessionService>>,
    video_session: Arc<Mutex<VideoSessionService>>,
}

impl UiApp for DesktopApp {
    fn clock(&self) -> Clock {
        self.clock
    }

    fn documents(&self) -> Vec<DocumentInfo> {
        self.documents.clone()
    }

    fn training_videos(&self) -> Vec<TrainingVideo> {
        self.training_videos.clone()
    }

    fn slide_session(&self) -> Arc<Mutex<SlideSessionService>> {
        Arc::clone(&self.slide_session)
    }

    fn video_session(&self) -> Arc<Mutex<VideoSessionService>> {
        Arc::clone(&self.video_session)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let parsed = Args::parse(&mut args).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open and migrate SQLite in the binary glue so core/services stay
    // file-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let clock = Clock::default_clock();
    let store = ProgressStore::sqlite(&parsed.db_url, clock).await?;

    let slide_session = SlideSessionService::load(store.clone(), parsed.total_slides).await?;
    let video_session = VideoSessionService::new(store);

    let app = DesktopApp {
        clock,
        documents: bundled_documents(),
        training_videos: bundled_videos(),
        slide_session: Arc::new(Mutex::new(slide_session)),
        video_session: Arc::new(Mutex::new(video_session)),
    };

    let context = build_app_context(&(Arc::new(app) as Arc<dyn UiApp>));

    // Closing the window must not kill the process outright: the UI
    // intercepts the close request, persists open sessions and exits
    // itself once the save is done.
    let desktop_cfg = DesktopConfig::new()
        .with_close_behaviour(WindowCloseBehaviour::WindowHides)
        .with_window(
            WindowBuilder::new()
                .with_title("Trainview")
                .with_always_on_top(false),
        );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    if let Err(err) = run().await {
        // At this layer, printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
