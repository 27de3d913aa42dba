use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use media_stamp::{FileProcessor, Settings, UnresolvedPolicy};

#[derive(Parser)]
#[command(name = "media-stamp")]
#[command(version)]
#[command(about = "Renames photos and videos in place to a canonical, timestamped name")]
#[command(long_about = "Walks a directory tree and renames every photo and video in place to
<PHOTO_|VIDEO_><yyyyMMdd_HHmmss>_<bytes>.<ext>.

Date sources, first usable wins:
1. Embedded tags (EXIF, PNG text, QuickTime mvhd/tkhd, AVI IDIT)
2. Last-write time, unless it is from the current year
3. Nearest parent folder named like a year (e.g. 2004)
4. Last-write time (only with --on-unresolved use-last-write-time)

Name collisions get _copy_1, _copy_2, ... suffixes; nothing is overwritten.")]
struct Cli {
    /// Root directory of the archive
    #[arg(env = "PHOTOS_PATH")]
    root: Option<PathBuf>,

    /// What to do with files no trusted source dates
    #[arg(long, value_enum, default_value_t = UnresolvedPolicy::Skip)]
    on_unresolved: UnresolvedPolicy,

    /// Directories processed in parallel (files within a directory stay sequential)
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Extra file extensions to leave untouched (repeatable)
    #[arg(long = "skip-ext")]
    skip_ext: Vec<String>,

    /// Keep running, repeating the pass after every interval
    #[arg(long)]
    daemon: bool,

    /// Hours to sleep between passes in daemon mode
    #[arg(long, default_value = "24")]
    interval_hours: u64,

    /// Increase verbosity (-v=INFO, -vv=DEBUG, -vvv=TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose)?;

    let settings = Settings {
        root: cli.root,
        policy: cli.on_unresolved,
        workers: cli.workers.max(1),
        skip_extensions: cli.skip_ext,
    };

    let root = settings.validated_root()?;
    println!("Root path: {}", root.display());

    let interval = Duration::from_secs(cli.interval_hours * 60 * 60);

    loop {
        // rebuilt every pass so the resolver sees the current year
        FileProcessor::new(&settings)?.run_pass(&root);
        if !cli.daemon {
            return Ok(());
        }
        info!("Sleeping {}h until the next pass", cli.interval_hours);
        std::thread::sleep(interval);
    }
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    Ok(())
}
