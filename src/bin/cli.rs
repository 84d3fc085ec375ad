use clap::{CommandFactory, Parser};
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tubefetch::batch::read_listing;
use tubefetch::config::{ConfigError, FileConfig, Settings};
use tubefetch::progress::{ProgressDisplay, Verbosity, init_logging};
use tubefetch::request::{DownloadRequest, Quality};
use tubefetch::url::{is_site_url, looks_like_playlist};
use tubefetch::{Batch, Error, Orchestrator, download_batch, download_one};
use ytdlp_engine::YtDlp;
use ytdlp_engine::deps::{Libraries, ffmpeg};
use ytdlp_engine::utils::platform::Platform;

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Clone)]
#[command(version, about = "Download videos, audio and subtitles with yt-dlp")]
pub struct Cli {
    pub url: Option<String>,

    /// Output directory [default: <output_root>/<YYYY-MM-DD>]
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// best, worst or a height such as 1080p, 720p, 480p, 360p, 240p
    #[arg(
        long = "quality",
        short = 'q',
        default_value = "best",
        value_parser = clap::value_parser!(Quality)
    )]
    pub quality: Quality,

    /// Download the audio track only (mp3 when ffmpeg is available)
    #[arg(long = "audio", short = 'a', action = clap::ArgAction::SetTrue)]
    pub audio: bool,

    /// Download the whole playlist
    #[arg(long = "playlist", short = 'p', action = clap::ArgAction::SetTrue)]
    pub playlist: bool,

    /// Report whether ffmpeg is available and how to install it
    #[arg(long = "check-ffmpeg", action = clap::ArgAction::SetTrue)]
    pub check_ffmpeg: bool,

    /// Download every URL listed in FILE, one per line
    #[arg(long = "batch", short = 'b', value_name = "FILE", num_args = 0..=1)]
    pub batch: Option<Option<PathBuf>>,

    /// Ask for the URL on the terminal
    #[arg(long = "interactive", short = 'i', action = clap::ArgAction::SetTrue)]
    pub interactive: bool,

    /// Do not ask before downloading from an unknown site
    #[arg(long = "yes", short = 'y', action = clap::ArgAction::SetTrue)]
    pub yes: bool,

    #[arg(long = "verbosity", short = 'v', value_enum)]
    pub verbosity: Option<Verbosity>,
}

/// What the user asked for, settled before the engine runs for the first time.
/// Running the engine installs the interrupt handler, after which Ctrl-C no
/// longer ends a blocking prompt.
enum Job {
    Single(String),
    Batch { path: PathBuf, urls: Vec<String> },
    Finished(ExitCode),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<ExitCode> {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print()?;
            return Ok(if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    let (file_config, config_error) = match FileConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (FileConfig::default(), Some(e)),
    };
    let verbosity = args
        .verbosity
        .or(file_config.verbosity)
        .unwrap_or(Verbosity::Info);
    let multi = init_logging(verbosity);
    if let Some(e) = config_error {
        report_config_error(&e);
    }

    if args.check_ffmpeg {
        check_ffmpeg(&file_config);
        return Ok(ExitCode::SUCCESS);
    }

    if args.url.is_none() && args.batch.is_none() && !args.interactive {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    let libraries = match Libraries::detect(
        file_config.ytdlp_path.as_deref(),
        file_config.ffmpeg_path.as_deref(),
    ) {
        Ok(libraries) => libraries,
        Err(e) => {
            error!("{}", e);
            error!("Install it with `pip install -U yt-dlp` or set ytdlp_path in the config file");
            return Ok(ExitCode::FAILURE);
        }
    };

    let job = match &args.batch {
        Some(path) => batch_job(path.clone())?,
        None => single_job(&args)?,
    };
    if let Job::Finished(code) = job {
        return Ok(code);
    }

    let transcoder = libraries.has_transcoder();
    if !transcoder {
        if args.audio {
            warn!("ffmpeg not found, the audio will be kept in its original format");
        } else {
            info!("ffmpeg not found, run with --check-ffmpeg for installation hints");
        }
    }

    let timeout = file_config.timeout_secs.map(Duration::from_secs);
    let engine = YtDlp::new(libraries).with_timeout(timeout);
    match engine.version().await {
        Ok(version) => debug!("Using yt-dlp {}", version),
        Err(e) => warn!("Cannot read the yt-dlp version: {}", e),
    }

    let today = chrono::Local::now().date_naive();
    let settings = Settings::resolve(&file_config, args.output.clone(), transcoder, today);
    info!("Saving to {}", settings.output_dir.display());

    let display = ProgressDisplay::new(multi);
    let orchestrator = Orchestrator::new(engine, settings);

    match job {
        Job::Single(url) => run_single(&args, url, &orchestrator, &display).await,
        Job::Batch { path, urls } => run_batch(&args, path, urls, &orchestrator, &display).await,
        Job::Finished(code) => Ok(code),
    }
}

fn single_job(args: &Cli) -> CliResult<Job> {
    let url = match &args.url {
        Some(url) if !args.interactive => url.trim().to_string(),
        _ => prompt("Enter the video URL: ")?,
    };
    if url.is_empty() {
        error!("No URL given");
        return Ok(Job::Finished(ExitCode::FAILURE));
    }

    if !args.yes && !is_site_url(&url) {
        let question = format!("{} is not a YouTube URL, continue?", url);
        if !confirm(&question)? {
            println!("Cancelled.");
            return Ok(Job::Finished(ExitCode::SUCCESS));
        }
    }

    Ok(Job::Single(url))
}

fn batch_job(path: Option<PathBuf>) -> CliResult<Job> {
    let path = match path {
        Some(path) => path,
        None => PathBuf::from(prompt("Enter the path of the URL list: ")?),
    };

    match read_listing(&path) {
        Ok(urls) => Ok(Job::Batch { path, urls }),
        Err(e) => {
            error!("{}", e);
            Ok(Job::Finished(ExitCode::FAILURE))
        }
    }
}

async fn run_single(
    args: &Cli,
    url: String,
    orchestrator: &Orchestrator<YtDlp>,
    display: &ProgressDisplay,
) -> CliResult<ExitCode> {
    let playlist = args.playlist || looks_like_playlist(&url);
    let request = DownloadRequest::with_quality(
        url,
        &orchestrator.settings().output_dir,
        args.quality,
        args.audio,
        playlist,
    );

    match download_one(orchestrator, &request, display).await {
        Ok(outcome) if outcome.succeeded => {
            if let Some(media) = &outcome.media_path {
                println!("Saved {}", media.display());
            }
            match &outcome.subtitle_path {
                Some(subtitle) => println!("Subtitle {}", subtitle.display()),
                None if !request.audio_only() && !request.is_playlist() => {
                    println!("No subtitle was available")
                }
                None => {}
            }
            println!("Done, files are in {}", request.output_directory().display());
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome) => {
            error!(
                "{}",
                outcome.message.as_deref().unwrap_or("The download failed")
            );
            eprintln!("Possible causes:");
            eprintln!("  - the URL is wrong or the video is private or removed");
            eprintln!("  - the network is down or the site blocks this address");
            eprintln!("  - yt-dlp is outdated, try `yt-dlp -U`");
            Ok(ExitCode::FAILURE)
        }
        Err(Error::UserCancelled) => {
            println!("Download cancelled.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_batch(
    args: &Cli,
    path: PathBuf,
    urls: Vec<String>,
    orchestrator: &Orchestrator<YtDlp>,
    display: &ProgressDisplay,
) -> CliResult<ExitCode> {
    let batch = Batch::new(
        urls,
        &orchestrator.settings().output_dir,
        args.quality,
        args.audio,
        args.playlist,
    );
    info!("Found {} URLs in {}", batch.len(), path.display());

    let report = download_batch(orchestrator, &batch, display).await;
    if report.cancelled {
        println!("Batch cancelled, {} URLs not attempted.", report.skipped);
    }
    println!(
        "Batch finished: {} succeeded, {} failed.",
        report.succeeded, report.failed
    );

    Ok(ExitCode::SUCCESS)
}

fn check_ffmpeg(file_config: &FileConfig) {
    match ffmpeg::locate(file_config.ffmpeg_path.as_deref()) {
        Some(path) => println!("ffmpeg found at {}", path.display()),
        None => {
            let platform = Platform::detect();
            println!("ffmpeg not found. To install it on {}:", platform);
            for hint in ffmpeg::install_hints(&platform) {
                println!("  {}", hint);
            }
        }
    }
}

fn report_config_error(e: &ConfigError) {
    error!("{}", e);
    info!("Continuing with the default settings");
}

fn prompt(message: &str) -> CliResult<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> CliResult<bool> {
    loop {
        let answer = prompt(&format!("{} [y/n]: ", question))?;
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}
