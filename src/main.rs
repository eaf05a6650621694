use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, Command, OutputFormat};
use ytsub::clipboard::{Clipboard, SystemClipboard};
use ytsub::config::Config;
use ytsub::service::TranscriptService;
use ytsub::view::{HttpTranscriptClient, LocalTranscriptClient, TranscriptClient, TranscriptView};
use ytsub::youtube::YoutubeCaptions;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsub.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsub")
        .join("logs")
}

fn build_after_help() -> String {
    let clipboard_line = match SystemClipboard::default().available_tool() {
        Some(tool) => format!("  \x1b[32m✅\x1b[0m clipboard  {tool}"),
        None => "  \x1b[31m❌\x1b[0m clipboard  (no copy tool found — needed for --copy)".to_string(),
    };

    format!(
        "\nCLIPBOARD:\n{clipboard_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytsub::config::config_path().display(),
        log_dir().join("ytsub.log").display()
    )
}

fn transcript_service(config: &Config, client: reqwest::Client) -> TranscriptService {
    let provider = Arc::new(YoutubeCaptions::new(client));
    TranscriptService::new(provider, config.preferred_langs())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    let client = reqwest::Client::new();

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.as_deref().unwrap_or_else(|| config.bind());
            let service = transcript_service(&config, client);
            eprintln!("Serving on http://{bind}");
            ytsub::server::serve(bind, service).await
        }
        Command::Fetch {
            url,
            server,
            format,
            copy,
            output,
            verbose,
        } => {
            let server = server.or_else(|| config.server_url.clone());
            let transcript_client: Box<dyn TranscriptClient> = match server {
                Some(base_url) => {
                    debug!("Fetching through server {base_url}");
                    Box::new(HttpTranscriptClient::new(client, base_url))
                }
                None => Box::new(LocalTranscriptClient::new(transcript_service(&config, client))),
            };

            let mut view = TranscriptView::new();
            view.set_url(url);
            if let Err(e) = view.fetch(transcript_client.as_ref()).await {
                bail!("{e}");
            }

            if verbose {
                if let Some(video_id) = ytsub::extract_video_id(view.url()) {
                    eprintln!("Video: {video_id}");
                }
                eprintln!("Lines: {}", view.transcript().len());
            }

            let rendered = match format {
                OutputFormat::Text => ytsub::output::render_text(view.transcript()),
                OutputFormat::Plain => ytsub::output::render_plain(view.transcript()),
                OutputFormat::Json => ytsub::output::render_json(view.transcript())?,
            };

            if let Some(ref path) = output {
                std::fs::write(path, &rendered)?;
                if verbose {
                    eprintln!("Output written to: {}", path.display());
                }
            } else {
                println!("{rendered}");
            }

            if copy {
                let clipboard: &dyn Clipboard = &SystemClipboard::default();
                view.copy_all(clipboard)?;
                eprintln!("✓ 已复制");
            }

            Ok(())
        }
    }
}
