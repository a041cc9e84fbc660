//! vidbox command-line driver.
//!
//! Usage:
//!   vidbox list
//!   vidbox info <id>
//!   vidbox groups <id>
//!   vidbox upload <path>
//!   vidbox delete <id>
//!
//! The API base is read from `VIDBOX_API_BASE` (a `.env` file is honored).

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidbox_client::UploadFile;
use vidbox_models::{Video, VideoId};
use vidbox_session::VideoSession;

const USAGE: &str = "usage: vidbox <list | info <id> | groups <id> | upload <path> | delete <id>>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Info(VideoId),
    Groups(VideoId),
    Upload(PathBuf),
    Delete(VideoId),
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let arg = |i: usize, what: &str| {
        args.get(i)
            .cloned()
            .ok_or_else(|| anyhow!("missing {}\n{}", what, USAGE))
    };

    match args.first().map(String::as_str) {
        Some("list") => Ok(Command::List),
        Some("info") => Ok(Command::Info(arg(1, "video id")?.into())),
        Some("groups") => Ok(Command::Groups(arg(1, "video id")?.into())),
        Some("upload") => Ok(Command::Upload(arg(1, "file path")?.into())),
        Some("delete") => Ok(Command::Delete(arg(1, "video id")?.into())),
        Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vidbox=info,vidbox_session=info,vidbox_client=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(session: &VideoSession, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            session.list_videos().await?;
            print_json(&session.snapshot().videos)
        }
        Command::Info(id) => {
            session.load_video_info(&id).await?;
            print_json(&session.snapshot().selected_info)
        }
        Command::Groups(id) => {
            session.load_video_info(&id).await?;
            session.load_video_groups(&id).await?;
            let annotations = session
                .snapshot()
                .selected_info
                .map(|info| info.group_annotations)
                .unwrap_or_default();
            print_json(&annotations)
        }
        Command::Upload(path) => {
            let file = UploadFile::from_path(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let created = session.upload_video(Some(file)).await?;
            print_json(&json!({ "created": created, "state": session.snapshot() }))
        }
        Command::Delete(id) => {
            session.list_videos().await?;
            let video = session
                .snapshot()
                .video(&id)
                .cloned()
                .unwrap_or_else(|| Video::new(id.clone()));
            session.delete_video(&video).await?;
            info!(video_id = %id, "Deleted");
            print_json(&session.snapshot().videos)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let session = VideoSession::from_env().context("building video API client")?;
    run(&session, command).await
}
