use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use gallery_client::HttpGalleryClient;
use gallery_core::{
    EngineCommand, EngineOptions, GalleryEngine, GalleryViewModel, SelectionState, TabSet,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod render;

use config::{load_settings, Settings};
use controller::{dispatch_engine_command, help_text, parse_input, InputAction};

const COMMAND_QUEUE_CAPACITY: usize = 64;
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(about = "Terminal viewer for the tabbed art gallery")]
struct Args {
    /// Base url of the gallery server.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "viewer.toml")]
    config: PathBuf,
    /// Tab indicator transition length in milliseconds; 0 switches instantly.
    #[arg(long)]
    transition_ms: Option<u64>,
    #[arg(long)]
    columns: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    settings.apply_overrides(args.server_url, args.transition_ms, args.columns);
    settings.validate()?;
    init_tracing(&settings);

    let client = HttpGalleryClient::new(&settings.server_url, settings.request_timeout())
        .context("failed to create gallery client")?;
    info!(server_url = %settings.server_url, "viewer: starting");

    let tabs = TabSet::default();
    let engine = GalleryEngine::start(
        Arc::new(client),
        tabs.clone(),
        EngineOptions {
            transition_duration: settings.transition_duration(),
        },
    );
    let snapshots = engine.subscribe();
    let selection = engine.subscribe_selection();

    let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let engine_task = tokio::spawn(engine.run(command_rx));
    let render_task = tokio::spawn(render_loop(snapshots, settings.grid_columns));
    let animation_task = spawn_animation_loop(selection, commands.clone());

    println!("{}", help_text(&tabs));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut status = String::new();
        match parse_input(&line, &tabs) {
            InputAction::Select(index) => {
                let (reply, reply_rx) = oneshot::channel();
                dispatch_engine_command(
                    &commands,
                    EngineCommand::SelectTab {
                        index,
                        reply: Some(reply),
                    },
                    &mut status,
                );
                if status.is_empty() {
                    match reply_rx.await {
                        Ok(Ok(_)) => {}
                        Ok(Err(err)) => status = err.to_string(),
                        Err(_) => status = "gallery engine stopped; restart the viewer".into(),
                    }
                }
            }
            InputAction::Drag(position) => dispatch_engine_command(
                &commands,
                EngineCommand::SetTransitionPosition(position),
                &mut status,
            ),
            InputAction::Help => println!("{}", help_text(&tabs)),
            InputAction::Quit => break,
            InputAction::Empty => {}
            InputAction::Unknown(input) => status = format!("unknown command '{input}'; type help"),
        }
        if !status.is_empty() {
            eprintln!("{status}");
        }
    }

    animation_task.abort();
    drop(commands);
    if let Err(err) = engine_task.await {
        warn!(error = %err, "viewer: engine task failed");
    }
    if let Err(err) = render_task.await {
        warn!(error = %err, "viewer: render task failed");
    }
    info!("viewer: stopped");
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn render_loop(snapshots: watch::Receiver<Arc<GalleryViewModel>>, columns: usize) {
    let mut stream = WatchStream::new(snapshots);
    let mut last: Option<Arc<GalleryViewModel>> = None;
    while let Some(vm) = stream.next().await {
        if !render::should_render(last.as_deref(), &vm) {
            continue;
        }
        println!("\n{}", render::render(&vm, columns));
        last = Some(vm);
    }
}

/// Feeds frame ticks to the engine while the indicator is between tabs.
fn spawn_animation_loop(
    mut selection: watch::Receiver<SelectionState>,
    commands: mpsc::Sender<EngineCommand>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let settled = selection.borrow_and_update().is_settled();
            if settled {
                if selection.changed().await.is_err() {
                    break;
                }
                continue;
            }

            let frame_start = Instant::now();
            tokio::time::sleep(FRAME).await;
            let elapsed = frame_start.elapsed();
            if commands
                .send(EngineCommand::AdvanceTransition(elapsed))
                .await
                .is_err()
            {
                break;
            }
        }
    })
}
