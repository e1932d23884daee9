use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use periscope_core::{ConnectionPhase, SessionId};
use periscope_engine::access::OpenGate;
use periscope_engine::media::SyntheticSource;
use periscope_engine::roles::{Broadcaster, BroadcasterConfig, Viewer, ViewerConfig};
use periscope_engine::session::SessionEvents;
use periscope_engine::signaling::WsChannel;
use periscope_engine::{SessionError, TransportConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use webrtc::track::track_remote::TrackRemote;

#[derive(Parser)]
#[command(name = "periscope")]
#[command(about = "One-way camera streaming over peer-to-peer transport")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, default_value = "127.0.0.1:8000")]
        listen: String,
    },

    /// Publish the local (synthetic) camera on a session.
    Broadcast {
        #[arg(long, default_value = "ws://127.0.0.1:8000")]
        relay: String,

        /// Session id to broadcast on; generated when omitted.
        #[arg(long)]
        session: Option<Uuid>,

        #[arg(long)]
        no_video: bool,

        #[arg(long)]
        no_audio: bool,
    },

    /// Watch a session.
    View {
        #[arg(long, default_value = "ws://127.0.0.1:8000")]
        relay: String,

        #[arg(long)]
        session: Uuid,
    },
}

/// Prints phase changes and incoming tracks to the terminal.
struct ConsoleEvents;

#[async_trait]
impl SessionEvents for ConsoleEvents {
    async fn on_phase(&self, phase: ConnectionPhase) {
        let line = match phase {
            ConnectionPhase::Connected => format!("● {phase}").green().bold(),
            ConnectionPhase::Failed => format!("● {phase}").red().bold(),
            ConnectionPhase::Closed => format!("● {phase}").dimmed(),
            _ => format!("○ {phase}").cyan(),
        };
        println!("{line}");
    }

    async fn on_remote_track(&self, track: Arc<TrackRemote>) {
        println!(
            "{} {} ({})",
            "▶ remote track".green().bold(),
            track.kind(),
            track.codec().capability.mime_type
        );
    }

    async fn on_error(&self, error: SessionError) {
        eprintln!("{} {error}", "✗".red().bold());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Relay { listen } => {
            println!("{} {listen}", "Signaling relay on".green().bold());
            let listener = TcpListener::bind(&listen)
                .await
                .with_context(|| format!("failed to bind {listen}"))?;
            periscope_relay::serve(listener).await?;
        }

        Commands::Broadcast {
            relay,
            session,
            no_video,
            no_audio,
        } => {
            let session_id = SessionId::from(session.unwrap_or_else(Uuid::new_v4));
            println!("{} {session_id}", "Broadcasting session".green().bold());

            let config = BroadcasterConfig {
                session_id,
                transport: TransportConfig::default(),
                video: !no_video,
                audio: !no_audio,
            };

            let broadcaster = Broadcaster::start(
                config,
                Arc::new(WsChannel::new(relay)),
                Arc::new(SyntheticSource::new()),
                Arc::new(OpenGate),
                Arc::new(ConsoleEvents),
            )
            .await
            .context("failed to start broadcast")?;

            wait_for_shutdown().await;
            broadcaster.stop().await;
        }

        Commands::View { relay, session } => {
            let session_id = SessionId::from(session);
            println!("{} {session_id}", "Viewing session".green().bold());

            let viewer = Viewer::start(
                ViewerConfig::new(session_id),
                Arc::new(WsChannel::new(relay)),
                Arc::new(OpenGate),
                Arc::new(ConsoleEvents),
            )
            .await
            .context("failed to start viewer")?;

            wait_for_shutdown().await;
            viewer.stop().await;
        }
    }

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    println!("{}", "Shutting down...".dimmed());
}
