//! Command line front end
//!
//! `watch` mounts the dashboard and redraws it in the terminal; the other
//! commands perform one operation against the backend and print the result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::application::{DashboardController, DashboardError, DashboardEvent};
use crate::domain::constants::api::BASE_URL_ENV;
use crate::infrastructure::{AppConfig, DashboardApi, DemoBackend, HttpDashboardApi};
use crate::services::{HighlightTracker, build_view, render_text};

#[derive(Debug, Parser)]
#[command(
    name = "csa-dashboard",
    about = "Customer Success Agent dashboard: churn metrics, live rescue feed and agent runs",
    version
)]
pub struct Cli {
    #[arg(long, global = true, help = "Configuration file (JSON, TOML or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "api-url",
        global = true,
        env = BASE_URL_ENV,
        help = "Backend base URL, e.g. http://localhost:8000/api"
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Use the in-process demo backend instead of HTTP"
    )]
    pub offline: bool,

    #[arg(short, long, global = true, help = "Also log to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Live dashboard. Type `t` to trigger the agent, `r` to reset the demo, `q` to quit.
    Watch {
        #[arg(long, default_value_t = 1_000, help = "Redraw period in milliseconds")]
        redraw_ms: u64,

        #[arg(long, help = "Trigger one agent run right after mounting")]
        trigger: bool,
    },
    /// Fetch once and print the dashboard.
    Snapshot {
        #[arg(long, help = "Print the view model as JSON")]
        json: bool,
    },
    /// Run one scripted agent cycle to completion.
    Trigger,
    /// Reset the backend demo data.
    Reset,
    /// Print aggregate counts from the backend.
    Stats,
    /// Print the feature showcase payload.
    Features,
}

impl Cli {
    /// Configuration with the command line overrides applied.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?
            .with_api_url(self.api_url.clone());
        if self.verbose {
            config.logging.console_output = true;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

pub fn build_api(config: &AppConfig, offline: bool) -> Result<Arc<dyn DashboardApi>> {
    if offline {
        info!("Using in-process demo backend");
        return Ok(Arc::new(DemoBackend::new()));
    }
    let api = HttpDashboardApi::new(&config.api).context("Failed to build HTTP client")?;
    info!("Using backend at {}", api.base_url());
    Ok(Arc::new(api))
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let api = build_api(&config, cli.offline)?;
    let controller = DashboardController::new(api, &config);

    match cli.command.unwrap_or(Command::Watch {
        redraw_ms: 1_000,
        trigger: false,
    }) {
        Command::Watch { redraw_ms, trigger } => watch(controller, redraw_ms, trigger).await,
        Command::Snapshot { json } => snapshot(&controller, json).await,
        Command::Trigger => trigger_once(&controller).await,
        Command::Reset => {
            controller.reset_demo().await.context("Demo reset failed")?;
            println!("🔄 Demo reset");
            print_dashboard(&controller).await;
            Ok(())
        }
        Command::Stats => {
            let stats = controller.api().realtime_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Features => {
            let features = controller.api().features_demo().await?;
            println!("{}", serde_json::to_string_pretty(&features)?);
            Ok(())
        }
    }
}

async fn print_dashboard(controller: &DashboardController) {
    let state = controller.snapshot().await;
    let mut tracker = HighlightTracker::from_settings(controller.settings());
    let view = build_view(&state, &mut tracker, std::time::Instant::now());
    println!("{}", render_text(&view));
}

async fn snapshot(controller: &DashboardController, json: bool) -> Result<()> {
    controller
        .initialize()
        .await
        .context("Failed to fetch dashboard data")?;
    if json {
        let state = controller.snapshot().await;
        let mut tracker = HighlightTracker::from_settings(controller.settings());
        let view = build_view(&state, &mut tracker, std::time::Instant::now());
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_dashboard(controller).await;
    }
    Ok(())
}

async fn trigger_once(controller: &DashboardController) -> Result<()> {
    if let Err(e) = controller.initialize().await {
        warn!("Starting agent run without dashboard data: {}", e);
    }

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                DashboardEvent::ActivityAdded { record } => println!("  {}", record.title),
                DashboardEvent::RunFinished { .. } => break,
                _ => {}
            }
        }
    });

    let report = controller.run_agent().await?;
    if let Err(e) = printer.await {
        warn!("Event printer ended abnormally: {}", e);
    }

    println!(
        "\nRun {} ended {:?} after {} steps",
        report.run_id,
        report.end,
        report.steps_executed.len()
    );
    if !report.completed() {
        warn!(run_id = %report.run_id, "Agent run did not complete: {:?}", report.end);
    }
    for name in &report.saved_customers {
        println!("  ✅ saved {name}");
    }
    print_dashboard(controller).await;
    Ok(())
}

async fn watch(controller: DashboardController, redraw_ms: u64, trigger: bool) -> Result<()> {
    let mounted = controller.mount()?;
    if trigger {
        report_rejection(controller.trigger_agent().map(drop));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = tokio::time::interval(Duration::from_millis(redraw_ms.max(50)));
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tracker = HighlightTracker::from_settings(controller.settings());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = redraw.tick() => {
                let state = controller.snapshot().await;
                let view = build_view(&state, &mut tracker, std::time::Instant::now());
                // Clear screen, cursor home
                print!("\x1b[2J\x1b[H{}", render_text(&view));
            }
            line = lines.next_line() => match line {
                Ok(Some(input)) => match input.trim() {
                    "t" => report_rejection(controller.trigger_agent().map(drop)),
                    "r" => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            report_rejection(controller.reset_demo().await);
                        });
                    }
                    "q" => break,
                    _ => {}
                },
                Ok(None) | Err(_) => break,
            },
        }
    }

    mounted.unmount().await;
    Ok(())
}

fn report_rejection(result: Result<(), DashboardError>) {
    if let Err(e) = result {
        warn!("{}", e);
    }
}
