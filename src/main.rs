//! Label Panel - control surface for a label printer backend
//!
//! Main entry point for the GUI and the headless subcommands.
//!
//! # Overview
//!
//! Without a subcommand this opens the Slint window. It initializes:
//! - Client settings ([`ConfigManager`]: defaults, `labelpanel.yaml`, `LABELPANEL_*`)
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime for backend requests
//! - State management ([`StateManager`]) and the [`LabelSession`]
//! - GUI controller ([`GuiController`] - binds the window to the session)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Backend requests (config, status, preview, print)
//! - **State listener**: Background std::thread forwarding state events to the window
//!
//! # Usage
//!
//! ```bash
//! # Open the panel
//! labelpanel --backend http://labels.lan:5000
//!
//! # Render a preview to a PNG
//! labelpanel preview --variant text --line "Hello" --line "World" --out hello.png
//!
//! # Print a cable wrap
//! labelpanel print --variant wrap --label eth0 --length 2
//!
//! # Print a WiFi card
//! labelpanel wifi --ssid home --password hunter2
//! ```

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use labelpanel::logging::{LOG_PREFIX, setup_logging};
use labelpanel::models::Field;
use labelpanel::ui::GuiController;
use labelpanel::{
    APP_NAME, ConfigManager, HttpBackend, LabelSession, Metrics, StateManager, VERSION, Variant,
};
use std::sync::Arc;
use std::time::Duration;

/// Label Panel - preview and print labels through a label backend
#[derive(Parser, Debug)]
#[command(name = "labelpanel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides the settings file)
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    /// Directory holding labelpanel.yaml
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a preview and save it as PNG
    Preview {
        #[command(flatten)]
        label: LabelOptions,

        /// Output file for the preview image
        #[arg(long, value_name = "FILE", default_value = "out.png")]
        out: Utf8PathBuf,

        /// Maximum preview width in pixels (0 for full size)
        #[arg(long)]
        max_width: Option<u32>,
    },

    /// Submit a print job
    Print {
        #[command(flatten)]
        label: LabelOptions,
    },

    /// Print a WPA network card: QR code plus the credentials as text
    Wifi {
        #[arg(long)]
        ssid: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        printer: Option<String>,

        #[arg(long)]
        tape: Option<String>,

        /// Save a preview to FILE instead of printing
        #[arg(long, value_name = "FILE")]
        out: Option<Utf8PathBuf>,
    },
}

/// Label fields, named like the panel's inputs
#[derive(Args, Debug)]
struct LabelOptions {
    /// text, qr, wrap, flag or aruco
    #[arg(long, default_value = "text")]
    variant: Variant,

    #[arg(long)]
    printer: Option<String>,

    #[arg(long)]
    tape: Option<String>,

    #[arg(long = "font")]
    fontname: Option<String>,

    /// small, medium or large
    #[arg(long)]
    size: Option<String>,

    /// left, center or right; an empty value leaves it unselected
    #[arg(long)]
    align: Option<String>,

    /// One line of text (repeatable)
    #[arg(long = "line", value_name = "TEXT")]
    lines: Vec<String>,

    #[arg(long)]
    label: Option<String>,

    #[arg(long)]
    qrtext: Option<String>,

    /// Wrap length in units of 128 dots
    #[arg(long)]
    length: Option<String>,

    /// ArUco marker id
    #[arg(long)]
    id: Option<String>,

    /// ArUco dictionary
    #[arg(long)]
    dictionary: Option<String>,
}

impl LabelOptions {
    fn field_values(&self) -> Vec<(Field, String)> {
        let optional = [
            (Field::Printer, &self.printer),
            (Field::Tape, &self.tape),
            (Field::Fontname, &self.fontname),
            (Field::Size, &self.size),
            (Field::Align, &self.align),
            (Field::Label, &self.label),
            (Field::Qrtext, &self.qrtext),
            (Field::Length, &self.length),
            (Field::Id, &self.id),
            (Field::Dictionary, &self.dictionary),
        ];

        let mut values: Vec<(Field, String)> = optional
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
            .collect();

        if !self.lines.is_empty() {
            values.push((Field::Lines, self.lines.join("\n")));
        }
        values
    }

    /// Write the options into the session state
    fn apply(&self, state: &StateManager) {
        state.set_variant(self.variant);
        for (field, value) in self.field_values() {
            state.set_field(field, value);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut config = config_manager.load()?;
    if let Some(backend) = &cli.backend {
        config.backend_url = backend.clone();
    }
    config.debug_mode |= cli.debug;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging(&config.log_dir, LOG_PREFIX, config.debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Backend: {} (settings from {})",
        config.backend_url,
        config_manager.config_path()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("labelpanel-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let state_manager = Arc::new(StateManager::new());
    state_manager.set_preview_width(config.default_preview_width);

    let metrics = Arc::new(Metrics::new());
    let backend = Arc::new(HttpBackend::new(config.backend_url.clone()));
    let session = LabelSession::new(Arc::clone(&state_manager), backend, Arc::clone(&metrics))
        .with_stale_preview_guard(config.discard_stale_previews);

    let result = match cli.command {
        None => run_gui(&runtime, session, config.default_variant),
        Some(command) => runtime.block_on(run_headless(&session, command)),
    };

    metrics.log_summary();
    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Application shutdown complete");

    result
}

fn run_gui(
    runtime: &tokio::runtime::Runtime,
    session: LabelSession<HttpBackend>,
    initial_variant: Variant,
) -> Result<()> {
    // Page-load behavior: options first, then the first preview
    runtime.block_on(session.start(initial_variant));

    let gui_controller = GuiController::new(session, runtime.handle().clone())?;
    tracing::info!("GUI controller initialized, launching window");

    gui_controller.run().map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}

async fn run_headless(session: &LabelSession<HttpBackend>, command: Commands) -> Result<()> {
    session
        .try_load_enumerations()
        .await
        .context("Failed to load printer options")?;

    match command {
        Commands::Preview {
            label,
            out,
            max_width,
        } => {
            label.apply(session.state());
            if let Some(width) = max_width {
                session.state().set_preview_width(width);
            }
            write_preview(session, &out).await
        }

        Commands::Print { label } => {
            label.apply(session.state());
            print_current(session).await
        }

        Commands::Wifi {
            ssid,
            password,
            printer,
            tape,
            out,
        } => {
            let state = session.state();
            state.update(|s| s.label.apply_wifi(&ssid, &password));
            if let Some(printer) = printer {
                state.set_field(Field::Printer, printer);
            }
            if let Some(tape) = tape {
                state.set_field(Field::Tape, tape);
            }

            match out {
                Some(out) => write_preview(session, &out).await,
                None => print_current(session).await,
            }
        }
    }
}

async fn write_preview(session: &LabelSession<HttpBackend>, out: &Utf8PathBuf) -> Result<()> {
    let Some(preview) = session.try_preview().await? else {
        bail!("Preview was superseded before it arrived");
    };

    let bytes = preview
        .png_bytes()
        .context("Backend returned a preview that is not base64")?;
    std::fs::write(out, bytes).with_context(|| format!("Failed to write preview: {}", out))?;

    println!("{} ({})", out, preview.caption);
    Ok(())
}

async fn print_current(session: &LabelSession<HttpBackend>) -> Result<()> {
    session.refresh_status().await;
    if !session.state().read(|s| s.printer_ready) {
        tracing::warn!("Printer reports not ready, submitting anyway");
    }

    session.try_print().await?;
    println!("{}", session.state().read(|s| s.banner.message.clone()));
    Ok(())
}
