use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::{egui, NativeOptions};
use log::{error, info, warn};

use crate::tree::viewer::TreeViewer;
use crate::tree::NodeId;
use crate::{gui::GiniTreeGui, io, ui};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ginitree",
    about = "Interactive explorer for Gini decision trees exported as JSON."
)]
pub struct AppConfig {
    /// Tree data file (JSON with `tree` and `train_labels`).
    #[arg(value_name = "DATA_FILE")]
    pub data_path: Option<PathBuf>,

    /// Write the rendered tree to this SVG file.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Node id to select before rendering.
    #[arg(long, value_name = "NODE_ID")]
    pub select: Option<NodeId>,

    /// Window width in pixels
    #[arg(long, default_value_t = 1100)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 760)]
    pub height: u32,

    /// Run without launching the GUI; print the tree summary instead.
    #[arg(long)]
    pub headless: bool,

    /// Force launch of the egui window even when --headless is given.
    #[arg(long)]
    pub gui: bool,

    /// Ignore display detection safeguards and attempt to launch the GUI anyway.
    #[arg(long)]
    pub force_gui: bool,
}

#[cfg(target_os = "macos")]
mod macos {
    use std::ffi::c_uint;

    #[link(name = "CoreGraphics", kind = "framework")]
    extern "C" {
        fn CGMainDisplayID() -> c_uint;
        fn CGDisplayPixelsWide(display: c_uint) -> usize;
    }

    pub unsafe fn primary_display_width() -> Option<usize> {
        let id = CGMainDisplayID();
        if id == 0 {
            return None;
        }
        Some(CGDisplayPixelsWide(id))
    }
}

pub struct GiniTreeApp;

impl GiniTreeApp {
    pub fn run(config: &AppConfig) -> Result<()> {
        let wants_gui = !config.headless || config.gui || config.force_gui;

        if !wants_gui {
            return Self::run_headless(config);
        }

        if !config.force_gui && !Self::display_available() {
            warn!("GUI requested but no display was detected; falling back to headless mode.");
            return Self::run_headless(config);
        }

        let mut native_options = NativeOptions::default();
        info!(
            "Launching egui window ({}x{}).",
            config.width, config.height
        );
        native_options.viewport = egui::ViewportBuilder::default()
            .with_title("Gini Tree Explorer")
            .with_inner_size(egui::vec2(config.width as f32, config.height as f32));

        let initial_config = config.clone();
        match eframe::run_native(
            "ginitree",
            native_options,
            Box::new(move |cc| Ok(Box::new(GiniTreeGui::new(cc, initial_config)))),
        ) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("Failed to launch egui window: {}", err);
                if config.data_path.is_some() {
                    warn!("Falling back to headless mode.");
                    Self::run_headless(config)
                } else {
                    Err(anyhow!(err.to_string()))
                }
            }
        }
    }

    fn display_available() -> bool {
        #[cfg(target_os = "macos")]
        {
            unsafe {
                macos::primary_display_width()
                    .map(|width| width > 0)
                    .unwrap_or(false)
            }
        }
        #[cfg(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "netbsd"
        ))]
        {
            std::env::var("DISPLAY").is_ok() || std::env::var("WAYLAND_DISPLAY").is_ok()
        }
        #[cfg(target_os = "windows")]
        {
            true
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "linux",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "netbsd",
            target_os = "windows"
        )))]
        {
            false
        }
    }

    fn default_data_path() -> Option<PathBuf> {
        const MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");
        let candidate = PathBuf::from(MANIFEST_DIR).join("data/tree_data.json");
        if candidate.exists() {
            Some(candidate)
        } else {
            None
        }
    }

    fn run_headless(config: &AppConfig) -> Result<()> {
        let data_path = config
            .data_path
            .clone()
            .or_else(Self::default_data_path)
            .ok_or_else(|| {
                anyhow!("headless mode requires DATA_FILE argument or the bundled sample data")
            })?;

        if config.data_path.is_none() {
            info!("Using sample data at {}", data_path.display());
        }
        let data = io::load_tree_data(&data_path)?;
        let mut viewer = TreeViewer::new(data);
        if let Some(node_id) = config.select {
            viewer.on_node_click(node_id);
        }

        ui::render_preview(&viewer);

        if let Some(dest) = &config.output {
            ui::export(&viewer, dest)?;
        }

        Ok(())
    }
}
