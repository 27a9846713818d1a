#![warn(clippy::all)]

//! Outline Workbench - compare geographic outlines at true scale.
//!
//! Outlines are projected into a local tangent plane (azimuthal
//! equidistant) about a configurable center and laid over one another on a
//! draggable canvas, so their real physical sizes can be compared without
//! map-projection inflation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{crate_version, value_parser, Arg, ArgMatches, Command};
use eframe::egui;

use outline_workbench::catalog::Catalog;
use outline_workbench::config::Config;
use outline_workbench::error::Result;
use outline_workbench::export;
use outline_workbench::overlay::{OverlayIdentity, Session};
use outline_workbench::state::AppState;
use outline_workbench::ui;

fn main() -> ExitCode {
    env_logger::init();

    let matches = get_matches();
    let config_path = matches
        .get_one::<PathBuf>("config")
        .expect("config is a required argument");

    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let catalog = match Catalog::load(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "loaded {} categories from {}",
        catalog.categories().len(),
        config_path.display()
    );

    if let Some(export_path) = matches.get_one::<PathBuf>("export") {
        return export_headless(&config, &catalog, export_path);
    }

    let state = AppState::new(config, catalog);
    let native_options = eframe::NativeOptions::default();
    match eframe::run_native(
        "Outline Workbench",
        native_options,
        Box::new(move |cc| Ok(Box::new(WorkbenchApp::new(cc, state)))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("failed to start UI: {e}");
            ExitCode::FAILURE
        }
    }
}

fn get_matches() -> ArgMatches {
    Command::new("outline-workbench")
        .version(crate_version!())
        .about("Compare geographic outlines at true scale")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .value_name("FILE")
                .help("Session configuration file (YAML)"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_parser(value_parser!(PathBuf))
                .value_name("FILE")
                .help("Write a static HTML export of every configured sub-item and exit"),
        )
        .get_matches()
}

/// Writes the static HTML document for every catalog sub-item, with zero
/// placement offsets, without starting the UI.
fn export_headless(config: &Config, catalog: &Catalog, path: &Path) -> ExitCode {
    let html = match render_full_export(config, catalog) {
        Ok(html) => html,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match std::fs::write(path, html) {
        Ok(()) => {
            log::info!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("failed to write {}: {e}", path.display());
            ExitCode::FAILURE
        }
    }
}

fn render_full_export(config: &Config, catalog: &Catalog) -> Result<String> {
    let center = config.center().or_else(|| catalog.fallback_center());
    let mut session = Session::new(center, config.allow_duplicates);

    for category in catalog.categories() {
        for sub_item in &category.sub_items {
            let color = config.color_for(session.list().len());
            session.add(
                OverlayIdentity {
                    category: category.name.clone(),
                    sub_item_id: sub_item.id.clone(),
                    display_name: sub_item.display_name.clone(),
                },
                sub_item.outline.clone(),
                color,
            )?;
        }
    }

    Ok(export::export_html(&session, &config.title))
}

/// Main application: owns the state and drives the panel layout.
struct WorkbenchApp {
    state: AppState,
}

impl WorkbenchApp {
    fn new(_cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::render_top_bar(ctx, &mut self.state);
        ui::render_left_panel(ctx, &mut self.state);
        ui::render_canvas(ctx, &mut self.state);
    }
}
