use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use medbook_cli::render;
use medbook_cli::session::{CatalogSource, Session};
use medbook_cli::settings::{Settings, resolve_settings_path, save_settings};
use medbook_core::{AppState, DoctorCardView, filter};

use crate::cli::{CatalogArgs, ConfigArgs, DoctorsArgs, SessionArgs};

/// Catalog precedence: `--catalog`, then the settings file, then built-in.
fn catalog_source(args: &CatalogArgs, settings: &Settings) -> CatalogSource {
    args.catalog
        .clone()
        .or_else(|| settings.catalog.path.clone())
        .map_or(CatalogSource::Builtin, CatalogSource::File)
}

pub fn run_doctors(args: &DoctorsArgs, settings: &Settings) -> Result<()> {
    let source = catalog_source(&args.catalog, settings);
    let catalog = source.load().context("load catalog")?;
    let doctors = filter(
        &catalog.doctors,
        args.specialty.as_deref(),
        args.time.as_deref(),
    );
    info!(
        total = catalog.doctors.len(),
        matching = doctors.len(),
        "doctors filtered"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&doctors).context("serialize doctors")?;
        println!("{json}");
        return Ok(());
    }
    let state = AppState::default();
    let cards: Vec<DoctorCardView<'_>> = doctors
        .into_iter()
        .map(|doctor| {
            let mut card = DoctorCardView::new(doctor, &state);
            card.image.mark_loaded();
            card
        })
        .collect();
    println!("{}", render::doctors_table(&cards, settings.display.table_width));
    Ok(())
}

pub fn run_options(args: &CatalogArgs, settings: &Settings) -> Result<()> {
    let catalog = catalog_source(args, settings)
        .load()
        .context("load catalog")?;
    let width = settings.display.table_width;
    println!("{}", render::options_table("Specialty", &catalog.specialties, width));
    println!(
        "{}",
        render::options_table("Availability", &catalog.availability_times, width)
    );
    Ok(())
}

/// Run a session script. Returns `true` when the session ended on the
/// failure notice.
pub fn run_session(args: &SessionArgs, settings: &Settings) -> Result<bool> {
    let source = catalog_source(&args.catalog, settings);
    let span = info_span!("session", source = ?source);
    let _guard = span.enter();
    let mut session = Session::new(source, settings).context("load catalog")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("open session script {}", path.display()))?;
            session
                .run_script(BufReader::new(file), &mut out)
                .context("run session script")?;
        }
        None => session
            .run_script(io::stdin().lock(), &mut out)
            .context("run session")?,
    }

    if args.json {
        let json = session
            .store()
            .with_state(|state| serde_json::to_string_pretty(&state.appointments))
            .context("serialize appointments")?;
        writeln!(out, "{json}")?;
    }
    Ok(session.is_crashed())
}

pub fn run_config(args: &ConfigArgs, explicit: Option<&Path>, settings: &Settings) -> Result<()> {
    if args.write {
        let path = save_settings(settings, explicit)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }
    match resolve_settings_path(explicit) {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no settings location available"),
    }
    print!(
        "{}",
        toml::to_string_pretty(settings).context("serialize settings")?
    );
    Ok(())
}
