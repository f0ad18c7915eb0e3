//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches snapshots / generates synthetic ones
//! - drives the editing session and the recalculate/save round-trips
//! - prints reports
//! - writes optional export content

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Command, FetchArgs, ReplayArgs, SampleArgs};
use crate::data::{generate_snapshot, IntervalClient};
use crate::engine::TableEvent;
use crate::error::AppError;

pub mod session;

use session::Session;

/// Entry point for the `dci` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Recalc(args) => handle_recalc(args),
        Command::Save(args) => handle_save(args),
        Command::Replay(args) => handle_replay(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_show(args: FetchArgs) -> Result<(), AppError> {
    let client = IntervalClient::from_env()?;
    let snapshot = client.fetch_snapshot(&args.keys())?;
    let session = Session::from_snapshot(snapshot)?;

    print_session(&session);
    maybe_export(&session, args.export.as_deref())
}

fn handle_recalc(args: FetchArgs) -> Result<(), AppError> {
    let client = IntervalClient::from_env()?;
    let snapshot = client.fetch_snapshot(&args.keys())?;
    let mut session = Session::from_snapshot(snapshot)?;

    let request = session.recalculate_request()?;
    let response = client.recalculate(&request)?;
    session.accept_recalculated(response)?;

    print_session(&session);
    maybe_export(&session, args.export.as_deref())
}

fn handle_save(args: FetchArgs) -> Result<(), AppError> {
    let client = IntervalClient::from_env()?;
    let snapshot = client.fetch_snapshot(&args.keys())?;
    let mut session = Session::from_snapshot(snapshot)?;

    let request = session.recalculate_request()?;
    let response = client.recalculate(&request)?;
    session.accept_recalculated(response)?;

    let save_date = chrono::Local::now().date_naive();
    client.save(&session.save_request(save_date)?)?;

    println!("Saved.");
    print_session(&session);
    maybe_export(&session, args.export.as_deref())
}

fn handle_replay(args: ReplayArgs) -> Result<(), AppError> {
    let snapshot = generate_snapshot(args.seed, args.algorithms)?;
    let mut session = Session::from_snapshot(snapshot)?;

    let events = read_script(&args.script)?;
    session.dispatch_all(&events);

    print_session(&session);
    maybe_export(&session, args.export.as_deref())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let snapshot = generate_snapshot(args.seed, args.algorithms)?;
    let session = Session::from_snapshot(snapshot)?;
    print_session(&session);
    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<TableEvent>, AppError> {
    let file = std::fs::File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open event script '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid event script: {e}")))
}

fn print_session(session: &Session) {
    println!(
        "{}",
        crate::report::format_form_summary(session.group_info(), &session.form, session.bounds())
    );
    println!("{}", crate::report::format_row_table(&session.rows));
}

fn maybe_export(session: &Session, path: Option<&Path>) -> Result<(), AppError> {
    if let Some(path) = path {
        crate::io::export::write_report_json(path, &session.report_content())?;
        println!("Report content written to {}", path.display());
    }
    Ok(())
}
