use std::error::Error;
use std::io::Read;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use openclinica_ws::{NewEvent, NewSubject, Webservices};

use crate::app::{format_status, print_pretty_json};

pub type CmdResult = Result<(), Box<dyn Error>>;

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    print_pretty_json(&serde_json::to_value(value)?);
    Ok(())
}

// ─── Study ──────────────────────────────────────────────────────────────

pub async fn cmd_studies(ws: &Webservices) -> CmdResult {
    let response = ws.list_all_studies().await?;
    eprintln!("{}", format_status(&response.status));
    print_json(&response)
}

pub async fn cmd_metadata(ws: &Webservices, study: &str, site: Option<&str>, oids: bool) -> CmdResult {
    let odm = ws.get_study_metadata(study, site).await?;
    if oids {
        println!("{}", "Study events:".bright_blue());
        for oid in odm.event_definition_oids() {
            println!("  {oid}");
        }
        println!("{}", "Items:".bright_blue());
        for oid in odm.item_oids() {
            println!("  {oid}");
        }
        return Ok(());
    }
    print_json(&odm.root)
}

// ─── Study subject ──────────────────────────────────────────────────────

pub async fn cmd_subjects(ws: &Webservices, study: &str, site: Option<&str>) -> CmdResult {
    let response = ws.list_all_subjects(study, site).await?;
    eprintln!("{}", format_status(&response.status));
    print_json(&response)
}

pub async fn cmd_create_subject(ws: &Webservices, subject: &NewSubject<'_>) -> CmdResult {
    let response = ws.create_subject(subject).await?;
    eprintln!("{}", format_status(&response.status));
    print_json(&response)
}

pub async fn cmd_subject_exists(
    ws: &Webservices,
    study: &str,
    label: &str,
    site: Option<&str>,
) -> CmdResult {
    match ws.subject_exists(study, label, site).await? {
        Some(oid) => println!("{} {}", label.green(), oid),
        None => println!("{} {}", label.yellow(), "not found".dimmed()),
    }
    Ok(())
}

// ─── Event ──────────────────────────────────────────────────────────────

pub async fn cmd_schedule_event(ws: &Webservices, event: &NewEvent<'_>) -> CmdResult {
    let response = ws.schedule_event(event).await?;
    eprintln!("{}", format_status(&response.status));
    print_json(&response)
}

// ─── Data ───────────────────────────────────────────────────────────────

/// Import ODM read from `file`, or from stdin when `file` is `-`.
pub async fn cmd_import(ws: &Webservices, file: &Path) -> CmdResult {
    let odm = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };

    let response = ws.import_data(&odm).await?;
    eprintln!("{}", format_status(&response.status));
    print_json(&response)
}
