use super::ui;
use crate::core::error::IngestError;
use crate::core::ingest::{DocumentIngestor, ImportRecord, ImportStatus};
use crate::core::role::Role;
use crate::providers::parser::ParserClient;
use crate::store::AssetStore;
use anyhow::{Result, bail};
use comfy_table::{Cell, Color};
use std::path::PathBuf;

/// Uploads T21 documents and imports the vehicles they contain.
pub async fn run(
    store: &dyn AssetStore,
    parser: &ParserClient,
    role: &Role,
    files: &[PathBuf],
) -> Result<()> {
    if !role.can_upload() {
        bail!("Role '{role}' is not allowed to upload documents");
    }
    if files.is_empty() {
        println!("No files to process.");
        return Ok(());
    }

    let ingestor = DocumentIngestor::new(parser, store);

    let pb = ui::new_progress_bar(files.len() as u64, true);
    pb.set_message("Processing documents...");

    let mut results: Vec<(&PathBuf, Result<Vec<ImportRecord>, IngestError>)> = Vec::new();
    for file in files {
        let result = ingestor.ingest_file(file).await;
        results.push((file, result));
        pb.inc(1);
    }
    pb.finish_and_clear();

    for (i, (file, result)) in results.iter().enumerate() {
        println!(
            "\nFile: {}",
            ui::style_text(&file.display().to_string(), ui::StyleType::Title)
        );
        match result {
            Ok(records) if records.is_empty() => {
                println!("No vehicles found in this document.");
            }
            Ok(records) => display_records(records),
            Err(e) => println!(
                "{}",
                ui::style_text(&format!("Failed to process: {e}"), ui::StyleType::Error)
            ),
        }
        if i < results.len() - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

fn display_records(records: &[ImportRecord]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("VIN"),
        ui::header_cell("Vehicle"),
        ui::header_cell("Status"),
        ui::header_cell("Fund"),
        ui::header_cell("Time"),
    ]);

    for record in records {
        let (status_cell, fund_cell) = match &record.status {
            ImportStatus::Created { fund } => (
                Cell::new("created").fg(Color::Green),
                Cell::new(fund.to_string()),
            ),
            ImportStatus::Updated => (Cell::new("updated"), Cell::new("-")),
            ImportStatus::Rejected { reason } => {
                (Cell::new(format!("rejected: {reason}")).fg(Color::Red), Cell::new("-"))
            }
        };
        table.add_row(vec![
            Cell::new(&record.vin),
            Cell::new(&record.vehicle),
            status_cell,
            fund_cell,
            Cell::new(record.timestamp.format("%H:%M:%S").to_string()),
        ]);
    }

    println!("{table}");
}
