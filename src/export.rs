use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::simulate::{Round, SimulationResult, TeamSlot};

pub const REGION_ROUND_LABELS: [&str; 4] = ["Round of 64", "Round of 32", "Sweet 16", "Elite 8"];

/// Write a generated bracket as a workbook: one sheet per region plus a
/// Finals sheet.
pub fn export_bracket_xlsx(path: &Path, result: &SimulationResult) -> Result<()> {
    let mut workbook = Workbook::new();

    for region in &result.regions {
        let mut rows = vec![header_row()];
        for (round, label) in region.rounds.iter().zip(REGION_ROUND_LABELS) {
            push_round_rows(&mut rows, label, round);
        }
        rows.push(vec![
            "Region Champion".to_string(),
            slot_name(&region.champion),
        ]);

        let sheet = workbook.add_worksheet();
        sheet.set_name(&region.name)?;
        write_rows(sheet, &rows)?;
    }

    let mut finals_rows = vec![header_row()];
    push_round_rows(&mut finals_rows, "Final Four", &result.final_four);
    push_round_rows(&mut finals_rows, "Championship", &result.championship);
    finals_rows.push(vec!["Champion".to_string(), slot_name(&result.champion)]);

    let sheet = workbook.add_worksheet();
    sheet.set_name("Finals")?;
    write_rows(sheet, &finals_rows)?;

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

/// Dump the raw result tree for downstream consumers.
pub fn export_bracket_json(path: &Path, result: &SimulationResult) -> Result<()> {
    let raw = serde_json::to_string_pretty(result).context("serialize simulation result")?;
    fs::write(path, raw).with_context(|| format!("write bracket json {}", path.display()))?;
    Ok(())
}

/// Timestamped file name in the current directory, e.g.
/// `bracket-20260407-193200.xlsx`.
pub fn default_export_path(extension: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("bracket-{stamp}.{extension}"))
}

fn header_row() -> Vec<String> {
    vec![
        "Round".to_string(),
        "Team A".to_string(),
        "Score A".to_string(),
        "Team B".to_string(),
        "Score B".to_string(),
        "Winner".to_string(),
    ]
}

fn push_round_rows(rows: &mut Vec<Vec<String>>, label: &str, round: &Round) {
    for matchup in round {
        rows.push(vec![
            label.to_string(),
            slot_name(&matchup.team_a),
            format!("{:.3}", matchup.score_a),
            slot_name(&matchup.team_b),
            format!("{:.3}", matchup.score_b),
            slot_name(&matchup.winner),
        ]);
    }
}

fn slot_name(slot: &TeamSlot) -> String {
    slot.clone().unwrap_or_else(|| "-".to_string())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
