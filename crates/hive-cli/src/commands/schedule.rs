// crates/hive-cli/src/commands/schedule.rs
//
// `hive schedule --from A --to B` shows how much the emission schedule
// mints over a block range, broken down by phase.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{honey, json, section, table, OutputFormat};
use hive_core::error::HiveError;
use hive_economics::{EmissionSchedule, LedgerConfig};

/// Arguments for the schedule command.
#[derive(Debug, Args)]
pub struct ScheduleCmd {
    /// Ledger config file to read the schedule from (defaults otherwise).
    #[arg(long)]
    pub config: Option<String>,
    /// Start of the range (exclusive).
    #[arg(long, default_value_t = 0)]
    pub from: u64,
    /// End of the range (inclusive).
    #[arg(long)]
    pub to: u64,
}

/// One phase's share of the requested range.
#[derive(Debug, Serialize)]
struct PhaseSlice {
    phase: &'static str,
    from: u64,
    to: u64,
    start_rate: u128,
    accrued: u128,
}

#[derive(Tabled)]
struct PhaseLine {
    #[tabled(rename = "Phase")]
    phase: &'static str,
    #[tabled(rename = "Blocks")]
    blocks: String,
    #[tabled(rename = "Rate at start")]
    start_rate: String,
    #[tabled(rename = "Accrued")]
    accrued: String,
}

impl From<&PhaseSlice> for PhaseLine {
    fn from(slice: &PhaseSlice) -> Self {
        Self {
            phase: slice.phase,
            blocks: format!("({}, {}]", slice.from, slice.to),
            start_rate: honey(slice.start_rate),
            accrued: honey(slice.accrued),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScheduleReport {
    schedule: EmissionSchedule,
    from: u64,
    to: u64,
    rate_at_from: u128,
    rate_at_to: u128,
    accrued: u128,
    phases: Vec<PhaseSlice>,
}

/// Run the schedule command.
pub fn run(cmd: &ScheduleCmd, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cmd.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    let schedule = config.schedule;
    let report = ScheduleReport {
        schedule,
        from: cmd.from,
        to: cmd.to,
        rate_at_from: schedule.rate_at(cmd.from),
        rate_at_to: schedule.rate_at(cmd.to),
        accrued: schedule.accrued(cmd.from, cmd.to)?,
        phases: phase_breakdown(&schedule, cmd.from, cmd.to)?,
    };

    match format {
        OutputFormat::Json => println!("{}", json(&report)?),
        OutputFormat::Table => print_tables(&report),
    }
    Ok(())
}

fn print_tables(report: &ScheduleReport) {
    let schedule = &report.schedule;
    println!("{}", section("Emission Schedule"));
    println!(
        "  Phase 1:  blocks up to {} at {} per block",
        schedule.phase1_end,
        honey(schedule.phase1_rate)
    );
    println!(
        "  Decay:    blocks {} to {}",
        schedule.phase1_end, schedule.phase2_start
    );
    println!(
        "  Phase 2:  blocks from {} at {} per block",
        schedule.phase2_start,
        honey(schedule.phase2_rate)
    );
    println!();

    let lines: Vec<PhaseLine> = report.phases.iter().map(PhaseLine::from).collect();
    println!("{}", table(&lines));
    println!();
    println!("Rate at block {}: {}", report.from, honey(report.rate_at_from));
    println!("Rate at block {}: {}", report.to, honey(report.rate_at_to));
    println!(
        "Accrued over ({}, {}]: {}",
        report.from,
        report.to,
        honey(report.accrued)
    );
}

/// Split `(from, to]` at the phase boundaries, skipping empty pieces.
fn phase_breakdown(
    schedule: &EmissionSchedule,
    from: u64,
    to: u64,
) -> Result<Vec<PhaseSlice>, HiveError> {
    let bounds = [
        ("constant", 0, schedule.phase1_end),
        ("decay", schedule.phase1_end, schedule.phase2_start),
        ("tail", schedule.phase2_start, u64::MAX),
    ];
    let mut rows = Vec::new();
    for (phase, start, end) in bounds {
        let lo = from.max(start);
        let hi = to.min(end);
        if lo >= hi {
            continue;
        }
        rows.push(PhaseSlice {
            phase,
            from: lo,
            to: hi,
            start_rate: schedule.rate_at(lo),
            accrued: schedule.accrued(lo, hi)?,
        });
    }
    Ok(rows)
}
