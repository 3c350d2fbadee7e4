// crates/hive-cli/src/commands/simulate.rs
//
// `hive simulate <scenario.toml>` replays a scenario against an in-memory
// ledger and prints the event log, final account positions and any failed
// steps.

use clap::Args;
use tabled::Tabled;

use crate::output::{honey, json, section, table, OutputFormat};
use crate::scenario::{AccountReport, EventRow, Scenario, SimulationReport, StepFailure};

/// Arguments for the simulate command.
#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Path to the scenario TOML file.
    pub scenario: String,
}

#[derive(Tabled)]
struct AccountLine {
    #[tabled(rename = "Account")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Staked")]
    staked: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Pending LP")]
    pending_lp: u128,
    #[tabled(rename = "Pending Mint")]
    pending_mint: String,
    #[tabled(rename = "Wallet")]
    wallet_honey: String,
    #[tabled(rename = "Wallet LP")]
    wallet_lp: u128,
    #[tabled(rename = "Wallet PAIRED")]
    wallet_paired: u128,
}

impl From<&AccountReport> for AccountLine {
    fn from(report: &AccountReport) -> Self {
        Self {
            name: report.name.clone(),
            address: report.address.clone(),
            staked: honey(report.staked),
            balance: honey(report.balance),
            pending_lp: report.pending_lp,
            pending_mint: honey(report.pending_mint),
            wallet_honey: honey(report.wallet_honey),
            wallet_lp: report.wallet_lp,
            wallet_paired: report.wallet_paired,
        }
    }
}

#[derive(Tabled)]
struct EventLine {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Block")]
    block: u64,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&EventRow> for EventLine {
    fn from(row: &EventRow) -> Self {
        Self {
            step: row.step,
            block: row.block,
            event: row.event.clone(),
            account: row.account.clone(),
            detail: row.detail.clone(),
        }
    }
}

#[derive(Tabled)]
struct FailureLine {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Op")]
    op: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&StepFailure> for FailureLine {
    fn from(failure: &StepFailure) -> Self {
        Self {
            step: failure.step,
            op: failure.op.clone(),
            error: failure.error.clone(),
        }
    }
}

/// Run the simulate command.
pub fn run(cmd: &SimulateCmd, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading scenario from {}", cmd.scenario);
    let report = Scenario::load(&cmd.scenario)?.replay()?;

    match format {
        OutputFormat::Json => println!("{}", json(&report)?),
        OutputFormat::Table => print_tables(&report),
    }
    Ok(())
}

fn print_tables(report: &SimulationReport) {
    let events: Vec<EventLine> = report.events.iter().map(EventLine::from).collect();
    println!("{}", section("Events"));
    println!("{}", table(&events));
    println!();

    let accounts: Vec<AccountLine> = report.accounts.iter().map(AccountLine::from).collect();
    println!("{}", section(&format!("Accounts at block {}", report.final_block)));
    println!("{}", table(&accounts));
    println!();

    println!("{}", section("Ledger"));
    println!("  Total staked:      {}", honey(report.total_staked));
    println!("  Honey round mask:  {}", report.honey_round_mask);
    println!("  LP round mask:     {}", report.lp_round_mask);
    println!("  Mint round mask:   {}", report.honey_mint_round_mask);
    println!("  Claimed principal: {}", honey(report.claimed_principal));
    println!("  Claimed paired:    {}", report.claimed_paired);
    println!("  Total minted:      {}", honey(report.total_minted));

    if !report.failures.is_empty() {
        let failures: Vec<FailureLine> = report.failures.iter().map(FailureLine::from).collect();
        println!();
        println!("{}", section("Failed steps"));
        println!("{}", table(&failures));
    }
}
