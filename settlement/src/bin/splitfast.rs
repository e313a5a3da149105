//! SplitFast command-line settlement
//!
//! Reads debt statements ("owen owes david 20, ...") from the arguments or
//! stdin and prints the resulting balances and settlement transfers as JSON.

use clap::Parser;
use ledger_core::{parse_debt_text, try_net_balances, DebtEdge, Money, NetBalances};
use serde::Serialize;
use settlement::{Config, NettingEngine, SettlementPlan, SettlementTransfer};
use std::collections::BTreeMap;
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "splitfast")]
#[command(about = "Settle shared debts written as plain text")]
struct Cli {
    /// TOML configuration file (defaults come from SPLITFAST_* variables)
    #[arg(long, env = "SPLITFAST_CONFIG")]
    config: Option<PathBuf>,

    /// Debt statements, e.g. `owen owes david 20`; read from stdin when empty
    text: Vec<String>,
}

#[derive(Serialize)]
struct EdgeView {
    debtor: String,
    creditor: String,
    amount: String,
}

#[derive(Serialize)]
struct TransferView {
    from: String,
    to: String,
    amount: String,
}

#[derive(Serialize)]
struct SummaryView {
    participants: usize,
    edges: usize,
    gross_amount: String,
    transfers: usize,
    net_amount: String,
    transfers_eliminated: usize,
    efficiency: f64,
}

#[derive(Serialize)]
struct Report {
    edges: Vec<EdgeView>,
    balances: BTreeMap<String, String>,
    transfers: Vec<TransferView>,
    summary: SummaryView,
}

impl Report {
    fn new(edges: &[DebtEdge], balances: &NetBalances, plan: &SettlementPlan) -> Self {
        Self {
            edges: edges
                .iter()
                .map(|e| EdgeView {
                    debtor: e.debtor.to_string(),
                    creditor: e.creditor.to_string(),
                    amount: render(e.amount),
                })
                .collect(),
            balances: balances
                .iter()
                .map(|(participant, amount)| (participant.to_string(), render(*amount)))
                .collect(),
            transfers: plan.transfers.iter().map(TransferView::from).collect(),
            summary: SummaryView {
                participants: plan.summary.participant_count,
                edges: plan.summary.edge_count,
                gross_amount: render(plan.summary.gross_amount),
                transfers: plan.summary.transfer_count,
                net_amount: render(plan.summary.net_amount),
                transfers_eliminated: plan.summary.transfers_eliminated,
                efficiency: plan.summary.efficiency(),
            },
        }
    }
}

impl From<&SettlementTransfer> for TransferView {
    fn from(t: &SettlementTransfer) -> Self {
        Self {
            from: t.from.to_string(),
            to: t.to.to_string(),
            amount: render(t.amount),
        }
    }
}

fn render(amount: Money) -> String {
    amount.to_string()
}

fn to_json(report: &Report) -> settlement::Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| settlement::Error::Serialization(e.to_string()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting SplitFast settlement"
    );

    let text = if cli.text.is_empty() {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        input
    } else {
        cli.text.join(" ")
    };

    let edges = parse_debt_text(&text);
    let balances = try_net_balances(&edges)?;
    let engine = NettingEngine::new(config.settlement.conservation_tolerance_minor_units);
    let plan = engine.plan(&edges)?;

    let report = Report::new(&edges, &balances, &plan);
    println!("{}", to_json(&report)?);

    Ok(())
}
