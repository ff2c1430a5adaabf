//! Replay a JSON script of stock operations and print the resulting report.
//!
//! Usage: `stockledger <script.json>` (reads stdin when no path is given).

use std::io::Read;

use anyhow::Context;

use stockledger_products::InMemoryProductStore;
use stockledger_reconciliation::script::{self, ScriptStep};
use stockledger_reconciliation::{ReconciliationConfig, ReconciliationService};

fn main() -> anyhow::Result<()> {
    stockledger_observability::init();

    let config = ReconciliationConfig::from_env().context("invalid configuration")?;

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading script from stdin")?;
            buf
        }
    };
    let steps: Vec<ScriptStep> = serde_json::from_str(&raw).context("parsing script")?;
    tracing::info!(steps = steps.len(), "replaying script");

    let service = ReconciliationService::with_backend(InMemoryProductStore::new(), &config);
    let report = script::run(&service, steps)?;

    if report.rejected() > 0 {
        tracing::warn!(rejected = report.rejected(), "some steps were rejected");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
