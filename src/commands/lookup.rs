use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::LookupArgs;
use crate::commands::{open_store, write_json_stdout};
use crate::patterns::format_amount;

#[derive(Debug, Serialize)]
struct LookupResponse {
    identifier: String,
    found: bool,
    total_overdue: Option<f64>,
}

pub fn run(args: LookupArgs) -> Result<()> {
    let store = open_store(&args.store)?;
    let identifier = args.id.trim().to_uppercase();
    let total_overdue = store.total_overdue(&identifier);

    let response = LookupResponse {
        found: total_overdue.is_some(),
        identifier,
        total_overdue,
    };

    if args.json {
        write_json_stdout(&response)?;
    } else {
        match response.total_overdue {
            Some(amount) => println!("{}\t{}", response.identifier, format_amount(amount)),
            None => println!("{}\tnot found", response.identifier),
        }
    }

    info!(identifier = %response.identifier, found = response.found, "lookup completed");
    Ok(())
}
