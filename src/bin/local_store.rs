use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use desprendibles::local_store::{FileKeyValue, LocalPayslipStore};
use desprendibles::model::employee::EmployeeDirectory;
use desprendibles::model::payslip::Upload;
use desprendibles::model::period::{DEFAULT_CATALOG_MONTHS, Half, PayPeriod, PeriodOption};

/// Offline payslip store kept as a JSON document in a directory.
#[derive(Parser)]
#[command(name = "local-store", version)]
struct Cli {
    /// Directory holding the store document.
    #[arg(long, env = "LOCAL_STORE_DIR", default_value = "data")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the store if it does not exist yet.
    Init,
    /// Print every record, newest first.
    List,
    /// Records of one employee, or the one for a period.
    Find {
        #[arg(long)]
        citizen_id: String,
        /// Period key, e.g. `primera-2026-01`.
        #[arg(long)]
        period: Option<PayPeriod>,
    },
    /// Store an uploaded slip for one employee and period.
    Add {
        #[arg(long)]
        citizen_id: String,
        /// `primera` or `segunda`.
        #[arg(long)]
        half: Half,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        file_name: String,
        #[arg(long, default_value_t = 0)]
        file_size: i64,
    },
    /// Remove the slip of an employee for a period.
    Delete {
        #[arg(long)]
        citizen_id: String,
        /// Period key, e.g. `primera-2026-01`.
        #[arg(long)]
        period: PayPeriod,
    },
    /// Drop everything and re-seed.
    Clear,
    /// Recent pay periods.
    Periods {
        #[arg(long, default_value_t = DEFAULT_CATALOG_MONTHS)]
        months: u32,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();
    let backend = FileKeyValue::open(&cli.dir)
        .with_context(|| format!("cannot open store directory {}", cli.dir.display()))?;
    let store = LocalPayslipStore::open(backend)?;

    match cli.command {
        Command::Init => println!("store ready in {}", cli.dir.display()),
        Command::List => print_json(&store.get_all()?)?,
        Command::Find { citizen_id, period } => {
            let records = store.get_by_citizen_id(&citizen_id)?;
            if records.is_empty() {
                bail!("no payslips for citizen ID {citizen_id}");
            }
            match period {
                None => print_json(&records)?,
                Some(period) => match records.iter().find(|r| r.entry.period == period.key()) {
                    Some(record) => print_json(record)?,
                    None => {
                        let available: Vec<&str> =
                            records.iter().map(|r| r.entry.period_label.as_str()).collect();
                        bail!("period not found; available: {}", available.join(", "));
                    }
                },
            }
        }
        Command::Add {
            citizen_id,
            half,
            year,
            month,
            file_name,
            file_size,
        } => {
            let upload = Upload {
                citizen_id,
                half,
                year,
                month,
                file_name,
                file_size,
            };
            let new = upload.into_payslip(EmployeeDirectory::fixture(), Local::now().date_naive())?;
            match store.add(new.entry)? {
                Some(record) => print_json(&record)?,
                None => bail!("a payslip for this citizen ID and period already exists"),
            }
        }
        Command::Delete { citizen_id, period } => {
            let period = period.key();
            if !store.delete(&citizen_id, &period)? {
                bail!("no payslip for {citizen_id} in {period}");
            }
            println!("deleted {citizen_id} {period}");
        }
        Command::Clear => {
            store.clear()?;
            println!("store reset to seed data");
        }
        Command::Periods { months } => {
            let periods: Vec<PeriodOption> = PayPeriod::recent(Local::now().date_naive(), months)
                .into_iter()
                .map(PeriodOption::from)
                .collect();
            print_json(&periods)?;
        }
    }

    Ok(())
}
