use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod logging;

/// Work with s.117 after-care case files.
///
/// Case files are the JSON documents produced by "export" in the planner
/// (`{ patientDetails, needs, exportedAt }`).
#[derive(Parser, Debug)]
#[command(name = "aftercare")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database holding saved work
    #[arg(long, env = "AFTERCARE_DB", default_value = "aftercare.db", global = true)]
    db: PathBuf,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the indicative ICB / Local Authority funding split
    Funding {
        /// Case file to read
        case: PathBuf,

        /// ICB share of s.117 needs, in percent
        #[arg(long, default_value_t = 50)]
        icb_share: u8,

        #[arg(long, value_enum, default_value_t = Method::Weighted)]
        method: Method,

        /// Print the split as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Render the support plan as Markdown
    Plan {
        case: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the deprivation of liberty position
    Dol {
        case: PathBuf,

        #[arg(long, value_enum, default_value_t = Setting::Institutional)]
        setting: Setting,

        /// Assess as of this date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show which plan sections are complete
    Progress { case: PathBuf },

    /// Store a case file as the saved work in the database
    Save { case: PathBuf },

    /// Export the saved work from the database as a case file
    Load {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    /// High=3, Medium=2, Low=1
    Weighted,
    /// Every need scores 1
    Count,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Setting {
    /// Hospital or care home
    Institutional,
    /// Supported living or own home
    Community,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    let output = match args.command {
        Command::Funding {
            case,
            icb_share,
            method,
            json,
        } => commands::funding(&case, icb_share, method.into(), json)?,
        Command::Plan { case, output } => {
            let plan = commands::plan(&case)?;
            match output {
                Some(path) => commands::write_file(&path, &plan)?,
                None => plan,
            }
        }
        Command::Dol {
            case,
            setting,
            today,
        } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::dol(&case, setting.into(), today)?
        }
        Command::Progress { case } => commands::progress(&case)?,
        Command::Save { case } => commands::save(&args.db, &case)?,
        Command::Load { output } => {
            let (filename, json) = commands::load(&args.db)?;
            match output {
                Some(path) => commands::write_file(&path, &json)?,
                None => {
                    eprintln!("Suggested filename: {filename}");
                    json
                }
            }
        }
    };

    println!("{output}");
    Ok(())
}

impl From<Method> for aftercare_core::FundingMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Weighted => aftercare_core::FundingMethod::Weighted,
            Method::Count => aftercare_core::FundingMethod::Count,
        }
    }
}

impl From<Setting> for aftercare_core::dol::SettingType {
    fn from(setting: Setting) -> Self {
        match setting {
            Setting::Institutional => aftercare_core::dol::SettingType::Institutional,
            Setting::Community => aftercare_core::dol::SettingType::Community,
        }
    }
}
