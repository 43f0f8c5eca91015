//! crm-rfm — score a customer file into RFM segments and manage the saved
//! scoring thresholds.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crm_core::config::AppConfig;
use crm_core::{Customer, RfmConfig};
use crm_segmentation::{FileStore, RfmSettings, SegmentReport};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "crm-rfm")]
#[command(about = "RFM customer segmentation for the bank CRM")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "CRM_RFM_CONFIG")]
    config: Option<String>,

    /// Directory holding saved settings (overrides config)
    #[arg(long, env = "CRM_RFM__STORAGE__DIR")]
    storage_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a JSON array of customers and print the segment report
    Score {
        /// Path to the customers JSON file
        customers: String,

        /// Include every scored customer in the output
        #[arg(long, default_value_t = false)]
        include_customers: bool,
    },
    /// Inspect or change the saved thresholds
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the saved thresholds
    Show,
    /// Update one or more threshold triples and save
    Set {
        /// Days, e.g. 7,30,90
        #[arg(long, value_delimiter = ',')]
        recency: Option<Vec<u32>>,
        #[arg(long, value_delimiter = ',')]
        frequency: Option<Vec<u32>>,
        #[arg(long, value_delimiter = ',')]
        monetary: Option<Vec<u64>>,
    },
    /// Save the default thresholds
    Reset,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_rfm=info,crm_segmentation=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(dir) = cli.storage_dir {
        config.storage.dir = dir;
    }

    info!(storage_dir = %config.storage.dir, key = %config.storage.key, "crm-rfm starting");

    let store = Arc::new(FileStore::new(&config.storage.dir));
    let mut settings = RfmSettings::load(store, config.storage.key.clone());

    match cli.command {
        Command::Score {
            customers,
            include_customers,
        } => {
            let raw = std::fs::read_to_string(&customers)
                .with_context(|| format!("reading {customers}"))?;
            let customers: Vec<Customer> =
                serde_json::from_str(&raw).with_context(|| format!("parsing {customers}"))?;

            let report = SegmentReport::build(&customers, settings.current());
            let report = if include_customers || config.report.include_customers {
                report
            } else {
                report.without_customers()
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config(ConfigCommand::Show) => print_config(settings.current())?,
        Command::Config(ConfigCommand::Set {
            recency,
            frequency,
            monetary,
        }) => {
            set_thresholds(&mut settings, recency, frequency, monetary)?;
            print_config(settings.current())?;
        }
        Command::Config(ConfigCommand::Reset) => {
            settings.clear()?;
            print_config(settings.current())?;
        }
    }

    Ok(())
}

/// Apply the given triples and save. Nothing is saved if any triple is
/// malformed or rejected.
fn set_thresholds(
    settings: &mut RfmSettings,
    recency: Option<Vec<u32>>,
    frequency: Option<Vec<u32>>,
    monetary: Option<Vec<u64>>,
) -> anyhow::Result<()> {
    if let Some(values) = recency {
        settings.set_recency_thresholds(triple(values)?)?;
    }
    if let Some(values) = frequency {
        settings.set_frequency_thresholds(triple(values)?)?;
    }
    if let Some(values) = monetary {
        settings.set_monetary_thresholds(triple(values)?)?;
    }
    if settings.is_dirty() {
        settings.save()?;
    } else {
        info!("Thresholds unchanged, nothing to save");
    }
    Ok(())
}

fn triple<T: Copy + std::fmt::Debug>(values: Vec<T>) -> anyhow::Result<[T; 3]> {
    <[T; 3]>::try_from(values)
        .map_err(|v| anyhow::anyhow!("expected exactly three thresholds, got {v:?}"))
}

fn print_config(config: &RfmConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_segmentation::{ConfigStore, MemoryStore, RFM_CONFIG_KEY};

    #[test]
    fn test_triple_requires_exactly_three_values() {
        assert_eq!(triple(vec![7u32, 30, 90]).unwrap(), [7, 30, 90]);
        assert!(triple(vec![7u32, 30]).is_err());
        assert!(triple(vec![7u32, 30, 90, 120]).is_err());
        assert!(triple(Vec::<u64>::new()).is_err());
    }

    #[test]
    fn test_set_thresholds_saves_valid_triples() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = RfmSettings::load(store.clone(), RFM_CONFIG_KEY);

        set_thresholds(&mut settings, Some(vec![14, 60, 180]), None, None).unwrap();

        let saved = RfmConfig::from_json(&store.get(RFM_CONFIG_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.recency_thresholds, [14, 60, 180]);
        assert!(!settings.is_dirty());
    }

    #[test]
    fn test_rejected_monetary_leaves_saved_blob_untouched() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = RfmSettings::load(store.clone(), RFM_CONFIG_KEY);
        set_thresholds(&mut settings, Some(vec![1, 2, 3]), None, None).unwrap();
        let before = store.get(RFM_CONFIG_KEY).unwrap();

        let descending = set_thresholds(
            &mut settings,
            Some(vec![10, 20, 30]),
            None,
            Some(vec![5_000_000, 2_000_000, 500_000]),
        );
        assert!(descending.is_err());
        assert_eq!(store.get(RFM_CONFIG_KEY).unwrap(), before);

        let short = set_thresholds(&mut settings, None, None, Some(vec![1, 2]));
        assert!(short.is_err());
        assert_eq!(store.get(RFM_CONFIG_KEY).unwrap(), before);
    }
}
