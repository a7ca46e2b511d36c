use clap::Subcommand;
use focusflow_core::{Config, DataStore, SettingsUpdate, SqliteStore};

use super::CliResult;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current timer settings
    Show,
    /// Change one setting (e.g. "pomodoro_length 50")
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// Restore the default settings
    Reset,
}

pub fn run(action: SettingsAction, config: &Config) -> CliResult {
    let store = SqliteStore::open_default(config)?;

    let settings = match action {
        SettingsAction::Show => store.get_settings()?,
        SettingsAction::Set { key, value } => {
            let update = SettingsUpdate::from_pair(&key, &value)?;
            store.update_settings(&update)?
        }
        SettingsAction::Reset => store.reset_settings()?,
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
