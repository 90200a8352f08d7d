use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "miqat",
    version,
    author,
    about = "A terminal new-tab companion: prayer times, azan alerts, verses and recitation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and the countdown to the next prayer
    Times,
    /// Print a random verse with its translation
    Verse {
        /// Translation edition (defaults to the stored setting)
        #[arg(long)]
        edition: Option<String>,
    },
    /// Location used for prayer times
    Location {
        #[command(subcommand)]
        action: LocationCommands,
    },
    /// Per-prayer azan notifications
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
    /// Dashboard settings shared by every open dashboard
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Focus mode silences azan alerts in every dashboard
    Focus {
        #[command(subcommand)]
        action: FocusCommands,
    },
    /// Dismiss the azan alert shown in every dashboard
    Dismiss,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// Detect the location automatically
    Detect,
    /// Set the location from a city or address
    Set {
        /// City or address, e.g. "Cairo, Egypt"
        #[arg(num_args = 1.., required = true)]
        query: Vec<String>,
    },
    /// Show the stored location
    Show,
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// Show which prayers raise an azan alert
    List,
    /// Turn the alert for one prayer on or off
    Toggle {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name, e.g. clock_format
        field: String,
        /// New value
        value: String,
    },
    /// Restore every setting to its default
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum FocusCommands {
    /// Take a break from azan alerts
    Start,
    /// End the break
    End,
}
