//! Command-line surface of `rdesk`.
mod commands;
mod print;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

pub use commands::run;

use crate::filter::CountFilter;
use crate::model::{Priority, PropertyStatus, RequirementStatus, Role, SourceType};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rdesk",
    version,
    about = "Real-estate listing desk: property codes, filters, suggestions and share text"
)]
pub struct Cli {
    /// Database URL (sqlite://path?mode=rwc)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Project root holding .rdesk/ (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    /// Log level or filter directive (error,warn,info,debug,trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create or upgrade the database schema
    Migrate,
    /// Run the property webhook server
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8787
        #[arg(long)]
        listen: Option<String>,
    },
    /// List properties matching the given filters
    Properties(PropertyFilterArgs),
    /// Ranked autosuggest entries for a search prefix
    Suggest {
        query: String,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Render the share text of a property (or requirement)
    Share {
        id: Uuid,
        /// WhatsApp formatting (bold labels, hashtags)
        #[arg(long, action = ArgAction::SetTrue)]
        whatsapp: bool,
        /// Print a wa.me link instead of the text
        #[arg(long, action = ArgAction::SetTrue)]
        url: bool,
        /// Treat the id as a requirement id
        #[arg(long, action = ArgAction::SetTrue)]
        requirement: bool,
    },
    /// Propose a free property code for a code type such as "New Apartment"
    Code { code_type: String },
    /// List customer requirements matching the given filters
    Requirements(RequirementFilterArgs),
    /// Dashboard totals
    Stats {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Issue a session token for a profile
    Token { profile_id: Uuid },
    /// Upload an image and attach it to a property
    Upload {
        property_id: Uuid,
        file: PathBuf,
        /// Acting profile
        #[arg(long = "as")]
        actor: Uuid,
    },
    /// Manage agent and admin profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PropertyFilterArgs {
    #[arg(long)]
    pub status: Option<PropertyStatus>,
    /// Property code type, e.g. "Old House"
    #[arg(long = "type")]
    pub code_type: Option<String>,
    #[arg(long)]
    pub source: Option<SourceType>,
    #[arg(long)]
    pub project: Option<Uuid>,
    /// Exact count, or N+ for at least N
    #[arg(long)]
    pub bedrooms: Option<CountFilter>,
    #[arg(long)]
    pub bathrooms: Option<CountFilter>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    #[arg(long)]
    pub min_area: Option<f64>,
    #[arg(long)]
    pub max_area: Option<f64>,
    #[arg(long)]
    pub min_price_per_sqft: Option<f64>,
    #[arg(long)]
    pub max_price_per_sqft: Option<f64>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RequirementFilterArgs {
    #[arg(long)]
    pub status: Option<RequirementStatus>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long = "type")]
    pub property_type: Option<String>,
    #[arg(long)]
    pub agent: Option<Uuid>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub unassigned: bool,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// List profiles
    List {
        #[arg(long)]
        role: Option<Role>,
    },
    /// Add a profile; the first admin may be added without --as
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "agent")]
        role: Role,
        #[arg(long = "as")]
        actor: Option<Uuid>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "as")]
        actor: Uuid,
    },
    /// Delete a project and its properties
    Delete {
        id: Uuid,
        #[arg(long = "as")]
        actor: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_property_filters() {
        let cli = Cli::parse_from([
            "rdesk",
            "--log-level",
            "debug",
            "properties",
            "--status",
            "available",
            "--type",
            "Old House",
            "--bedrooms",
            "4+",
            "--max-price",
            "450000",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Command::Properties(args) = cli.command else {
            panic!("expected properties");
        };
        assert_eq!(args.status, Some(PropertyStatus::Available));
        assert_eq!(args.code_type.as_deref(), Some("Old House"));
        assert_eq!(args.bedrooms, Some(CountFilter::AtLeast(4)));
        assert_eq!(args.max_price, Some(450000.0));
    }

    #[test]
    fn parses_share_and_profiles() {
        let id = Uuid::new_v4();
        let id = id.to_string();
        let cli = Cli::parse_from(["rdesk", "share", id.as_str(), "--whatsapp", "--url"]);
        assert!(matches!(
            cli.command,
            Command::Share { whatsapp: true, url: true, requirement: false, .. }
        ));

        let cli = Cli::parse_from([
            "rdesk", "profiles", "add", "--name", "Root", "--email", "r@x.io", "--role", "admin",
        ]);
        assert!(matches!(
            cli.command,
            Command::Profiles {
                command: ProfileCommand::Add { role: Role::Admin, actor: None, .. }
            }
        ));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["rdesk", "stats", "--database-url", "sqlite::memory:"]);
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        assert!(matches!(cli.command, Command::Stats { json: false }));
    }
}
