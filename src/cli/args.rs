//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    access::AccessArgs,
    auth::{LoginArgs, RegisterArgs},
    cat::CatCommands,
    completions::CompletionsArgs,
    equip::EquipCommands,
    init::InitArgs,
    req::ReqCommands,
    team::TeamCommands,
    user::UserCommands,
    wc::WcCommands,
};

#[derive(Parser, Debug)]
#[command(name = "gearguard")]
#[command(author, version, about = "Maintenance request tracking for equipment and work centers")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Run as if started in this directory
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Session token from `gearguard login`
    #[arg(long, global = true, env = "GEARGUARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output formats
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, key/value for single records
    #[default]
    Auto,
    Json,
    Yaml,
    Csv,
    /// Record ids only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a GearGuard project in the current directory
    Init(InitArgs),

    /// Create a user account
    Register(RegisterArgs),

    /// Log in and print a session token
    Login(LoginArgs),

    /// Show who the current token belongs to
    Whoami,

    /// Show what a role may do
    Access(AccessArgs),

    /// Maintenance requests
    #[command(subcommand)]
    Req(ReqCommands),

    /// Equipment
    #[command(subcommand)]
    Equip(EquipCommands),

    /// Work centers
    #[command(subcommand)]
    Wc(WcCommands),

    /// Maintenance teams
    #[command(subcommand)]
    Team(TeamCommands),

    /// Equipment categories
    #[command(subcommand)]
    Cat(CatCommands),

    /// User accounts
    #[command(subcommand)]
    User(UserCommands),

    /// Dashboard statistics for the current user
    Stats,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
