//! `gearguard team` command - Maintenance team management

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::helpers::{clearable, or_dash, AppContext};
use crate::cli::output::{field, print_done, print_list, print_record, print_records, rule};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::RecordId;
use crate::entities::team::{NewTeam, TeamPatch};
use crate::entities::user::User;

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List teams
    List,

    /// Show a team and its members
    Show(IdArgs),

    /// Create a team
    New(NewArgs),

    /// Rename or describe a team
    Edit(EditArgs),

    /// Delete a team, clearing it from members, equipment and requests
    Delete(IdArgs),

    /// List a team's members
    Members(IdArgs),

    /// Move a user into a team
    AddMember(MemberArgs),

    /// Take a user out of a team
    RemoveMember(MemberArgs),
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: RecordId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd', conflicts_with = "clear_description")]
    pub description: Option<String>,

    #[arg(long)]
    pub clear_description: bool,
}

#[derive(clap::Args, Debug)]
pub struct MemberArgs {
    /// Team id
    pub team: RecordId,

    /// User id
    pub user: RecordId,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::List => run_list(global),
        TeamCommands::Show(args) => run_show(args, global),
        TeamCommands::New(args) => run_new(args, global),
        TeamCommands::Edit(args) => run_edit(args, global),
        TeamCommands::Delete(args) => run_delete(args, global),
        TeamCommands::Members(args) => run_members(args, global),
        TeamCommands::AddMember(args) => run_add_member(args, global),
        TeamCommands::RemoveMember(args) => run_remove_member(args, global),
    }
}

#[derive(Tabled, Serialize)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: RecordId,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled, Serialize)]
pub(crate) struct MemberRow {
    #[tabled(rename = "ID")]
    pub id: RecordId,
    #[tabled(rename = "USERNAME")]
    pub username: String,
    #[tabled(rename = "EMAIL")]
    pub email: String,
    #[tabled(rename = "ROLE")]
    pub role: String,
}

impl From<&User> for MemberRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
        }
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let teams = ctx.catalog().list_teams(&session)?;

    print_records(&teams, global.format, |t| TeamRow {
        id: t.id,
        name: t.name.clone(),
        description: or_dash(t.description.as_deref()),
    })
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let catalog = ctx.catalog();
    let team = catalog.team(&session, args.id)?;
    let members = catalog.team_members(&session, args.id)?;

    print_record(&team, global.format, |t| {
        rule();
        field("ID", style(format!("#{}", t.id)).cyan());
        field("Name", style(&t.name).yellow());
        field("Description", or_dash(t.description.as_deref()));
        field("Members", members.len());
        rule();
        for m in &members {
            println!("  {} {} ({})", style(format!("#{}", m.id)).cyan(), m.username, m.role);
        }
    })
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let team = ctx.catalog().create_team(
        &session,
        NewTeam {
            name: args.name,
            description: args.description,
        },
    )?;
    print_done("Created", &team, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let patch = TeamPatch {
        name: args.name,
        description: clearable(args.description, args.clear_description),
    };
    let team = ctx.catalog().update_team(&session, args.id, patch)?;
    print_done("Updated", &team, global.format)
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let detached = ctx.catalog().delete_team(&session, args.id)?;

    println!("{} Deleted team #{}", style("✓").green(), args.id);
    if global.format == OutputFormat::Auto {
        println!(
            "   Cleared from {} member(s), {} equipment and {} request(s)",
            detached.members, detached.equipment, detached.requests
        );
    }
    Ok(())
}

fn run_members(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let members = ctx.catalog().team_members(&session, args.id)?;
    print_list(&members, global.format, "member", |u| u.id, |u| MemberRow::from(u))
}

fn run_add_member(args: MemberArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let user = ctx.catalog().add_member(&session, args.team, args.user)?;
    print_record(&user, global.format, |u| {
        println!(
            "{} {} joined team {}",
            style("✓").green(),
            style(&u.username).cyan(),
            style(format!("#{}", args.team)).cyan()
        );
    })
}

fn run_remove_member(args: MemberArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let user = ctx.catalog().remove_member(&session, args.team, args.user)?;
    print_record(&user, global.format, |u| {
        println!(
            "{} {} left team {}",
            style("✓").green(),
            style(&u.username).cyan(),
            style(format!("#{}", args.team)).cyan()
        );
    })
}
