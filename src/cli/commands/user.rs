//! `gearguard user` command - Account administration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::auth::show_user;
use crate::cli::commands::team::MemberRow;
use crate::cli::filters::RoleFilter;
use crate::cli::helpers::{clearable, AppContext};
use crate::cli::output::{print_done, print_list, print_record};
use crate::cli::GlobalOpts;
use crate::core::entity::RecordId;
use crate::entities::user::{Role, UserFilter, UserPatch};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List accounts
    List(ListArgs),

    /// Show one account
    Show(IdArgs),

    /// Change role, team or profile labels
    Edit(EditArgs),

    /// Delete an account nothing refers to
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 'r', default_value = "all")]
    pub role: RoleFilter,

    /// Members of this team only
    #[arg(long, short = 't')]
    pub team: Option<RecordId>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: RecordId,

    #[arg(long, short = 'r')]
    pub role: Option<Role>,

    #[arg(long, short = 't', conflicts_with = "clear_team")]
    pub team: Option<RecordId>,

    #[arg(long)]
    pub clear_team: bool,

    #[arg(long, conflicts_with = "clear_department")]
    pub department: Option<String>,

    #[arg(long)]
    pub clear_department: bool,

    #[arg(long, conflicts_with = "clear_company")]
    pub company: Option<String>,

    #[arg(long)]
    pub clear_company: bool,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::List(args) => run_list(args, global),
        UserCommands::Show(args) => run_show(args, global),
        UserCommands::Edit(args) => run_edit(args, global),
        UserCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let filter = UserFilter {
        role: args.role.single(),
        team: args.team,
    };
    let users = ctx.catalog().list_users(&session, &filter)?;
    print_list(&users, global.format, "user", |u| u.id, |u| MemberRow::from(u))
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let user = ctx.catalog().user(&session, args.id)?;
    print_record(&user, global.format, show_user)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let patch = UserPatch {
        role: args.role,
        team: clearable(args.team, args.clear_team),
        department: clearable(args.department, args.clear_department),
        company: clearable(args.company, args.clear_company),
    };
    let user = ctx.catalog().update_user(&session, args.id, patch)?;
    print_done("Updated", &user, global.format)
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    ctx.catalog().delete_user(&session, args.id)?;
    println!("{} Deleted user #{}", style("✓").green(), args.id);
    Ok(())
}
