//! `gearguard cat` command - Equipment categories

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::helpers::{clearable, or_dash, AppContext};
use crate::cli::output::{print_done, print_records};
use crate::cli::GlobalOpts;
use crate::core::entity::RecordId;
use crate::entities::category::{CategoryPatch, NewCategory};

#[derive(Subcommand, Debug)]
pub enum CatCommands {
    /// List categories
    List,

    /// Create a category
    New(NewArgs),

    /// Rename or describe a category
    Edit(EditArgs),

    /// Delete a category; its equipment becomes uncategorized
    Delete(IdArgs),
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

pub fn run(cmd: CatCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatCommands::List => run_list(global),
        CatCommands::New(args) => run_new(args, global),
        CatCommands::Edit(args) => run_edit(args, global),
        CatCommands::Delete(args) => run_delete(args, global),
    }
}

#[derive(Tabled, Serialize)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: RecordId,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let categories = ctx.catalog().list_categories(&session)?;
    print_records(&categories, global.format, |c| CategoryRow {
        id: c.id,
        name: c.name.clone(),
        description: or_dash(c.description.as_deref()),
    })
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let category = ctx.catalog().create_category(
        &session,
        NewCategory {
            name: args.name,
            description: args.description,
        },
    )?;
    print_done("Created", &category, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let patch = CategoryPatch {
        name: args.name,
        description: clearable(args.description, args.clear_description),
    };
    let category = ctx.catalog().update_category(&session, args.id, patch)?;
    print_done("Updated", &category, global.format)
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let detached = ctx.catalog().delete_category(&session, args.id)?;
    println!(
        "{} Deleted category #{} ({} equipment uncategorized)",
        style("✓").green(),
        args.id,
        detached
    );
    Ok(())
}
