//! `gearguard wc` command - Work center management

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::helpers::{clearable, or_dash, truncate_str, AppContext};
use crate::cli::output::{field, print_done, print_record, print_records, rule};
use crate::cli::GlobalOpts;
use crate::core::entity::{AssetStatus, RecordId};
use crate::entities::work_center::{NewWorkCenter, WorkCenterPatch, DEFAULT_OEE_TARGET};

#[derive(Subcommand, Debug)]
pub enum WcCommands {
    /// List work centers
    List,

    /// Show one work center
    Show(IdArgs),

    /// Create a work center
    New(NewArgs),

    /// Change fields of a work center
    Edit(EditArgs),

    /// Delete a work center with no requests against it
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

    /// Short unique code, e.g. ASM-01
    #[arg(long)]
    pub code: String,

    #[arg(long, short = 'd')]
    pub department: String,

    #[arg(long, short = 'l')]
    pub location: Option<String>,

    #[arg(long, short = 's', default_value = "active")]
    pub status: AssetStatus,

    /// Parallel jobs the center can run
    #[arg(long, default_value = "1")]
    pub capacity: u32,

    #[arg(long, default_value = "0")]
    pub cost_per_hour: u32,

    /// Overall equipment effectiveness target, 0-100
    #[arg(long, default_value_t = DEFAULT_OEE_TARGET)]
    pub oee_target: u8,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: RecordId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long, short = 'd')]
    pub department: Option<String>,

    #[arg(long, short = 'l', conflicts_with = "clear_location")]
    pub location: Option<String>,

    #[arg(long)]
    pub clear_location: bool,

    #[arg(long, short = 's')]
    pub status: Option<AssetStatus>,

    #[arg(long)]
    pub capacity: Option<u32>,

    #[arg(long)]
    pub cost_per_hour: Option<u32>,

    #[arg(long)]
    pub oee_target: Option<u8>,
}

pub fn run(cmd: WcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WcCommands::List => run_list(global),
        WcCommands::Show(args) => run_show(args, global),
        WcCommands::New(args) => run_new(args, global),
        WcCommands::Edit(args) => run_edit(args, global),
        WcCommands::Delete(args) => run_delete(args, global),
    }
}

#[derive(Tabled, Serialize)]
struct WorkCenterRow {
    #[tabled(rename = "ID")]
    id: RecordId,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DEPARTMENT")]
    department: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "OEE %")]
    oee_target: u8,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let list = ctx.catalog().list_work_centers(&session)?;

    print_records(&list, global.format, |wc| WorkCenterRow {
        id: wc.id,
        code: wc.code.clone(),
        name: truncate_str(&wc.name, 30),
        department: wc.department.clone(),
        status: wc.status.to_string(),
        oee_target: wc.oee_target,
    })
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let wc = ctx.catalog().work_center(&session, args.id)?;

    print_record(&wc, global.format, |wc| {
        rule();
        field("ID", style(format!("#{}", wc.id)).cyan());
        field("Code", style(&wc.code).cyan());
        field("Name", style(&wc.name).yellow());
        field("Department", &wc.department);
        field("Location", or_dash(wc.location.as_deref()));
        field("Status", style(wc.status).magenta());
        field("Capacity", wc.capacity);
        field("Cost per hour", wc.cost_per_hour);
        field("OEE target", format!("{}%", wc.oee_target));
        rule();
    })
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let wc = ctx.catalog().create_work_center(
        &session,
        NewWorkCenter {
            name: args.name,
            code: args.code,
            department: args.department,
            location: args.location,
            status: args.status,
            capacity: args.capacity,
            cost_per_hour: args.cost_per_hour,
            oee_target: args.oee_target,
        },
    )?;
    print_done("Created", &wc, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let patch = WorkCenterPatch {
        name: args.name,
        code: args.code,
        department: args.department,
        location: clearable(args.location, args.clear_location),
        status: args.status,
        capacity: args.capacity,
        cost_per_hour: args.cost_per_hour,
        oee_target: args.oee_target,
    };
    let wc = ctx.catalog().update_work_center(&session, args.id, patch)?;
    print_done("Updated", &wc, global.format)
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    ctx.catalog().delete_work_center(&session, args.id)?;
    println!("{} Deleted work center #{}", style("✓").green(), args.id);
    Ok(())
}
