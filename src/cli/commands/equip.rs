//! `gearguard equip` command - Equipment management

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::commands::req::RequestRow;
use crate::cli::filters::StatusFilter;
use crate::cli::helpers::{clearable, id_ref, or_dash, truncate_str, AppContext};
use crate::cli::output::{field, print_done, print_record, print_records, print_value, rule};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::EquipmentRequests;
use crate::core::entity::{AssetStatus, RecordId};
use crate::entities::equipment::{Equipment, EquipmentFilter, EquipmentPatch, NewEquipment};

#[derive(Subcommand, Debug)]
pub enum EquipCommands {
    /// List equipment
    List(ListArgs),

    /// Show one unit
    Show(IdArgs),

    /// Register a new unit
    New(NewArgs),

    /// Change fields of a unit
    Edit(EditArgs),

    /// Delete a unit with no requests against it
    Delete(IdArgs),

    /// Requests raised against a unit
    Requests(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by operational status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by category id
    #[arg(long, short = 'c')]
    pub category: Option<RecordId>,

    /// Filter by default team id
    #[arg(long, short = 't')]
    pub team: Option<RecordId>,

    /// Filter by department (case-insensitive)
    #[arg(long, short = 'd')]
    pub department: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub name: String,

    /// Serial number, unique across all equipment
    #[arg(long)]
    pub serial: String,

    #[arg(long, short = 'd')]
    pub department: String,

    #[arg(long, short = 'l')]
    pub location: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<RecordId>,

    /// Team assigned to new requests by default
    #[arg(long)]
    pub team: Option<RecordId>,

    /// Technician assigned to new requests by default
    #[arg(long)]
    pub technician: Option<RecordId>,

    #[arg(long, short = 's', default_value = "active")]
    pub status: AssetStatus,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: RecordId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub serial: Option<String>,

    #[arg(long, short = 'd')]
    pub department: Option<String>,

    #[arg(long, short = 'l')]
    pub location: Option<String>,

    #[arg(long, short = 'c', conflicts_with = "clear_category")]
    pub category: Option<RecordId>,

    #[arg(long)]
    pub clear_category: bool,

    #[arg(long, conflicts_with = "clear_team")]
    pub team: Option<RecordId>,

    #[arg(long)]
    pub clear_team: bool,

    #[arg(long, conflicts_with = "clear_technician")]
    pub technician: Option<RecordId>,

    #[arg(long)]
    pub clear_technician: bool,

    #[arg(long, short = 's')]
    pub status: Option<AssetStatus>,

    #[arg(long)]
    pub description: Option<String>,
}

/// Run an equip subcommand
pub fn run(cmd: EquipCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EquipCommands::List(args) => run_list(args, global),
        EquipCommands::Show(args) => run_show(args, global),
        EquipCommands::New(args) => run_new(args, global),
        EquipCommands::Edit(args) => run_edit(args, global),
        EquipCommands::Delete(args) => run_delete(args, global),
        EquipCommands::Requests(args) => run_requests(args, global),
    }
}

#[derive(Tabled, Serialize)]
struct EquipmentRow {
    #[tabled(rename = "ID")]
    id: RecordId,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SERIAL")]
    serial_number: String,
    #[tabled(rename = "DEPARTMENT")]
    department: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TEAM")]
    team: String,
    #[tabled(rename = "TECH")]
    technician: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let filter = EquipmentFilter {
        status: args.status.single(),
        category: args.category,
        team: args.team,
        department: args.department,
    };
    let list = ctx.catalog().list_equipment(&session, &filter)?;

    print_records(&list, global.format, |e| EquipmentRow {
        id: e.id,
        name: truncate_str(&e.name, 30),
        serial_number: e.serial_number.clone(),
        department: e.department.clone(),
        status: e.status.to_string(),
        team: id_ref(e.default_team),
        technician: id_ref(e.default_technician),
    })
}

fn show_equipment(e: &Equipment) {
    rule();
    field("ID", style(format!("#{}", e.id)).cyan());
    field("Name", style(&e.name).yellow());
    field("Serial", &e.serial_number);
    field("Department", &e.department);
    field("Location", or_dash(e.location.as_deref()));
    field("Category", id_ref(e.category));
    field("Status", style(e.status).magenta());
    field("Default team", id_ref(e.default_team));
    field("Default technician", id_ref(e.default_technician));
    rule();
    if let Some(ref description) = e.description {
        println!();
        println!("{}", description);
        println!();
    }
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let equipment = ctx.catalog().equipment(&session, args.id)?;
    print_record(&equipment, global.format, show_equipment)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let equipment = ctx.catalog().create_equipment(
        &session,
        NewEquipment {
            name: args.name,
            serial_number: args.serial,
            location: args.location,
            department: args.department,
            category: args.category,
            default_team: args.team,
            default_technician: args.technician,
            status: args.status,
            description: args.description,
        },
    )?;
    print_done("Created", &equipment, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let patch = EquipmentPatch {
        name: args.name,
        serial_number: args.serial,
        location: args.location.map(Some),
        department: args.department,
        category: clearable(args.category, args.clear_category),
        default_team: clearable(args.team, args.clear_team),
        default_technician: clearable(args.technician, args.clear_technician),
        status: args.status,
        description: args.description.map(Some),
    };
    let equipment = ctx.catalog().update_equipment(&session, args.id, patch)?;
    print_done("Updated", &equipment, global.format)
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    ctx.catalog().delete_equipment(&session, args.id)?;
    println!("{} Deleted equipment #{}", style("✓").green(), args.id);
    Ok(())
}

fn run_requests(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let report = ctx.catalog().equipment_requests(&session, args.id)?;

    match global.format {
        OutputFormat::Auto => show_requests(&report),
        OutputFormat::Json | OutputFormat::Yaml => print_value(&report, global.format, |_| {})?,
        format => print_records(&report.requests, format, |r| RequestRow::from(r))?,
    }
    Ok(())
}

fn show_requests(report: &EquipmentRequests) {
    println!(
        "{} {} - {} open",
        style(&report.equipment.name).yellow(),
        style(format!("#{}", report.equipment.id)).cyan(),
        style(report.open).bold()
    );
    if report.requests.is_empty() {
        println!("No requests found.");
        return;
    }
    let mut table = tabled::Table::new(report.requests.iter().map(RequestRow::from));
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
}
