//! `gearguard req` command - Maintenance request management

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::filters::{PriorityFilter, StageFilter};
use crate::cli::helpers::{
    clearable, id_ref, or_dash, parse_date, parse_datetime, truncate_str, AppContext,
};
use crate::cli::output::{field, print_done, print_list, print_record, print_records, rule};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::calendar::CalendarEvent;
use crate::core::entity::{Priority, RecordId};
use crate::entities::request::{
    Request, RequestDraft, RequestPatch, RequestQuery, RequestType, Stage,
};

#[derive(Subcommand, Debug)]
pub enum ReqCommands {
    /// List requests you can see, with filtering
    List(ListArgs),

    /// Raise a new request
    New(NewArgs),

    /// Show a request's details
    Show(ShowArgs),

    /// Change fields of a request
    Edit(EditArgs),

    /// Move a request to another stage
    Stage(StageArgs),

    /// Delete a request
    Delete(DeleteArgs),

    /// Requests placed on days between two dates
    Calendar(CalendarArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by stage
    #[arg(long, short = 's', default_value = "all")]
    pub stage: StageFilter,

    /// Filter by priority
    #[arg(long, short = 'p', default_value = "all")]
    pub priority: PriorityFilter,

    /// Filter by assigned technician id
    #[arg(long, short = 't')]
    pub technician: Option<RecordId>,

    /// Filter by reporter id
    #[arg(long)]
    pub reporter: Option<RecordId>,

    /// Filter by equipment id
    #[arg(long, short = 'e')]
    pub equipment: Option<RecordId>,

    /// Filter by work center id
    #[arg(long, short = 'w')]
    pub work_center: Option<RecordId>,

    /// First day (YYYY-MM-DD) of the scheduled/created window
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD) of the scheduled/created window
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Skip this many results
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Maximum results to return
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Short summary of the problem or job
    #[arg(long)]
    pub title: String,

    /// Longer description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Equipment id (exactly one of --equipment / --work-center)
    #[arg(long, short = 'e', conflicts_with = "work_center")]
    pub equipment: Option<RecordId>,

    /// Work center id
    #[arg(long, short = 'w')]
    pub work_center: Option<RecordId>,

    /// corrective or preventive
    #[arg(long = "type", short = 't', default_value = "corrective")]
    pub request_type: RequestType,

    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,

    /// When the work is planned (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_datetime)]
    pub scheduled: Option<DateTime<Utc>>,

    /// Expected duration in minutes
    #[arg(long, default_value = "0")]
    pub duration: u32,

    /// Technician id; defaults to the equipment's technician
    #[arg(long)]
    pub technician: Option<RecordId>,

    /// Team id; defaults to the equipment's team
    #[arg(long)]
    pub team: Option<RecordId>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: RecordId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    #[arg(long = "type", short = 't')]
    pub request_type: Option<RequestType>,

    #[arg(long, value_parser = parse_datetime, conflicts_with = "clear_scheduled")]
    pub scheduled: Option<DateTime<Utc>>,

    /// Remove the scheduled date
    #[arg(long)]
    pub clear_scheduled: bool,

    #[arg(long)]
    pub duration: Option<u32>,

    /// Move the request to this equipment
    #[arg(long, short = 'e', conflicts_with = "work_center")]
    pub equipment: Option<RecordId>,

    /// Move the request to this work center
    #[arg(long, short = 'w')]
    pub work_center: Option<RecordId>,

    #[arg(long, conflicts_with = "clear_technician")]
    pub technician: Option<RecordId>,

    /// Unassign the technician
    #[arg(long)]
    pub clear_technician: bool,

    #[arg(long, conflicts_with = "clear_team")]
    pub team: Option<RecordId>,

    /// Unassign the team
    #[arg(long)]
    pub clear_team: bool,

    /// Fill technician/team not given here from the equipment defaults
    #[arg(long)]
    pub reassign: bool,
}

#[derive(clap::Args, Debug)]
pub struct StageArgs {
    pub id: RecordId,

    /// new, in-progress, repaired or scrap
    pub stage: Stage,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub id: RecordId,
}

#[derive(clap::Args, Debug)]
pub struct CalendarArgs {
    /// First day (YYYY-MM-DD); defaults to the first of this month
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD); defaults to the last of the month of --from
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

/// Run a req subcommand
pub fn run(cmd: ReqCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReqCommands::List(args) => run_list(args, global),
        ReqCommands::New(args) => run_new(args, global),
        ReqCommands::Show(args) => run_show(args, global),
        ReqCommands::Edit(args) => run_edit(args, global),
        ReqCommands::Stage(args) => run_stage(args, global),
        ReqCommands::Delete(args) => run_delete(args, global),
        ReqCommands::Calendar(args) => run_calendar(args, global),
    }
}

#[derive(Tabled, Serialize)]
pub(crate) struct RequestRow {
    #[tabled(rename = "ID")]
    pub id: RecordId,
    #[tabled(rename = "TITLE")]
    pub title: String,
    #[tabled(rename = "TARGET")]
    pub target: String,
    #[tabled(rename = "TYPE")]
    pub request_type: String,
    #[tabled(rename = "PRIORITY")]
    pub priority: String,
    #[tabled(rename = "STAGE")]
    pub stage: String,
    #[tabled(rename = "TECH")]
    pub technician: String,
    #[tabled(rename = "DATE")]
    pub date: String,
}

impl From<&Request> for RequestRow {
    fn from(r: &Request) -> Self {
        Self {
            id: r.id,
            title: truncate_str(&r.title, 36),
            target: r.target.to_string(),
            request_type: r.request_type.to_string(),
            priority: r.priority.to_string(),
            stage: r.stage.to_string(),
            technician: id_ref(r.technician),
            date: r.anchor_date().format("%Y-%m-%d").to_string(),
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;

    let query = RequestQuery {
        technician: args.technician,
        reporter: args.reporter,
        stage: args.stage.single(),
        priority: args.priority.single(),
        equipment: args.equipment,
        work_center: args.work_center,
        from: args.from,
        to: args.to,
        offset: args.offset,
        limit: args.limit,
    };
    let requests: Vec<Request> = ctx
        .requests()
        .list(&session, query)?
        .into_iter()
        .filter(|r| args.stage.matches(&r.stage) && args.priority.matches(&r.priority))
        .collect();

    print_records(&requests, global.format, |r| RequestRow::from(r))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;

    let request = ctx.requests().create(
        &session,
        RequestDraft {
            title: args.title,
            description: args.description,
            equipment: args.equipment,
            work_center: args.work_center,
            request_type: args.request_type,
            priority: args.priority,
            scheduled_date: args.scheduled,
            duration_minutes: args.duration,
            technician: args.technician,
            team: args.team,
        },
    )?;

    print_done("Created", &request, global.format)?;
    if global.format == OutputFormat::Auto {
        println!(
            "   {} | technician {} | team {}",
            request.target,
            id_ref(request.technician),
            id_ref(request.team)
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let manager = ctx.requests();
    let request = manager.get(&session, args.id)?;
    let next = manager.allowed_transitions(&session, request.id)?;

    print_record(&request, global.format, |r| {
        rule();
        field("ID", style(format!("#{}", r.id)).cyan());
        field("Title", style(&r.title).yellow());
        field("Target", r.target);
        field("Type", r.request_type);
        field("Priority", r.priority);
        field("Stage", style(r.stage).magenta());
        field("Reporter", format!("#{}", r.reporter));
        field("Technician", id_ref(r.technician));
        field("Team", id_ref(r.team));
        field(
            "Scheduled",
            or_dash(r.scheduled_date.map(|d| d.format("%Y-%m-%d %H:%M"))),
        );
        if r.duration_minutes > 0 {
            field("Duration", format!("{} min", r.duration_minutes));
        }
        if let Some(started) = r.started_at {
            field("Started", started.format("%Y-%m-%d %H:%M"));
        }
        if let Some(completed) = r.completed_at {
            field("Completed", completed.format("%Y-%m-%d %H:%M"));
        }
        rule();
        if !r.description.is_empty() {
            println!();
            println!("{}", r.description);
            println!();
            rule();
        }
        let next: Vec<&str> = next.iter().map(|s| s.as_str()).collect();
        println!(
            "{}: {} | {}: {}",
            style("Created").dim(),
            r.created_at.format("%Y-%m-%d %H:%M"),
            style("Next stages").dim(),
            if next.is_empty() {
                "none".to_string()
            } else {
                next.join(", ")
            }
        );
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;

    let scheduled_date = match (args.scheduled, args.clear_scheduled) {
        (Some(date), _) => Some(Some(date)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let (equipment, work_center) = match (args.equipment, args.work_center) {
        (Some(id), _) => (Some(Some(id)), Some(None)),
        (None, Some(id)) => (Some(None), Some(Some(id))),
        (None, None) => (None, None),
    };

    let patch = RequestPatch {
        title: args.title,
        description: args.description,
        priority: args.priority,
        request_type: args.request_type,
        scheduled_date,
        duration_minutes: args.duration,
        equipment,
        work_center,
        technician: clearable(args.technician, args.clear_technician),
        team: clearable(args.team, args.clear_team),
        reassign: args.reassign,
    };
    let request = ctx.requests().update(&session, args.id, patch)?;
    print_done("Updated", &request, global.format)
}

fn run_stage(args: StageArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let request = ctx.requests().transition_stage(&session, args.id, args.stage)?;

    print_record(&request, global.format, |r| {
        println!(
            "{} Request {} is now {}",
            style("✓").green(),
            style(format!("#{}", r.id)).cyan(),
            style(r.stage).magenta()
        );
    })
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    ctx.requests().delete(&session, args.id)?;
    println!("{} Deleted request #{}", style("✓").green(), args.id);
    Ok(())
}

#[derive(Tabled, Serialize)]
struct EventRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "ID")]
    id: RecordId,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "TYPE")]
    request_type: String,
    #[tabled(rename = "PRIORITY")]
    priority: String,
    #[tabled(rename = "STAGE")]
    stage: String,
}

fn run_calendar(args: CalendarArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;

    let start = args.from.unwrap_or_else(|| {
        let today = Utc::now().date_naive();
        today.with_day(1).unwrap_or(today)
    });
    let end = args.to.unwrap_or_else(|| last_day_of_month(start));
    let events = ctx.calendar().project(&session, start, end)?;

    print_list(
        &events,
        global.format,
        "event",
        |e: &CalendarEvent| e.request_id,
        |e| EventRow {
            date: if e.scheduled {
                e.date.format("%Y-%m-%d %H:%M").to_string()
            } else {
                format!("{} (created)", e.date.format("%Y-%m-%d"))
            },
            id: e.request_id,
            title: truncate_str(&e.title, 36),
            request_type: e.request_type.to_string(),
            priority: e.priority.to_string(),
            stage: e.stage.to_string(),
        },
    )
}

fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(day)
}
