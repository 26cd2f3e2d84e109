//! `gearguard stats` command - Dashboard numbers for the current user

use console::style;
use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::AppContext;
use crate::cli::output::{field, print_value, rule};
use crate::cli::GlobalOpts;
use crate::core::stats::{DashboardStats, Stats, TechnicianStats};

#[derive(Tabled)]
struct LoadRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TECHNICIAN")]
    username: String,
    #[tabled(rename = "OPEN")]
    open: usize,
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let stats = ctx.stats().stats(&session)?;

    print_value(&stats, global.format, |stats| match stats {
        Stats::Global(dashboard) => show_dashboard(dashboard),
        Stats::Technician(mine) => show_technician(mine),
    })
}

fn show_dashboard(stats: &DashboardStats) {
    rule();
    field(
        "Critical equipment",
        format!(
            "{} {}",
            style(stats.critical_equipment.count).red().bold(),
            stats.critical_equipment.label
        ),
    );
    field(
        "Technician load",
        format!(
            "{} {}",
            style(&stats.technician_load.label).yellow(),
            style(&stats.technician_load.details).dim()
        ),
    );
    field(
        "Open requests",
        format!(
            "{} {}",
            style(stats.open_requests.count).cyan().bold(),
            stats.open_requests.label
        ),
    );
    rule();

    let load = &stats.technician_load;
    if load.breakdown.is_empty() {
        println!("{}", style("No technicians registered.").dim());
        return;
    }
    let mut table = Table::new(load.breakdown.iter().map(|t| LoadRow {
        id: format!("#{}", t.technician),
        username: t.username.clone(),
        open: t.open,
    }));
    table.with(Style::rounded());
    println!("{}", table);
    if load.unassigned > 0 {
        println!(
            "{} open request(s) have no technician",
            style(load.unassigned).yellow()
        );
    }
}

fn show_technician(stats: &TechnicianStats) {
    rule();
    field("Assigned to me", style(stats.assigned).cyan().bold());
    field("Completed", style(stats.completed).green().bold());
    rule();
}
