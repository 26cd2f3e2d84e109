//! `gearguard access` command - Show the permission matrix for a role

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::AppContext;
use crate::cli::output::print_value;
use crate::cli::GlobalOpts;
use crate::core::authz::{Action, AuthorizationMatrix, ResourceKind, Scope};
use crate::entities::user::Role;

#[derive(clap::Args, Debug)]
pub struct AccessArgs {
    /// Role to show (defaults to the logged-in user's role)
    #[arg(long, short = 'r')]
    pub role: Option<Role>,
}

/// What a role may do with one kind of resource
#[derive(Debug, Serialize)]
struct Grant {
    resource: ResourceKind,
    actions: Vec<Action>,
    scope: Scope,
}

#[derive(Debug, Serialize)]
struct AccessReport {
    role: Role,
    grants: Vec<Grant>,
}

pub fn run(args: AccessArgs, global: &GlobalOpts) -> Result<()> {
    let role = match args.role {
        Some(role) => role,
        None => {
            let ctx = AppContext::open(global)?;
            ctx.session(global)?.role
        }
    };

    let matrix = AuthorizationMatrix::standard();
    let report = AccessReport {
        role,
        grants: ResourceKind::ALL
            .into_iter()
            .map(|resource| Grant {
                resource,
                actions: matrix.allowed_actions(role, resource),
                scope: matrix.scope(role, resource),
            })
            .collect(),
    };

    print_value(&report, global.format, |report| {
        println!("{} {}", style("Access for").bold(), style(report.role).magenta());
        println!();
        for grant in &report.grants {
            let actions = if grant.actions.is_empty() {
                style("none".to_string()).dim().to_string()
            } else {
                grant
                    .actions
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let scope = match grant.scope {
                Scope::All => String::new(),
                scope => format!(" {}", style(format!("({})", scope)).yellow()),
            };
            println!(
                "  {} {}{}",
                style(format!("{:<12}", grant.resource.as_str())).cyan(),
                actions,
                scope
            );
        }
    })
}
