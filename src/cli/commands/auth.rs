//! `gearguard register`, `login` and `whoami` commands

use console::style;
use miette::Result;

use crate::cli::helpers::{id_ref, or_dash, password_or_prompt, AppContext};
use crate::cli::output::{field, print_done, print_record, print_value, rule};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::RecordId;
use crate::core::session::Registration;
use crate::entities::user::{Role, User};

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Login name
    pub username: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted for when omitted)
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Requested role; the project policy may pin it
    #[arg(long, short = 'r')]
    pub role: Option<Role>,

    /// Team id to join
    #[arg(long)]
    pub team: Option<RecordId>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub company: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Login name
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(long, short = 'p')]
    pub password: Option<String>,
}

pub fn run_register(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let password = password_or_prompt(args.password, true)?;

    let user = ctx.auth().register(Registration {
        username: args.username,
        email: args.email,
        password,
        role: args.role,
        team: args.team,
        department: args.department,
        company: args.company,
    })?;

    print_done("Registered", &user, global.format)?;
    if global.format == OutputFormat::Auto {
        println!("   Role: {}", style(user.role).magenta());
    }
    Ok(())
}

/// Prints the token; `-f id` prints nothing else so it can be captured
pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let password = password_or_prompt(args.password, false)?;
    let login = ctx.auth().login(&args.username, &password)?;

    match global.format {
        OutputFormat::Id => println!("{}", login.access_token),
        format => print_value(&login, format, |login| {
            println!(
                "{} Logged in as {} ({})",
                style("✓").green(),
                style(&login.user.username).cyan(),
                login.user.role
            );
            println!();
            println!("export GEARGUARD_TOKEN={}", login.access_token);
        })?,
    }
    Ok(())
}

pub fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::open(global)?;
    let session = ctx.session(global)?;
    let user = ctx.catalog().me(&session)?;
    print_record(&user, global.format, show_user)
}

/// Detail view shared with `gearguard user show`
pub fn show_user(user: &User) {
    rule();
    field("ID", style(format!("#{}", user.id)).cyan());
    field("Username", style(&user.username).yellow());
    field("Email", &user.email);
    field("Role", style(user.role).magenta());
    field("Team", id_ref(user.team));
    field("Department", or_dash(user.department.as_deref()));
    field("Company", or_dash(user.company.as_deref()));
    rule();
    println!(
        "{}: {}",
        style("Created").dim(),
        user.created_at.format("%Y-%m-%d %H:%M")
    );
}
