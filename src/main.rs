use clap::Parser;
use gearguard::cli::commands::{
    access, auth, cat, completions, equip, init, req, stats, team, user, wc,
};
use gearguard::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "GEARGUARD_LOG";

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // Logs go to stderr so piped output stays clean
    let default_level = match cli.global.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => init::run(args, global),
        Commands::Register(args) => auth::run_register(args, global),
        Commands::Login(args) => auth::run_login(args, global),
        Commands::Whoami => auth::run_whoami(global),
        Commands::Access(args) => access::run(args, global),
        Commands::Req(cmd) => req::run(cmd, global),
        Commands::Equip(cmd) => equip::run(cmd, global),
        Commands::Wc(cmd) => wc::run(cmd, global),
        Commands::Team(cmd) => team::run(cmd, global),
        Commands::Cat(cmd) => cat::run(cmd, global),
        Commands::User(cmd) => user::run(cmd, global),
        Commands::Stats => stats::run(global),
        Commands::Completions(args) => completions::run(args),
    }
}
