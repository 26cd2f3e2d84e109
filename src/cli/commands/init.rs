//! `gearguard init` command - Project initialization

use console::style;
use miette::Result;

use crate::cli::helpers::start_dir;
use crate::cli::GlobalOpts;
use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {}

pub fn run(_args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let root = start_dir(global)?;
    let project = Project::init(&root).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized GearGuard project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();
    println!("Created:");
    println!("  {}", project.config_path().display());
    println!();
    println!("Next steps:");
    println!("  gearguard register <username> --email <email> --role admin");
    println!("  export GEARGUARD_TOKEN=$(gearguard login <username> -f id)");
    println!("  gearguard equip new --name <name> --serial <serial> --department <dept>");
    Ok(())
}
