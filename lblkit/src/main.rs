mod cli;
mod commands;
mod observability;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();
    let root = cli.root;

    match cli.command {
        Commands::Setup {
            wave_start,
            wave_end,
            rundirs,
            template_dir,
            apply_env,
            profile,
        } => {
            commands::setup::cmd_setup(
                root,
                wave_start,
                wave_end,
                rundirs,
                template_dir,
                apply_env,
                profile,
            )?;
        }
        Commands::Check { json } => commands::check::cmd_check(root, json)?,
        Commands::Build => commands::build::cmd_build(root)?,
        Commands::Tape3 {
            wave_start,
            wave_end,
        } => commands::tape3::cmd_tape3(root, wave_start, wave_end)?,
        Commands::Rundirs {
            count,
            template_dir,
            json,
        } => commands::rundirs::cmd_rundirs(root, count, template_dir, json)?,
        Commands::Env { apply, profile } => commands::env::cmd_env(root, apply, profile)?,
    }
    Ok(())
}
