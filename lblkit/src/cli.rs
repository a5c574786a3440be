use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lblkit - build and provision the LBLRTM radiative-transfer toolchain
#[derive(Parser, Debug)]
#[command(name = "lblkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Install root holding the vendor archives, build trees and run
    /// directories (default: LBLKIT_ROOT, then the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the whole pipeline: build the solvers, generate the line
    /// database, provision run directories and advertise the install root
    Setup {
        /// Starting wavelength of the line database window, in nm
        #[arg(long, value_name = "NM")]
        wave_start: Option<f64>,

        /// Ending wavelength of the line database window, in nm
        #[arg(long, value_name = "NM")]
        wave_end: Option<f64>,

        /// How many run directories to provision
        #[arg(long, value_name = "N")]
        rundirs: Option<usize>,

        /// Directory holding the per-run template files (default: <root>/data)
        #[arg(long, value_name = "DIR")]
        template_dir: Option<PathBuf>,

        /// Append the export line to the shell profile and export it
        #[arg(long)]
        apply_env: bool,

        /// Shell profile receiving the export line (default: ~/.bashrc)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },

    /// Verify compiler, archives and templates without touching anything
    Check {
        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Unpack the vendor archives and compile the LNFL and LBLRTM solvers
    Build,

    /// Generate the static line database (TAPE3) with LNFL
    Tape3 {
        /// Starting wavelength of the window, in nm
        #[arg(long, value_name = "NM")]
        wave_start: Option<f64>,

        /// Ending wavelength of the window, in nm
        #[arg(long, value_name = "NM")]
        wave_end: Option<f64>,
    },

    /// Create or refresh the isolated run directories
    Rundirs {
        /// How many run directories to provision
        #[arg(long, short = 'n', value_name = "N")]
        count: Option<usize>,

        /// Directory holding the per-run template files (default: <root>/data)
        #[arg(long, value_name = "DIR")]
        template_dir: Option<PathBuf>,

        /// Print the provisioned directories as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the TELLURICMODELING export line for downstream tools
    Env {
        /// Append the line to the shell profile (once) and export it
        #[arg(long)]
        apply: bool,

        /// Shell profile receiving the export line (default: ~/.bashrc)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },
}
