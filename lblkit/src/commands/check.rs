//! `lblkit check`: preflight without touching anything.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use lblkit_core::config::SetupConfig;
use lblkit_core::spectral::SpectralRange;
use lblkit_provision::artifacts::SOURCE_ARCHIVES;
use lblkit_provision::compiler::{self, CompilerProfile};
use lblkit_provision::process::SystemRunner;
use lblkit_provision::rundir::TEMPLATE_FILES;

#[derive(Debug, Serialize)]
struct CheckReport {
    root: String,
    compiler: Option<CompilerProfile>,
    compiler_token: Option<String>,
    compiler_error: Option<String>,
    range: SpectralRange,
    wavenumber_bounds: (f64, f64),
    archives: Vec<FileStatus>,
    templates: Vec<FileStatus>,
    ready: bool,
}

#[derive(Debug, Serialize)]
struct FileStatus {
    name: String,
    present: bool,
}

pub fn cmd_check(root: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = SetupConfig::from_env().with_cli_overrides(root, None, None, None, None)?;
    let runner = SystemRunner;

    let (compiler, compiler_error) = match compiler::resolve_host(&runner) {
        Ok(profile) => (Some(profile), None),
        Err(err) => (None, Some(err.to_string())),
    };

    let archives: Vec<FileStatus> = SOURCE_ARCHIVES
        .iter()
        .map(|name| FileStatus {
            name: name.to_string(),
            present: cfg.root.join(name).exists(),
        })
        .collect();

    let template_dir = cfg.templates();
    let templates: Vec<FileStatus> = TEMPLATE_FILES
        .iter()
        .map(|name| FileStatus {
            name: name.to_string(),
            present: template_dir.join(name).exists(),
        })
        .collect();

    let ready = compiler.is_some()
        && archives.iter().all(|status| status.present)
        && templates.iter().all(|status| status.present);

    let report = CheckReport {
        root: cfg.root.display().to_string(),
        compiler_token: compiler.as_ref().map(|profile| profile.token()),
        compiler,
        compiler_error,
        range: cfg.range,
        wavenumber_bounds: cfg.range.wavenumber_bounds(),
        archives,
        templates,
        ready,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if !report.ready {
        anyhow::bail!("preflight found problems");
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    eprintln!("🔍 Preflight for {}", report.root);
    match &report.compiler_token {
        Some(token) => eprintln!("  ✓ compiler: {}", token),
        None => eprintln!(
            "  ✗ compiler: {}",
            report.compiler_error.as_deref().unwrap_or("unknown")
        ),
    }
    for status in &report.archives {
        print_status("archive", status);
    }
    for status in &report.templates {
        print_status("template", status);
    }
    eprintln!(
        "  • wavenumber window: {:.3} .. {:.3} cm^-1",
        report.wavenumber_bounds.0, report.wavenumber_bounds.1
    );
    if report.ready {
        eprintln!("✅ Ready for `lblkit setup`");
    }
}

fn print_status(kind: &str, status: &FileStatus) {
    if status.present {
        eprintln!("  ✓ {}: {}", kind, status.name);
    } else {
        eprintln!("  ✗ {}: {} (missing)", kind, status.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lblkit_provision::compiler::{Platform, Vendor};

    #[test]
    fn test_report_serializes_typed_range_and_profile() {
        let report = CheckReport {
            root: "/srv/lbl".to_string(),
            compiler: Some(CompilerProfile {
                platform: Platform::Linux,
                vendor: Vendor::Gnu,
            }),
            compiler_token: Some("linuxGNUsgl".to_string()),
            compiler_error: None,
            range: SpectralRange::default(),
            wavenumber_bounds: SpectralRange::default().wavenumber_bounds(),
            archives: vec![FileStatus {
                name: "aer_v_3.2.tar.gz".to_string(),
                present: true,
            }],
            templates: Vec::new(),
            ready: true,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["range"]["start_nm"], 300.0);
        assert_eq!(value["range"]["end_nm"], 5000.0);
        assert_eq!(value["compiler"]["platform"], "linux");
        assert_eq!(value["compiler"]["vendor"], "GNU");
        assert_eq!(value["compiler_token"], "linuxGNUsgl");
        assert_eq!(value["archives"][0]["present"], true);
    }
}
