use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use testport_core::model::{Role, RoleMap};
use testport_core::pipeline::{
    load_convert_config, parse_operator, plan_with, write_outputs, ConvertConfig, Stage,
};
use tracing::debug;

use crate::{absolute_dir, sha256_bytes, sha256_written};

/// One role -> file line of a conversion report.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub path: String,
}

/// Machine-readable summary of a conversion (printed with `--json`).
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub operator: String,
    pub input_dir: String,
    pub output_dir: String,
    pub roles: Vec<RoleAssignment>,
    /// True when the two test roles were assigned by file-name order.
    pub positional_guess: bool,
    pub dry_run: bool,
    /// Files written (or that would be written on a dry run).
    pub outputs: Vec<String>,
    pub kernel_input_sha256: String,
    pub kernel_output_sha256: String,
}

fn role_assignments(roles: &RoleMap) -> Vec<RoleAssignment> {
    roles
        .files
        .iter()
        .map(|(role, path)| RoleAssignment { role: *role, path: path.display().to_string() })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

/// Load the config at `path`, or the defaults when no path is given.
pub fn resolve_config(path: Option<&str>) -> Result<ConvertConfig> {
    match path {
        Some(p) => load_convert_config(Path::new(p)),
        None => Ok(ConvertConfig::default()),
    }
}

/// Convert the four bench-format files in `input_dir` into
/// `<output_dir>/<operator>.py` and `<output_dir>/<operator>_test.py`.
///
/// Progress goes to stdout unless `json` is set, in which case only the
/// report is printed. With `dry_run` nothing is written.
pub fn convert_command(
    input_dir: &str,
    output_dir: &str,
    operator: &str,
    config_path: Option<&str>,
    dry_run: bool,
    json: bool,
) -> Result<ConversionReport> {
    let config = resolve_config(config_path)?;
    debug!(?config, "resolved conversion config");
    let op = parse_operator(operator)?;
    let input_path = absolute_dir(input_dir)?;
    let output_path = absolute_dir(output_dir)?;
    let say = |line: String| {
        if !json {
            println!("{line}");
        }
    };

    say(format!("Converting {op} operator..."));

    let mut kernel_input_sha256 = String::new();
    let mut conversion = plan_with(&input_path, &output_path, &op, &config, |stage| match stage {
        Stage::Classifying => say("Step 1: Identifying input files...".to_string()),
        Stage::Classified(roles) => {
            for role in Role::ALL {
                if let Some(path) = roles.get(role) {
                    say(format!("  - {}: {}", role.label(), file_name(path)));
                }
            }
            if roles.positional_guess {
                say("  (test roles assigned by file-name order; no content signal)".to_string());
            }
        }
        Stage::Reading => say("Step 2: Reading files...".to_string()),
        Stage::Read(inputs) => kernel_input_sha256 = sha256_bytes(inputs.kernel.as_bytes()),
        Stage::Generating => say("Step 3: Generating output files...".to_string()),
    })?;
    let layout = &conversion.layout;

    let (outputs, kernel_output_sha256) = if dry_run {
        for path in [&layout.kernel_path, &layout.test_path] {
            say(format!("  Would generate: {}", path.display()));
        }
        (
            vec![layout.kernel_path.clone(), layout.test_path.clone()],
            sha256_bytes(conversion.output.kernel_module.as_bytes()),
        )
    } else {
        conversion.written = write_outputs(&conversion.output, layout)?;
        for path in &conversion.written {
            say(format!("✓ Generated: {}", path.display()));
        }
        (conversion.written.clone(), sha256_written(&conversion.layout.kernel_path)?)
    };

    if dry_run {
        say("\nDry run complete; no files written.".to_string());
    } else {
        say("\n✓ Conversion complete!".to_string());
    }

    let report = ConversionReport {
        operator: conversion.operator.to_string(),
        input_dir: input_path.display().to_string(),
        output_dir: output_path.display().to_string(),
        roles: role_assignments(&conversion.roles),
        positional_guess: conversion.roles.positional_guess,
        dry_run,
        outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
        kernel_input_sha256,
        kernel_output_sha256,
    };

    if json {
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize conversion report to JSON")?;
        println!("{}", serialized);
    }

    Ok(report)
}
