//! The conversion pipeline.
//!
//! Stages are plain functions that take everything they need and return new
//! values:
//!
//! `classify_dir` -> [`read_inputs`] -> [`transform`] -> `assemble` -> [`write_outputs`]
//!
//! [`convert`] runs the whole chain. Frontends that report progress use
//! [`plan_with`], which announces each [`Stage`] as it starts or finishes.

mod config;
mod layout;

pub use config::*;
pub use layout::*;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::assemble::{assemble, extract_baseline_function, performance_tests_only};
use crate::classify::{classify_dir, ClassifyError};
use crate::model::{InputSet, OperatorName, OutputSet, Role, RoleMap, TransformedSet};
use crate::rewrite::{
    convert_decorators, convert_function_calls, convert_function_names, convert_imports,
};

/// Error type for a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The operator name cannot be used as an identifier.
    #[error("Invalid operator name '{0}': expected an identifier such as `relu`")]
    InvalidOperator(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// A role map handed to `read_inputs` lacks a role.
    #[error("No input file assigned to role {0}")]
    MissingRole(Role),

    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Validate a raw operator name.
pub fn parse_operator(raw: &str) -> ConvertResult<OperatorName> {
    OperatorName::parse(raw).ok_or_else(|| ConvertError::InvalidOperator(raw.to_string()))
}

fn read_role(roles: &RoleMap, role: Role) -> ConvertResult<String> {
    let path = roles.get(role).ok_or(ConvertError::MissingRole(role))?;
    fs::read_to_string(path).map_err(|source| ConvertError::Read { path: path.to_path_buf(), source })
}

/// Read the four classified files.
pub fn read_inputs(roles: &RoleMap) -> ConvertResult<InputSet> {
    Ok(InputSet {
        kernel: read_role(roles, Role::Kernel)?,
        baseline: read_role(roles, Role::Baseline)?,
        accuracy_test: read_role(roles, Role::AccuracyTest)?,
        performance_test: read_role(roles, Role::PerformanceTest)?,
    })
}

/// Run the rewriter over the inputs.
///
/// The accuracy test goes through decorators, imports, calls and names. The
/// performance test skips the import step and is cut down to its tests,
/// since the accuracy test already carries the imports.
pub fn transform(inputs: InputSet, op: &OperatorName, config: &ConvertConfig) -> TransformedSet {
    let accuracy = convert_decorators(&inputs.accuracy_test);
    let accuracy = convert_imports(&accuracy, op, config);
    let accuracy = convert_function_calls(&accuracy, op, config);
    let accuracy = convert_function_names(&accuracy);

    let performance = convert_decorators(&inputs.performance_test);
    let performance = convert_function_calls(&performance, op, config);
    let performance = convert_function_names(&performance);
    let performance = performance_tests_only(&performance);

    TransformedSet {
        baseline_fn: extract_baseline_function(&inputs.baseline, op),
        kernel: inputs.kernel,
        accuracy_test: accuracy,
        performance_test: performance,
    }
}

/// Write the kernel module and then the test module, creating the
/// destination directory first. Existing files are overwritten.
///
/// Returns the written paths in write order.
pub fn write_outputs(output: &OutputSet, layout: &OutputLayout) -> ConvertResult<Vec<PathBuf>> {
    fs::create_dir_all(&layout.dir)
        .map_err(|source| ConvertError::CreateDir { path: layout.dir.clone(), source })?;

    let files = [
        (&layout.kernel_path, &output.kernel_module),
        (&layout.test_path, &output.test_module),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (path, body) in files {
        fs::write(path, body)
            .map_err(|source| ConvertError::Write { path: path.clone(), source })?;
        info!(path = %path.display(), bytes = body.len(), "wrote output");
        written.push(path.clone());
    }
    Ok(written)
}

/// Everything a finished conversion produced.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub operator: OperatorName,
    pub roles: RoleMap,
    pub layout: OutputLayout,
    pub output: OutputSet,
    /// Paths written to disk; empty for a plan that was never written.
    pub written: Vec<PathBuf>,
}

/// Progress events reported by [`plan_with`].
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Classifying,
    Classified(&'a RoleMap),
    Reading,
    /// Inputs as read from disk, before the rewriter consumes them.
    Read(&'a InputSet),
    Generating,
}

/// Classify, read, transform and assemble without touching the output
/// directory, calling `on_stage` along the way.
pub fn plan_with(
    input_dir: &Path,
    output_dir: &Path,
    op: &OperatorName,
    config: &ConvertConfig,
    mut on_stage: impl FnMut(Stage<'_>),
) -> ConvertResult<Conversion> {
    on_stage(Stage::Classifying);
    let roles = classify_dir(input_dir, &config.extension)?;
    on_stage(Stage::Classified(&roles));

    on_stage(Stage::Reading);
    let inputs = read_inputs(&roles)?;
    on_stage(Stage::Read(&inputs));

    on_stage(Stage::Generating);
    let output = assemble(transform(inputs, op, config), op);
    let layout = OutputLayout::new(output_dir, op);
    Ok(Conversion { operator: op.clone(), roles, layout, output, written: Vec::new() })
}

/// [`plan_with`] for a raw operator name, without progress reporting.
pub fn plan(
    input_dir: &Path,
    output_dir: &Path,
    operator: &str,
    config: &ConvertConfig,
) -> ConvertResult<Conversion> {
    let op = parse_operator(operator)?;
    plan_with(input_dir, output_dir, &op, config, |_| {})
}

/// Run the full pipeline and write both output files.
pub fn convert(
    input_dir: &Path,
    output_dir: &Path,
    operator: &str,
    config: &ConvertConfig,
) -> ConvertResult<Conversion> {
    let mut conversion = plan(input_dir, output_dir, operator, config)?;
    conversion.written = write_outputs(&conversion.output, &conversion.layout)?;
    info!(operator = %conversion.operator, "conversion complete");
    Ok(conversion)
}
