//! Core data model for a conversion run.
//!
//! Every value here is built once and then only read:
//! - `Role` / `RoleMap`: which input file plays which part.
//! - `OperatorName`: validated name of the operator under test.
//! - `InputSet` -> `TransformedSet` -> `OutputSet`: the text as it flows
//!   through the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Functional category of one of the four input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Kernel,
    Baseline,
    AccuracyTest,
    PerformanceTest,
}

impl Role {
    /// All roles, in the order they are reported.
    pub const ALL: [Role; 4] =
        [Role::Kernel, Role::Baseline, Role::AccuracyTest, Role::PerformanceTest];

    /// Human-readable label used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Kernel => "Triton",
            Role::Baseline => "Baseline",
            Role::AccuracyTest => "Accuracy test",
            Role::PerformanceTest => "Performance test",
        }
    }

    /// Lower-case noun used in error messages ("accuracy test").
    pub fn noun(&self) -> &'static str {
        match self {
            Role::Kernel => "kernel",
            Role::Baseline => "baseline",
            Role::AccuracyTest => "accuracy test",
            Role::PerformanceTest => "performance test",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Kernel => "kernel",
            Role::Baseline => "baseline",
            Role::AccuracyTest => "accuracy_test",
            Role::PerformanceTest => "performance_test",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Name of the operator being converted (e.g. `relu`).
///
/// The name is spliced into Python identifiers, module paths and file names,
/// so it must be a plain identifier: `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperatorName(String);

impl OperatorName {
    /// Validate and wrap an operator name. Returns `None` if it is empty or
    /// not an identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let first = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<op>_baseline`, the name the reference implementation is renamed to.
    pub fn baseline_fn(&self) -> String {
        format!("{}_baseline", self.0)
    }

    /// `gems_<op>`, the alias the experimental kernel is imported under.
    pub fn gems_alias(&self) -> String {
        format!("gems_{}", self.0)
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role -> input file, produced by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleMap {
    pub files: BTreeMap<Role, PathBuf>,
    /// True when the two test roles were assigned by position rather than by
    /// content.
    pub positional_guess: bool,
}

impl RoleMap {
    pub fn get(&self, role: Role) -> Option<&Path> {
        self.files.get(&role).map(PathBuf::as_path)
    }

    pub fn missing(&self) -> Vec<Role> {
        Role::ALL.iter().copied().filter(|r| !self.files.contains_key(r)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Contents of the four input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSet {
    pub kernel: String,
    pub baseline: String,
    pub accuracy_test: String,
    pub performance_test: String,
}

/// Input text after the rewriter has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedSet {
    /// Kernel source, untouched.
    pub kernel: String,
    /// Baseline function renamed to `<op>_baseline` (empty if none was found).
    pub baseline_fn: String,
    pub accuracy_test: String,
    /// Performance test with its import preamble already dropped.
    pub performance_test: String,
}

/// The two files a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    pub kernel_module: String,
    pub test_module: String,
}
