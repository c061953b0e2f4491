//! Assembly of the output modules from rewritten inputs.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::model::{OperatorName, OutputSet, TransformedSet};

static FIRST_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdef (\w+)\(").expect("literal pattern compiles"));

/// Marker that opens the first test in a rewritten performance test.
const TEST_MARKER_PREFIX: &str = "@pytest.mark";

/// Pull the first function out of `source` and rename it to `<op>_baseline`.
///
/// The function runs from `def name(` to the next line starting with `def `
/// after the signature's first `)`, or to the end of the text. Returns an
/// empty string when `source` defines no function.
pub fn extract_baseline_function(source: &str, op: &OperatorName) -> String {
    let Some(def) = FIRST_DEF_RE.find(source) else {
        warn!("baseline defines no function; merged test will lack a baseline");
        return String::new();
    };
    let Some(close) = source[def.end()..].find(')') else {
        warn!("baseline signature is never closed; merged test will lack a baseline");
        return String::new();
    };

    let body_start = def.end() + close + 1;
    let end = source[body_start..].find("\ndef ").map_or(source.len(), |i| body_start + i);
    let func = &source[def.start()..end];

    let renamed = format!("def {}(", op.baseline_fn());
    FIRST_DEF_RE.replacen(func, 1, NoExpand(&renamed)).into_owned()
}

/// Keep the lines of `code` from the first `@pytest.mark` line onward.
///
/// Everything above that line is the performance test's own import preamble.
/// If there is no marker the text is returned whole.
pub fn performance_tests_only(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    let start =
        lines.iter().position(|line| line.trim().starts_with(TEST_MARKER_PREFIX)).unwrap_or(0);
    debug!(dropped_lines = start, "trimmed performance test preamble");
    lines[start..].join("\n")
}

/// Comment header and baseline import that open the merged test module.
pub fn test_header(op: &OperatorName) -> String {
    format!("# {} operator test\n\n# PyTorch baseline\nimport torch\n\n", op.as_str().to_uppercase())
}

/// Concatenate the header, baseline, accuracy test and performance test.
pub fn merge_test_module(set: &TransformedSet, op: &OperatorName) -> String {
    let mut out = test_header(op);
    out.push_str(&set.baseline_fn);
    out.push_str("\n\n");
    out.push_str(&set.accuracy_test);
    out.push_str("\n\n");
    out.push_str(&set.performance_test);
    out
}

/// Build the output set. The kernel module is passed through untouched.
pub fn assemble(set: TransformedSet, op: &OperatorName) -> OutputSet {
    let test_module = merge_test_module(&set, op);
    OutputSet { kernel_module: set.kernel, test_module }
}
