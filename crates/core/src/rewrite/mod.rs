//! Text rewriting from the bench test convention to pytest/FlagGems.
//!
//! Four independent transforms, each `&str -> String`:
//! - [`convert_decorators`]
//! - [`convert_imports`]
//! - [`convert_function_calls`]
//! - [`convert_function_names`]
//!
//! All of them are surface pattern substitutions. A pattern that matches
//! nothing leaves the text unchanged; nothing in this module fails.

use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};
use tracing::trace;

use crate::model::OperatorName;
use crate::pipeline::ConvertConfig;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("literal pattern compiles"));
    };
}

pattern!(LABEL_RE, r#"@label\(["'](\w+)["']\)"#);
pattern!(PARAMETRIZE_RE, r"@parametrize\(");
pattern!(TRITON_CALL_RE, r"bench\.triton\.\w+\(");
pattern!(BENCH_CALL_RE, r"bench\.\w+\(");
pattern!(DEVICE_ASSIGN_RE, r"=\s*device\b");
pattern!(DEVICE_ARG_RE, r"\(device\)");
pattern!(TO_REFERENCE_RE, r"to_reference\(([^,]+),\s*True\)");
pattern!(ASSERT_CLOSE_RE, r"assert_close\(([^,]+),\s*([^,]+),\s*dtype[^)]*\)");
pattern!(DEF_RE, r"def (\w+)\(");
pattern!(BENCHMARK_DEF_RE, r"def test_(\w+)_benchmark\(");

/// What a matched pattern is replaced with.
pub enum Replacement {
    /// Replacement with `$1`-style capture expansion.
    Template(String),
    /// Replacement inserted as-is (operator names never get expanded).
    Literal(String),
    /// Replacement computed from the captures.
    With(fn(&Captures<'_>) -> String),
}

/// One pattern -> replacement step.
pub struct TransformRule {
    pub name: &'static str,
    pattern: &'static Regex,
    replacement: Replacement,
}

impl TransformRule {
    fn new(name: &'static str, pattern: &'static Regex, replacement: Replacement) -> Self {
        Self { name, pattern, replacement }
    }

    /// Apply this rule to every match in `text`.
    pub fn apply(&self, text: &str) -> String {
        let out = match &self.replacement {
            Replacement::Template(t) => self.pattern.replace_all(text, t.as_str()),
            Replacement::Literal(l) => self.pattern.replace_all(text, NoExpand(l)),
            Replacement::With(f) => self.pattern.replace_all(text, |caps: &Captures<'_>| f(caps)),
        };
        let changed = out != text;
        trace!(rule = self.name, changed, "applied rule");
        out.into_owned()
    }
}

/// Apply `rules` in order, each seeing the previous rule's output.
pub fn apply_rules(rules: &[TransformRule], text: &str) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// `@label("x")` -> `@pytest.mark.x`, `@parametrize(` -> `@pytest.mark.parametrize(`.
pub fn decorator_rules() -> Vec<TransformRule> {
    vec![
        TransformRule::new("label", &LABEL_RE, Replacement::Template("@pytest.mark.$1".into())),
        TransformRule::new(
            "parametrize",
            &PARAMETRIZE_RE,
            Replacement::Literal("@pytest.mark.parametrize(".into()),
        ),
    ]
}

/// Call-site rules. The triton rule must stay ahead of the generic bench rule.
pub fn call_rules(op: &OperatorName, config: &ConvertConfig) -> Vec<TransformRule> {
    let assert_close = format!(
        "torch.testing.assert_close(${{1}}.cpu(), ${{2}}, rtol={:e}, atol={:e})",
        config.rtol, config.atol
    );
    vec![
        TransformRule::new(
            "triton-call",
            &TRITON_CALL_RE,
            Replacement::Literal(format!("{}(", op.gems_alias())),
        ),
        TransformRule::new(
            "bench-call",
            &BENCH_CALL_RE,
            Replacement::Literal(format!("{}(", op.baseline_fn())),
        ),
        TransformRule::new(
            "device-assign",
            &DEVICE_ASSIGN_RE,
            Replacement::Literal("=flag_gems.device".into()),
        ),
        TransformRule::new(
            "device-arg",
            &DEVICE_ARG_RE,
            Replacement::Literal("(flag_gems.device)".into()),
        ),
        TransformRule::new(
            "to-reference",
            &TO_REFERENCE_RE,
            Replacement::Template("${1}.cpu()".into()),
        ),
        TransformRule::new("assert-close", &ASSERT_CLOSE_RE, Replacement::Template(assert_close)),
    ]
}

fn prefix_test(caps: &Captures<'_>) -> String {
    if caps[1].starts_with("test_") {
        caps[0].to_string()
    } else {
        format!("def test_{}(", &caps[1])
    }
}

/// `def foo(` -> `def test_foo(`, then `def test_x_benchmark(` -> `def test_x_performance(`.
pub fn name_rules() -> Vec<TransformRule> {
    vec![
        TransformRule::new("test-prefix", &DEF_RE, Replacement::With(prefix_test)),
        TransformRule::new(
            "benchmark-suffix",
            &BENCHMARK_DEF_RE,
            Replacement::Template("def test_${1}_performance(".into()),
        ),
    ]
}

pub fn convert_decorators(code: &str) -> String {
    apply_rules(&decorator_rules(), code)
}

pub fn convert_function_calls(code: &str, op: &OperatorName, config: &ConvertConfig) -> String {
    apply_rules(&call_rules(op, config), code)
}

pub fn convert_function_names(code: &str) -> String {
    apply_rules(&name_rules(), code)
}

/// Import block placed ahead of the first statement of the accuracy test.
pub fn import_block(op: &OperatorName, config: &ConvertConfig) -> Vec<String> {
    vec![
        "import pytest".to_string(),
        "import triton".to_string(),
        String::new(),
        "import flag_gems".to_string(),
        format!("from {}.{op} import {op} as {}", config.experimental_module, op.gems_alias()),
    ]
}

/// Drop every `bench` import and insert [`import_block`] plus a blank line
/// before the first line that is neither blank nor a comment.
pub fn convert_imports(code: &str, op: &OperatorName, config: &ConvertConfig) -> String {
    let lines: Vec<&str> = code
        .split('\n')
        .filter(|line| !(line.contains("import bench") || line.contains("from bench")))
        .collect();

    let insert_at = lines
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .unwrap_or(0);

    let block = import_block(op, config);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + block.len() + 1);
    out.extend_from_slice(&lines[..insert_at]);
    out.extend(block.iter().map(String::as_str));
    out.push("");
    out.extend_from_slice(&lines[insert_at..]);
    out.join("\n")
}
