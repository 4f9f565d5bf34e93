use crate::assemble;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const BUILTIN_PROBLEMS: &str = include_str!("catalog_builtin/problems.json");

/// One interview-prep style exercise: a `solve(input)` function the user
/// completes, checked against canonical examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub starter_code: String,
    pub examples: Vec<ProblemExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemExample {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemLoadDiagnostic {
    pub problem_ref: String,
    pub reason: String,
}

impl ProblemLoadDiagnostic {
    pub fn to_log_line(&self) -> String {
        format!(
            "problem set rejected entry={} reason={}",
            self.problem_ref, self.reason
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
}

impl ProblemSet {
    pub fn load_builtin() -> (Self, Vec<ProblemLoadDiagnostic>) {
        Self::from_raw(BUILTIN_PROBLEMS)
    }

    pub fn from_raw(raw: &str) -> (Self, Vec<ProblemLoadDiagnostic>) {
        let mut diagnostics = Vec::new();
        let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(entries) => entries,
            Err(err) => {
                diagnostics.push(ProblemLoadDiagnostic {
                    problem_ref: "set".to_string(),
                    reason: format!("problem set parse failed: {err}"),
                });
                return (Self::default(), diagnostics);
            }
        };

        let mut problems: Vec<Problem> = Vec::new();
        let mut seen_ids = BTreeSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match parse_and_validate_problem(entry, &mut seen_ids) {
                Ok(problem) => problems.push(problem),
                Err(reason) => diagnostics.push(ProblemLoadDiagnostic {
                    problem_ref: format!("entry:{index}"),
                    reason,
                }),
            }
        }

        problems.sort_by(|left, right| left.id.cmp(&right.id));
        (Self { problems }, diagnostics)
    }

    pub fn get(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|problem| problem.id == id)
    }

    pub fn all(&self) -> &[Problem] {
        &self.problems
    }

    pub fn difficulties(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .problems
            .iter()
            .map(|problem| problem.difficulty.as_str())
            .collect();
        distinct.into_iter().map(str::to_string).collect()
    }
}

fn parse_and_validate_problem(
    entry: serde_json::Value,
    seen_ids: &mut BTreeSet<String>,
) -> Result<Problem, String> {
    let mut problem: Problem =
        serde_json::from_value(entry).map_err(|err| format!("problem parse failed: {err}"))?;

    problem.id = problem.id.trim().to_string();
    problem.title = problem.title.trim().to_string();

    if problem.id.is_empty() {
        return Err("id is required".to_string());
    }
    if problem.title.is_empty() {
        return Err("title is required".to_string());
    }
    if problem.examples.is_empty() {
        return Err("at least one example is required".to_string());
    }
    if !seen_ids.insert(problem.id.clone()) {
        return Err(format!("duplicate id {}", problem.id));
    }

    Ok(problem)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Unset,
    Passed,
    Failed,
}

impl TestResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub result: TestResult,
}

/// The per-session run state for one problem. Created fresh from the
/// problem's canonical examples; mutated only by a run action; never
/// persisted across sessions.
#[derive(Debug, Clone)]
pub struct TestSuite {
    problem_id: String,
    cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn for_problem(problem: &Problem) -> Self {
        let cases = problem
            .examples
            .iter()
            .map(|example| TestCase {
                input: example.input.clone(),
                expected_output: example.expected_output.clone(),
                actual_output: None,
                result: TestResult::Unset,
            })
            .collect();
        Self {
            problem_id: problem.id.clone(),
            cases,
        }
    }

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Records one observed output per case, in order. Cases without a
    /// matching output return to unset.
    pub fn record_run(&mut self, outputs: &[String]) {
        for (index, case) in self.cases.iter_mut().enumerate() {
            match outputs.get(index) {
                Some(output) => {
                    case.actual_output = Some(output.clone());
                    case.result = if *output == case.expected_output {
                        TestResult::Passed
                    } else {
                        TestResult::Failed
                    };
                }
                None => {
                    case.actual_output = None;
                    case.result = TestResult::Unset;
                }
            }
        }
    }

    pub fn all_passed(&self) -> bool {
        !self.cases.is_empty()
            && self
                .cases
                .iter()
                .all(|case| case.result == TestResult::Passed)
    }

    pub fn reset(&mut self) {
        for case in &mut self.cases {
            case.actual_output = None;
            case.result = TestResult::Unset;
        }
    }
}

/// Builds a sandbox-ready document that runs `solution` against each example
/// and renders a result table inside the sandboxed frame. This is the only
/// place the results are visible: there is no channel back to the host.
pub fn harness_document(problem: &Problem, solution: &str) -> String {
    let inputs_json = serde_json::Value::Array(
        problem
            .examples
            .iter()
            .map(|example| {
                serde_json::json!({
                    "input": example.input,
                    "expected": example.expected_output,
                })
            })
            .collect(),
    )
    .to_string();

    let markup = format!(
        "<h2>{}</h2>\n<table class=\"table\"><thead><tr>\
         <th>Input</th><th>Expected</th><th>Actual</th><th>Result</th>\
         </tr></thead><tbody id=\"results\"></tbody></table>",
        problem.title
    );
    let style = "td, th { font-family: monospace; }".to_string();
    let behavior = format!(
        "{solution}\n\
         const cases = {inputs_json};\n\
         const tbody = document.getElementById(\"results\");\n\
         for (const c of cases) {{\n\
           let actual, ok;\n\
           try {{\n\
             actual = String(solve(c.input));\n\
             ok = actual === c.expected;\n\
           }} catch (err) {{\n\
             actual = String(err);\n\
             ok = false;\n\
           }}\n\
           const row = document.createElement(\"tr\");\n\
           for (const cell of [c.input, c.expected, actual, ok ? \"passed\" : \"failed\"]) {{\n\
             const td = document.createElement(\"td\");\n\
             td.textContent = cell;\n\
             row.appendChild(td);\n\
           }}\n\
           tbody.appendChild(row);\n\
         }}\n"
    );

    assemble::assemble(&markup, &style, &behavior)
}
