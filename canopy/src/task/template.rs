//! Data-driven task loaded from YAML.
//!
//! ```yaml
//! name: arithmetic
//! steps: 2
//! stops: ["\n", null]
//! inputs:
//!   - input: "4 4 6 8"
//!     answer: "24"
//! prompts:
//!   standard: "Input: {input}\n{candidate}"
//!   value: "Evaluate: {input}\n{candidate}\nAnswer sure/likely/impossible."
//!   vote: "Pick the best:\n{candidates}"
//! value:
//!   labels: { sure: 20, likely: 1, impossible: 0.001 }
//! vote:
//!   pattern: "(?is)best choice is\\D*(\\d+)"
//! ```
//!
//! Placeholders: `{input}`, `{candidate}`, `{candidates}`. Unknown placeholders are kept verbatim.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{PromptKind, Task, TaskError, TestOutcome};
use crate::cache::ValueCache;
use crate::search::Score;

const DEFAULT_VOTE_PATTERN: &str = r"(?is)best choice is\D*(\d+)";
const NUMBER_PATTERN: &str = r"-?\d+(?:\.\d+)?";

/// One problem instance.
#[derive(Clone, Debug, Deserialize)]
pub struct TemplateInput {
    pub input: String,
    /// Expected answer used by `test_output`.
    #[serde(default)]
    pub answer: Option<String>,
}

/// Prompt templates; an empty template means the task does not support that prompt kind.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplatePrompts {
    pub standard: String,
    pub cot: String,
    pub propose: String,
    pub value: String,
    pub vote: String,
}

/// How value outputs become a score: last line matched against `labels`, else a number on it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValueRule {
    pub labels: BTreeMap<String, f64>,
}

/// How vote outputs become votes: first capture group of `pattern` is a 1-based choice.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VoteRule {
    pub pattern: String,
}

impl Default for VoteRule {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_VOTE_PATTERN.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TaskFile {
    name: String,
    steps: usize,
    #[serde(default)]
    stops: Option<Vec<Option<String>>>,
    inputs: Vec<TemplateInput>,
    #[serde(default)]
    prompts: TemplatePrompts,
    #[serde(default)]
    value: ValueRule,
    #[serde(default)]
    vote: VoteRule,
}

/// Task whose prompts and parsing rules come from a YAML document.
#[derive(Debug)]
pub struct TemplateTask {
    name: String,
    steps: usize,
    stops: Vec<Option<String>>,
    inputs: Vec<TemplateInput>,
    prompts: TemplatePrompts,
    labels: BTreeMap<String, f64>,
    vote_pattern: Regex,
    number: Regex,
    cache: ValueCache,
}

fn compile(pattern: &str) -> Result<Regex, TaskError> {
    Regex::new(pattern).map_err(|e| TaskError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Replaces `{name}` placeholders in one pass, so substituted text is never re-expanded.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (close, *v))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn last_line(output: &str) -> String {
    output
        .trim_end()
        .lines()
        .last()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

impl TemplateTask {
    /// Parses and validates a task from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, TaskError> {
        let file: TaskFile =
            serde_yaml::from_str(content).map_err(|e| TaskError::Parse(e.to_string()))?;
        let stops = file.stops.unwrap_or_else(|| vec![None; file.steps]);
        if stops.len() < file.steps {
            return Err(TaskError::StopsTooShort {
                steps: file.steps,
                stops: stops.len(),
            });
        }
        let vote_pattern = compile(&file.vote.pattern)?;
        if vote_pattern.captures_len() < 2 {
            return Err(TaskError::InvalidPattern {
                pattern: file.vote.pattern,
                message: "pattern needs a capture group for the choice number".to_string(),
            });
        }
        let labels = file
            .value
            .labels
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Ok(Self {
            name: file.name,
            steps: file.steps,
            stops,
            inputs: file.inputs,
            prompts: file.prompts,
            labels,
            vote_pattern,
            number: compile(NUMBER_PATTERN)?,
            cache: ValueCache::new(),
        })
    }

    /// Reads and parses a task YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaskError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TaskError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn template(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::Standard => &self.prompts.standard,
            PromptKind::Cot => &self.prompts.cot,
            PromptKind::Propose => &self.prompts.propose,
            PromptKind::Value => &self.prompts.value,
            PromptKind::Vote => &self.prompts.vote,
        }
    }

    /// Fails on the first of `kinds` whose template is empty.
    pub fn ensure_templates(&self, kinds: &[PromptKind]) -> Result<(), TaskError> {
        match kinds.iter().find(|k| self.template(**k).trim().is_empty()) {
            Some(kind) => Err(TaskError::MissingTemplate(*kind)),
            None => Ok(()),
        }
    }

    fn wrap(&self, kind: PromptKind, x: &str, y: &str) -> String {
        render(self.template(kind), &[("input", x), ("candidate", y)])
    }

    fn line_score(&self, line: &str) -> Score {
        if let Some(score) = self.labels.get(line) {
            return *score;
        }
        self.number
            .find(line)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

impl Task for TemplateTask {
    type Input = String;

    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn get_input(&self, index: usize) -> Result<String, TaskError> {
        self.inputs
            .get(index)
            .map(|i| i.input.clone())
            .ok_or(TaskError::IndexOutOfRange {
                index,
                len: self.inputs.len(),
            })
    }

    fn steps(&self) -> usize {
        self.steps
    }

    fn stops(&self) -> &[Option<String>] {
        &self.stops
    }

    fn standard_prompt_wrap(&self, x: &String, y: &str) -> String {
        self.wrap(PromptKind::Standard, x, y)
    }

    fn cot_prompt_wrap(&self, x: &String, y: &str) -> String {
        self.wrap(PromptKind::Cot, x, y)
    }

    fn propose_prompt_wrap(&self, x: &String, y: &str) -> String {
        self.wrap(PromptKind::Propose, x, y)
    }

    fn value_prompt_wrap(&self, x: &String, y: &str) -> String {
        self.wrap(PromptKind::Value, x, y)
    }

    fn vote_prompt_wrap(&self, x: &String, ys: &[String]) -> String {
        let choices: String = ys
            .iter()
            .enumerate()
            .map(|(i, y)| format!("Choice {}:\n{}\n", i + 1, y))
            .collect();
        render(&self.prompts.vote, &[("input", x), ("candidates", &choices)])
    }

    fn value_outputs_unwrap(&self, _x: &String, _y: &str, outputs: &[String]) -> Score {
        outputs.iter().map(|o| self.line_score(&last_line(o))).sum()
    }

    fn vote_outputs_unwrap(&self, outputs: &[String], n_candidates: usize) -> Vec<Score> {
        let mut votes = vec![0.0; n_candidates];
        for output in outputs {
            let choice = self
                .vote_pattern
                .captures(output)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<usize>().ok());
            match choice {
                Some(v) if (1..=n_candidates).contains(&v) => votes[v - 1] += 1.0,
                Some(v) => debug!(choice = v, n_candidates, "vote out of range"),
                None => debug!(output = %output, "no vote found"),
            }
        }
        votes
    }

    fn value_cache(&mut self) -> &mut ValueCache {
        &mut self.cache
    }

    fn test_output(&self, index: usize, output: &str) -> Result<TestOutcome, TaskError> {
        let input = self.inputs.get(index).ok_or(TaskError::IndexOutOfRange {
            index,
            len: self.inputs.len(),
        })?;
        let r = match &input.answer {
            Some(answer) if output.contains(answer.trim()) => 1.0,
            _ => 0.0,
        };
        Ok(TestOutcome { r })
    }
}
