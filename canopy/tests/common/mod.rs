//! Shared fixtures: `LetterTask` and a matching mock backend.
//!
//! Candidates are strings over `a`, `b`, `c`. Generation appends one letter per sample
//! (`a`, `b`, `c` in that order), and a candidate's value is the sum of its letters with
//! `a = 3`, `b = 2`, `c = 1`. Prompts are tagged so the mock can tell them apart.

#![allow(dead_code)]

use canopy::{MockLlm, Score, Task, TaskError, TestOutcome, ValueCache};

pub struct LetterTask {
    pub inputs: Vec<String>,
    pub steps: usize,
    pub stops: Vec<Option<String>>,
    /// A final output equal to this counts as correct.
    pub answer: String,
    pub cache: ValueCache,
}

impl LetterTask {
    pub fn new(steps: usize) -> Self {
        Self {
            inputs: vec!["x".to_string(), "y".to_string()],
            steps,
            stops: vec![Some("\n".to_string()); steps],
            answer: "aa".to_string(),
            cache: ValueCache::new(),
        }
    }
}

pub fn letter_value(y: &str) -> Score {
    y.chars()
        .map(|c| match c {
            'a' => 3.0,
            'b' => 2.0,
            'c' => 1.0,
            _ => 0.0,
        })
        .sum()
}

impl Task for LetterTask {
    type Input = String;

    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn get_input(&self, index: usize) -> Result<String, TaskError> {
        self.inputs
            .get(index)
            .cloned()
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
        format!("gen|{}|{}", x, y)
    }

    fn cot_prompt_wrap(&self, x: &String, y: &str) -> String {
        format!("cot|{}|{}", x, y)
    }

    fn propose_prompt_wrap(&self, x: &String, y: &str) -> String {
        format!("propose|{}|{}", x, y)
    }

    fn value_prompt_wrap(&self, x: &String, y: &str) -> String {
        format!("val|{}|{}", x, y)
    }

    fn vote_prompt_wrap(&self, x: &String, ys: &[String]) -> String {
        format!("vote|{}|{}", x, ys.join(","))
    }

    fn value_outputs_unwrap(&self, _x: &String, _y: &str, outputs: &[String]) -> Score {
        outputs
            .first()
            .and_then(|o| o.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    fn vote_outputs_unwrap(&self, outputs: &[String], n_candidates: usize) -> Vec<Score> {
        let mut votes = vec![0.0; n_candidates];
        for o in outputs {
            if let Ok(choice) = o.trim().parse::<usize>() {
                if (1..=n_candidates).contains(&choice) {
                    votes[choice - 1] += 1.0;
                }
            }
        }
        votes
    }

    fn value_cache(&mut self) -> &mut ValueCache {
        &mut self.cache
    }

    fn test_output(&self, index: usize, output: &str) -> Result<TestOutcome, TaskError> {
        self.get_input(index)?;
        let r = if output == self.answer { 1.0 } else { 0.0 };
        Ok(TestOutcome { r })
    }
}

/// Backend answering `LetterTask` prompts: generation returns the first `n` of `a b c`,
/// value returns the candidate's letter value, proposal returns `a\nb`, vote picks 1.
pub fn letter_llm() -> MockLlm {
    MockLlm::from_fn(|prompt, n, _stop| {
        let mut parts = prompt.splitn(3, '|');
        let kind = parts.next().unwrap_or("");
        let _x = parts.next();
        let y = parts.next().unwrap_or("");
        match kind {
            "gen" | "cot" => ["a", "b", "c"]
                .iter()
                .cycle()
                .take(n)
                .map(|s| s.to_string())
                .collect(),
            "val" => vec![letter_value(y).to_string(); n],
            "propose" => vec!["a\n\nb\n".to_string(); n],
            "vote" => vec!["1".to_string(); n],
            _ => Vec::new(),
        }
    })
}
