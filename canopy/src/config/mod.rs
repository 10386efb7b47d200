//! Run configuration consumed by the search core.
//!
//! Strategy identifiers are closed enums parsed once (from CLI flags or a config file); an
//! unknown identifier is a [`ConfigError`] naming the bad value, raised before any backend call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::PromptKind;

/// Invalid run configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown {kind}: {value} (use {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    #[error("temperature {0} out of range (0 to 2)")]
    Temperature(f32),
}

macro_rules! method_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $expected:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConfigError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $(Self::$variant => $text,)+
                };
                f.write_str(s)
            }
        }
    };
}

method_enum! {
    /// How candidates are expanded.
    GenerateMethod, "generate method", "sample or propose" {
        Sample => "sample",
        Propose => "propose",
    }
}

method_enum! {
    /// How expanded candidates are scored.
    EvaluateMethod, "evaluate method", "value or vote" {
        Value => "value",
        Vote => "vote",
    }
}

method_enum! {
    /// How the frontier is cut down.
    SelectMethod, "select method", "sample or greedy" {
        Sample => "sample",
        Greedy => "greedy",
    }
}

method_enum! {
    /// Template used by sampling generation.
    PromptMode, "prompt mode", "standard or cot" {
        Standard => "standard",
        Cot => "cot",
    }
}

/// Settings for one search run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend identifier (model name).
    pub backend: String,
    pub temperature: f32,
    pub method_generate: GenerateMethod,
    pub method_evaluate: EvaluateMethod,
    pub method_select: SelectMethod,
    pub prompt_sample: PromptMode,
    /// Generation width for sampling.
    pub n_generate_sample: usize,
    /// Completions requested per evaluation call.
    pub n_evaluate_sample: usize,
    /// Frontier size after selection.
    pub n_select_sample: usize,
    /// Use the task's value cache.
    pub cache_value: bool,
    /// Emit per-step reports at info level.
    pub verbose: bool,
    /// Seed for sampling selection; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: "gpt-4".to_string(),
            temperature: 0.7,
            method_generate: GenerateMethod::Sample,
            method_evaluate: EvaluateMethod::Value,
            method_select: SelectMethod::Greedy,
            prompt_sample: PromptMode::Standard,
            n_generate_sample: 1,
            n_evaluate_sample: 1,
            n_select_sample: 1,
            cache_value: true,
            verbose: false,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, n) in [
            ("n_generate_sample", self.n_generate_sample),
            ("n_evaluate_sample", self.n_evaluate_sample),
            ("n_select_sample", self.n_select_sample),
        ] {
            if n == 0 {
                return Err(ConfigError::ZeroCount { field });
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        Ok(())
    }

    /// Prompt kinds a search with this configuration renders.
    pub fn prompt_kinds(&self, naive: bool) -> Vec<PromptKind> {
        let sample_kind = match self.prompt_sample {
            PromptMode::Standard => PromptKind::Standard,
            PromptMode::Cot => PromptKind::Cot,
        };
        if naive {
            return vec![sample_kind];
        }
        let generate = match self.method_generate {
            GenerateMethod::Sample => sample_kind,
            GenerateMethod::Propose => PromptKind::Propose,
        };
        let evaluate = match self.method_evaluate {
            EvaluateMethod::Value => PromptKind::Value,
            EvaluateMethod::Vote => PromptKind::Vote,
        };
        vec![generate, evaluate]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_parse_known_values() {
        assert_eq!("sample".parse::<GenerateMethod>().unwrap(), GenerateMethod::Sample);
        assert_eq!("Propose".parse::<GenerateMethod>().unwrap(), GenerateMethod::Propose);
        assert_eq!("vote".parse::<EvaluateMethod>().unwrap(), EvaluateMethod::Vote);
        assert_eq!("greedy".parse::<SelectMethod>().unwrap(), SelectMethod::Greedy);
        assert_eq!("cot".parse::<PromptMode>().unwrap(), PromptMode::Cot);
    }

    #[test]
    fn unknown_method_names_the_bad_value() {
        let err = "beam".parse::<SelectMethod>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownVariant {
                kind: "select method",
                value: "beam".to_string(),
                expected: "sample or greedy",
            }
        );
        assert!(err.to_string().contains("beam"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for m in [EvaluateMethod::Value, EvaluateMethod::Vote] {
            assert_eq!(m.to_string().parse::<EvaluateMethod>().unwrap(), m);
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = SearchConfig::default();
        assert_eq!(c.backend, "gpt-4");
        assert_eq!(c.method_select, SelectMethod::Greedy);
        assert!(c.cache_value);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_counts_and_bad_temperature() {
        let c = SearchConfig {
            n_select_sample: 0,
            ..SearchConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ZeroCount {
                field: "n_select_sample"
            })
        );
        let c = SearchConfig {
            temperature: 3.5,
            ..SearchConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Temperature(_))));
    }

    #[test]
    fn deserializes_partial_table_with_defaults() {
        let c: SearchConfig =
            serde_json::from_str(r#"{"method_evaluate":"vote","n_generate_sample":5}"#).unwrap();
        assert_eq!(c.method_evaluate, EvaluateMethod::Vote);
        assert_eq!(c.n_generate_sample, 5);
        assert_eq!(c.method_select, SelectMethod::Greedy);
    }

    #[test]
    fn prompt_kinds_follow_strategies() {
        let c = SearchConfig {
            method_generate: GenerateMethod::Propose,
            method_evaluate: EvaluateMethod::Vote,
            ..SearchConfig::default()
        };
        assert_eq!(c.prompt_kinds(false), vec![PromptKind::Propose, PromptKind::Vote]);
        assert_eq!(c.prompt_kinds(true), vec![PromptKind::Standard]);
    }
}
