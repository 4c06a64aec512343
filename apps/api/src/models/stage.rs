use serde::{Deserialize, Serialize};

/// A distinct prompt/response contract with its own model and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyzer,
    Editor,
    SalaryEstimator,
}

impl Stage {
    /// Config key naming the model for this stage.
    pub fn model_key(self) -> &'static str {
        match self {
            Stage::Analyzer => "ANALYZER_MODEL",
            Stage::Editor => "EDITOR_MODEL",
            Stage::SalaryEstimator => "SALARY_MODEL",
        }
    }

    /// Model used when no config source names one.
    pub fn default_model(self) -> &'static str {
        match self {
            Stage::Analyzer | Stage::Editor => "gpt-4o",
            Stage::SalaryEstimator => "gpt-4o-mini",
        }
    }

    pub fn default_temperature(self) -> f32 {
        match self {
            Stage::Analyzer => 0.0,
            Stage::Editor => 0.2,
            Stage::SalaryEstimator => 0.1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Analyzer => "analyzer",
            Stage::Editor => "editor",
            Stage::SalaryEstimator => "salary_estimator",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
