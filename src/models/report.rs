use serde::{Deserialize, Serialize};

/// Difficulty label assigned to a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Aggregate accuracy and latency summary over a batch of comparisons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub difficulty: Difficulty,
    /// Percent of all images method 1 got right, 2 decimals
    pub method1_accuracy: f64,
    pub method2_accuracy: f64,
    /// Mean seconds over successful runs only, 3 decimals
    pub method1_avg_time: f64,
    pub method2_avg_time: f64,
    pub total_captchas: usize,
    pub method1_successful: usize,
    pub method2_successful: usize,
    pub method1_correct: usize,
    pub method2_correct: usize,
    pub recommendation: String,
    pub timestamp: String,
}
