use chrono::Local;

use crate::models::comparison::ImageComparison;
use crate::models::recognition::Recognition;
use crate::models::report::{BatchReport, Difficulty};
use crate::services::comparator::{self, MATCH};

/// One row of the difficulty decision table
struct DifficultyRule {
    applies: fn(f64, f64) -> bool,
    difficulty: Difficulty,
    recommendation: &'static str,
}

fn method1_excellent(m1: f64, _m2: f64) -> bool {
    m1 >= 80.0
}

fn method2_significantly_better(m1: f64, m2: f64) -> bool {
    m1 < 80.0 && m2 >= 70.0
}

fn both_moderate(m1: f64, m2: f64) -> bool {
    m1 >= 55.0 && m2 >= 55.0
}

fn both_struggle(m1: f64, m2: f64) -> bool {
    m1 < 55.0 && m2 < 55.0
}

fn method1_ahead(m1: f64, m2: f64) -> bool {
    (m1 >= 55.0 || m2 >= 55.0) && m1 > m2
}

fn either_moderate(m1: f64, m2: f64) -> bool {
    m1 >= 55.0 || m2 >= 55.0
}

fn always(_m1: f64, _m2: f64) -> bool {
    true
}

/// Evaluated top to bottom, first match wins. The catch-all row can never be
/// reached once the rows above it have been checked; it stays so every
/// published recommendation has a row.
const DIFFICULTY_RULES: [DifficultyRule; 7] = [
    DifficultyRule {
        applies: method1_excellent,
        difficulty: Difficulty::Easy,
        recommendation: "Image Processing Method-1 works excellently for these captchas with high accuracy",
    },
    DifficultyRule {
        applies: method2_significantly_better,
        difficulty: Difficulty::Medium,
        recommendation: "Image Processing Method-2 performs significantly better than Method-1 for these captchas",
    },
    DifficultyRule {
        applies: both_moderate,
        difficulty: Difficulty::Medium,
        recommendation: "Both methods show moderate performance. Consider combining results or preprocessing images",
    },
    DifficultyRule {
        applies: both_struggle,
        difficulty: Difficulty::Hard,
        recommendation: "Both methods struggle significantly. Consider specialized preprocessing or alternative approaches",
    },
    DifficultyRule {
        applies: method1_ahead,
        difficulty: Difficulty::Medium,
        recommendation: "Image Processing Method-1 shows better performance. Focus on optimizing this approach",
    },
    // Ties land here: the method-1 row above needs a strict lead
    DifficultyRule {
        applies: either_moderate,
        difficulty: Difficulty::Medium,
        recommendation: "Image Processing Method-2 shows better performance. This method is more suitable",
    },
    DifficultyRule {
        applies: always,
        difficulty: Difficulty::Hard,
        recommendation: "Captchas are challenging for automated recognition. Manual intervention may be required",
    },
];

/// Classify a batch from the two methods' accuracy percentages
pub fn classify(method1_accuracy: f64, method2_accuracy: f64) -> (Difficulty, &'static str) {
    DIFFICULTY_RULES
        .iter()
        .find(|rule| (rule.applies)(method1_accuracy, method2_accuracy))
        .map(|rule| (rule.difficulty, rule.recommendation))
        .unwrap_or((
            Difficulty::Hard,
            DIFFICULTY_RULES[DIFFICULTY_RULES.len() - 1].recommendation,
        ))
}

/// Running counts for one method across a batch
#[derive(Debug, Default, Clone, PartialEq)]
struct MethodTally {
    successful: usize,
    correct: usize,
    total_time: f64,
}

impl MethodTally {
    fn record(&mut self, recognition: &Recognition, user_answer: &str) {
        let Some(time) = recognition.successful_time() else {
            return;
        };

        self.successful += 1;
        self.total_time += time;

        if comparator::score(recognition, user_answer) == MATCH {
            self.correct += 1;
        }
    }

    /// Correct over ALL images, so failed runs count against the method
    fn accuracy(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.correct as f64 / total as f64 * 100.0
    }

    fn average_time(&self) -> f64 {
        if self.successful == 0 {
            return 0.0;
        }
        self.total_time / self.successful as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Aggregate a batch of per-image comparisons into a difficulty report
///
/// `user_answers` is paired positionally with `results`; images without an
/// answer are scored against the empty string. Returns `None` for an empty
/// batch.
pub fn analyze_difficulty(results: &[ImageComparison], user_answers: &[String]) -> Option<BatchReport> {
    let total = results.len();
    if total == 0 {
        return None;
    }

    let mut method1 = MethodTally::default();
    let mut method2 = MethodTally::default();

    for (i, result) in results.iter().enumerate() {
        let user_answer = user_answers.get(i).map(String::as_str).unwrap_or("");
        method1.record(&result.algorithm_1, user_answer);
        method2.record(&result.algorithm_2, user_answer);
    }

    let method1_accuracy = method1.accuracy(total);
    let method2_accuracy = method2.accuracy(total);
    let (difficulty, recommendation) = classify(method1_accuracy, method2_accuracy);

    Some(BatchReport {
        difficulty,
        method1_accuracy: round_to(method1_accuracy, 2),
        method2_accuracy: round_to(method2_accuracy, 2),
        method1_avg_time: round_to(method1.average_time(), 3),
        method2_avg_time: round_to(method2.average_time(), 3),
        total_captchas: total,
        method1_successful: method1.successful,
        method2_successful: method2.successful,
        method1_correct: method1.correct,
        method2_correct: method2.correct,
        recommendation: recommendation.to_string(),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ok(text: &str, time: f64) -> Recognition {
        Recognition::success(text, None, time)
    }

    fn failed() -> Recognition {
        Recognition::failure("No text detected", 0.1)
    }

    fn comparison(method1: Recognition, method2: Recognition) -> ImageComparison {
        ImageComparison::new(method1, method2, "", "captcha.png")
    }

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_batch_has_no_report() {
        assert!(analyze_difficulty(&[], &[]).is_none());
        assert!(analyze_difficulty(&[], &answers(&["abc"])).is_none());
    }

    #[test]
    fn test_easy_batch_with_detection_failure() {
        // Method 1: 4/5 correct, one detection failure. Method 2: 3/5 correct.
        let results = vec![
            comparison(ok("a1", 1.0), ok("a1", 2.0)),
            comparison(ok("b2", 1.0), ok("b2", 2.0)),
            comparison(ok("c3", 1.0), ok("c3", 2.0)),
            comparison(ok("d4", 1.0), ok("xx", 2.0)),
            comparison(failed(), ok("yy", 2.0)),
        ];
        let user_answers = answers(&["a1", "b2", "c3", "d4", "e5"]);

        let report = analyze_difficulty(&results, &user_answers).unwrap();

        assert_eq!(report.difficulty, Difficulty::Easy);
        assert_eq!(report.method1_accuracy, 80.0);
        assert_eq!(report.method2_accuracy, 60.0);
        assert_eq!(report.total_captchas, 5);
        assert_eq!(report.method1_successful, 4);
        assert_eq!(report.method2_successful, 5);
        assert_eq!(report.method1_correct, 4);
        assert_eq!(report.method2_correct, 3);
        assert_eq!(
            report.recommendation,
            "Image Processing Method-1 works excellently for these captchas with high accuracy"
        );
    }

    #[test]
    fn test_method2_significantly_better() {
        let results = vec![
            comparison(ok("a", 0.5), ok("a", 1.0)),
            comparison(ok("zz", 0.5), ok("b", 1.0)),
            comparison(ok("zz", 0.5), ok("c", 1.0)),
            comparison(ok("zz", 0.5), ok("zz", 1.0)),
        ];
        let user_answers = answers(&["a", "b", "c", "d"]);

        let report = analyze_difficulty(&results, &user_answers).unwrap();

        assert_eq!(report.method1_accuracy, 25.0);
        assert_eq!(report.method2_accuracy, 75.0);
        assert_eq!(report.difficulty, Difficulty::Medium);
        assert_eq!(
            report.recommendation,
            "Image Processing Method-2 performs significantly better than Method-1 for these captchas"
        );
    }

    #[test]
    fn test_accuracy_counts_failures_against_method() {
        // 1 correct out of 3, even though only one run succeeded
        let results = vec![
            comparison(ok("abc", 1.0), failed()),
            comparison(failed(), failed()),
            comparison(failed(), failed()),
        ];

        let report = analyze_difficulty(&results, &answers(&["abc", "def", "ghi"])).unwrap();

        assert_eq!(report.method1_accuracy, 33.33);
        assert_eq!(report.method1_successful, 1);
        assert_eq!(report.method1_correct, 1);
        assert_eq!(report.method2_accuracy, 0.0);
        assert_eq!(report.method2_avg_time, 0.0);
        assert_eq!(report.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_average_time_excludes_failures() {
        let results = vec![
            comparison(ok("a", 1.0), ok("a", 0.25)),
            comparison(ok("b", 3.0), ok("b", 0.5)),
            comparison(failed(), ok("c", 0.75)),
        ];

        let report = analyze_difficulty(&results, &answers(&["a", "b", "c"])).unwrap();

        assert_eq!(report.method1_avg_time, 2.0);
        assert_eq!(report.method2_avg_time, 0.5);
    }

    #[test]
    fn test_average_time_rounds_to_milliseconds() {
        let results = vec![
            comparison(ok("a", 0.1234), ok("a", 1.0)),
            comparison(ok("b", 0.2), ok("b", 1.0)),
        ];

        let report = analyze_difficulty(&results, &answers(&["a", "b"])).unwrap();
        assert_eq!(report.method1_avg_time, 0.162);
    }

    #[test]
    fn test_missing_answers_default_to_empty() {
        let results = vec![
            comparison(ok("a", 1.0), ok("a", 1.0)),
            comparison(ok("b", 1.0), ok("b", 1.0)),
        ];

        // Second image has no answer, so it cannot be correct
        let report = analyze_difficulty(&results, &answers(&["a"])).unwrap();

        assert_eq!(report.method1_correct, 1);
        assert_eq!(report.method2_correct, 1);
        assert_eq!(report.method1_accuracy, 50.0);
    }

    #[test]
    fn test_answers_are_positional_not_embedded() {
        // The per-result user_answer field is ignored by the aggregator
        let results = vec![ImageComparison::new(ok("abc", 1.0), ok("abc", 1.0), "abc", "a.png")];

        let report = analyze_difficulty(&results, &[]).unwrap();
        assert_eq!(report.method1_correct, 0);
    }

    #[test]
    fn test_timestamp_format() {
        let results = vec![comparison(ok("a", 1.0), ok("a", 1.0))];
        let report = analyze_difficulty(&results, &answers(&["a"])).unwrap();

        assert!(NaiveDateTime::parse_from_str(&report.timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn test_classify_rules_in_order() {
        assert_eq!(classify(100.0, 0.0).0, Difficulty::Easy);
        assert_eq!(classify(80.0, 100.0).0, Difficulty::Easy);
        assert_eq!(classify(79.99, 70.0).0, Difficulty::Medium);
        assert_eq!(
            classify(60.0, 60.0).1,
            "Both methods show moderate performance. Consider combining results or preprocessing images"
        );
        assert_eq!(classify(54.99, 54.99).0, Difficulty::Hard);
        assert_eq!(
            classify(0.0, 0.0).1,
            "Both methods struggle significantly. Consider specialized preprocessing or alternative approaches"
        );
    }

    #[test]
    fn test_classify_one_method_moderate() {
        let (difficulty, recommendation) = classify(60.0, 40.0);
        assert_eq!(difficulty, Difficulty::Medium);
        assert_eq!(
            recommendation,
            "Image Processing Method-1 shows better performance. Focus on optimizing this approach"
        );

        let (difficulty, recommendation) = classify(40.0, 60.0);
        assert_eq!(difficulty, Difficulty::Medium);
        assert_eq!(
            recommendation,
            "Image Processing Method-2 shows better performance. This method is more suitable"
        );
    }

    #[test]
    fn test_method_tally() {
        let mut tally = MethodTally::default();
        tally.record(&ok("abc", 2.0), "ABC");
        tally.record(&ok("abd", 4.0), "abc");
        tally.record(&failed(), "abc");

        assert_eq!(tally.successful, 2);
        assert_eq!(tally.correct, 1);
        assert_eq!(tally.average_time(), 3.0);
        assert_eq!(tally.accuracy(4), 25.0);
        assert_eq!(MethodTally::default().accuracy(0), 0.0);
    }
}
