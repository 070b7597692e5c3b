use std::fmt;

use serde::Serialize;
use smartcore::metrics::accuracy::Accuracy;
use smartcore::metrics::Metrics as _;
use spam_data_clean::{FeatureVector, Label};
use tracing::info;

use crate::select::TrainedModel;
use crate::Error;

/// Precision, recall, f1 and support of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<(Label, ClassScores)>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

/// Held-out scores. Precision, recall and f1 treat spam as the positive
/// class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub report: ClassificationReport,
}

impl Metrics {
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        let y_true: Vec<u32> = truth.iter().map(|label| label.code()).collect();
        let y_pred: Vec<u32> = predicted.iter().map(|label| label.code()).collect();
        let accuracy = if y_true.is_empty() {
            0.0
        } else {
            Accuracy::<u32>::new().get_score(&y_true, &y_pred)
        };

        let classes: Vec<(Label, ClassScores)> = Label::ALL
            .iter()
            .map(|&label| (label, class_scores(label, truth, predicted)))
            .collect();
        let spam = class_scores(Label::Spam, truth, predicted);

        Self {
            accuracy,
            precision: spam.precision,
            recall: spam.recall,
            f1: spam.f1,
            report: ClassificationReport {
                macro_avg: average(&classes, |_| 1.0),
                weighted_avg: average(&classes, |scores| scores.support as f64),
                classes,
                accuracy,
            },
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_scores(label: Label, truth: &[Label], predicted: &[Label]) -> ClassScores {
    let pairs = || truth.iter().zip(predicted);
    let true_positive = pairs().filter(|(t, p)| **t == label && **p == label).count();
    let predicted_positive = predicted.iter().filter(|&&p| p == label).count();
    let support = truth.iter().filter(|&&t| t == label).count();

    let precision = ratio(true_positive, predicted_positive);
    let recall = ratio(true_positive, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassScores {
        precision,
        recall,
        f1,
        support,
    }
}

fn average(classes: &[(Label, ClassScores)], weight: impl Fn(&ClassScores) -> f64) -> ClassScores {
    let total: f64 = classes.iter().map(|(_, scores)| weight(scores)).sum();
    let mean = |field: fn(&ClassScores) -> f64| {
        if total == 0.0 {
            return 0.0;
        }
        classes
            .iter()
            .map(|(_, scores)| field(scores) * weight(scores))
            .sum::<f64>()
            / total
    };
    ClassScores {
        precision: mean(|s| s.precision),
        recall: mean(|s| s.recall),
        f1: mean(|s| s.f1),
        support: classes.iter().map(|(_, scores)| scores.support).sum(),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, scores) in &self.classes {
            write_row(f, &label.to_string(), scores)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, scores: &ClassScores) -> fmt::Result {
    writeln!(
        f,
        "{:>12}{:>10.2}{:>10.2}{:>10.2}{:>10}",
        name, scores.precision, scores.recall, scores.f1, scores.support
    )
}

/// Scores `model` on the untouched test split and logs the results.
pub fn evaluate(
    model: &TrainedModel,
    vectors: &[FeatureVector],
    labels: &[Label],
) -> Result<Metrics, Error> {
    let predicted = model.predict(vectors).map_err(Error::Evaluate)?;
    let metrics = Metrics::from_predictions(labels, &predicted);

    info!("Model Evaluation Metrics:");
    info!("Accuracy: {:.4}", metrics.accuracy);
    info!("Precision: {:.4}", metrics.precision);
    info!("Recall: {:.4}", metrics.recall);
    info!("F1 Score: {:.4}", metrics.f1);
    info!("\n{}", metrics.report);
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Ham, Spam};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn binary_scores() {
        let truth = [Spam, Spam, Spam, Ham, Ham];
        let predicted = [Spam, Spam, Ham, Ham, Spam];
        let metrics = Metrics::from_predictions(&truth, &predicted);
        assert!(close(metrics.accuracy, 0.6));
        assert!(close(metrics.precision, 2.0 / 3.0));
        assert!(close(metrics.recall, 2.0 / 3.0));
        assert!(close(metrics.f1, 2.0 / 3.0));

        let (label, ham) = metrics.report.classes[0];
        assert_eq!(label, Ham);
        assert!(close(ham.precision, 0.5));
        assert_eq!(ham.support, 2);
        assert!(close(metrics.report.macro_avg.recall, (0.5 + 2.0 / 3.0) / 2.0));
        assert!(close(
            metrics.report.weighted_avg.recall,
            (0.5 * 2.0 + 2.0 / 3.0 * 3.0) / 5.0
        ));
    }

    #[test]
    fn no_positive_predictions_score_zero() {
        let metrics = Metrics::from_predictions(&[Spam, Ham], &[Ham, Ham]);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert!(close(metrics.accuracy, 0.5));
    }

    #[test]
    fn failed_prediction_keeps_its_source() {
        use std::error::Error as _;

        use crate::balance::ClassWeights;
        use crate::select::{Candidate, SelectError};

        let vectors = vec![
            FeatureVector::from_entries(2, [(0, 1.0)]),
            FeatureVector::from_entries(2, [(1, 1.0)]),
        ];
        let candidate = Candidate {
            n_trees: 3,
            max_depth: None,
            min_samples_split: 2,
        };
        let model =
            TrainedModel::fit(&vectors, &[Ham, Spam], candidate, &ClassWeights::uniform(), 42)
                .unwrap();

        let err = evaluate(&model, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Evaluate(SelectError::Data(spam_data_clean::Error::EmptyMatrix))
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn report_layout() {
        let metrics = Metrics::from_predictions(&[Spam, Ham, Ham], &[Spam, Ham, Ham]);
        let report = metrics.report.to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines[0],
            "             precision    recall  f1-score   support"
        );
        assert_eq!(
            lines[2],
            "        safe      1.00      1.00      1.00         2"
        );
        assert_eq!(
            lines[5],
            "    accuracy                          1.00         3"
        );
        assert_eq!(lines.len(), 8);
    }
}
