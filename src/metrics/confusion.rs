use log::warn;
use serde::Serialize;

use crate::math::arg_max;

/// Expected-class × predicted-class count table with per-class
/// TP/TN/FP/FN tallies.
///
/// Counts accumulate through [`add_result`](Self::add_result); the tallies
/// are only valid after [`update_result_params`](Self::update_result_params).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<u64>>,
    true_positive: Vec<u64>,
    true_negative: Vec<u64>,
    false_positive: Vec<u64>,
    false_negative: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::default();
        cm.build(classes);
        cm
    }

    /// Reshapes to `classes × classes`, all zero.
    pub fn build(&mut self, classes: usize) {
        self.matrix = vec![vec![0; classes]; classes];
        self.true_positive = vec![0; classes];
        self.true_negative = vec![0; classes];
        self.false_positive = vec![0; classes];
        self.false_negative = vec![0; classes];
    }

    /// Zeroes every count, keeping the shape.
    pub fn reset(&mut self) {
        let classes = self.classes();
        self.build(classes);
    }

    /// Drops the shape entirely.
    pub fn clean(&mut self) {
        self.build(0);
    }

    pub fn classes(&self) -> usize {
        self.matrix.len()
    }

    pub fn matrix(&self) -> &[Vec<u64>] {
        &self.matrix
    }

    pub fn true_positive(&self) -> &[u64] {
        &self.true_positive
    }

    pub fn true_negative(&self) -> &[u64] {
        &self.true_negative
    }

    pub fn false_positive(&self) -> &[u64] {
        &self.false_positive
    }

    pub fn false_negative(&self) -> &[u64] {
        &self.false_negative
    }

    /// Records one example given as `(expected, predicted)` pairs, one per class.
    pub fn add_result(&mut self, result: &[(f64, f64)]) {
        if result.len() != self.classes() {
            warn!(
                "confusion matrix expects {} outputs per result, got {}",
                self.classes(),
                result.len()
            );
            return;
        }
        let expected: Vec<f64> = result.iter().map(|r| r.0).collect();
        let predicted: Vec<f64> = result.iter().map(|r| r.1).collect();
        self.add_vectors(&expected, &predicted);
    }

    /// Arg-max decomposes both vectors and increments `matrix[expected][predicted]`.
    pub fn add_vectors(&mut self, expected: &[f64], predicted: &[f64]) {
        let classes = self.classes();
        if expected.len() != classes || predicted.len() != classes {
            warn!("confusion matrix vectors do not match {classes} classes");
            return;
        }
        // an all-non-positive vector has no class and is not counted
        if let (Some(row), Some(col)) = (arg_max(expected), arg_max(predicted)) {
            self.matrix[row][col] += 1;
        }
    }

    /// Recomputes TP/TN/FP/FN from the current counts.
    pub fn update_result_params(&mut self) {
        let classes = self.classes();
        let total: u64 = self.matrix.iter().flatten().sum();
        for c in 0..classes {
            let tp = self.matrix[c][c];
            let fp = (0..classes).filter(|&r| r != c).map(|r| self.matrix[r][c]).sum::<u64>();
            let fn_ = (0..classes).filter(|&k| k != c).map(|k| self.matrix[c][k]).sum::<u64>();
            self.true_positive[c] = tp;
            self.false_positive[c] = fp;
            self.false_negative[c] = fn_;
            self.true_negative[c] = total - tp - fp - fn_;
        }
    }

    fn counts(&self, class: usize) -> Option<(f64, f64, f64, f64)> {
        if class >= self.classes() {
            return None;
        }
        Some((
            self.true_positive[class] as f64,
            self.true_negative[class] as f64,
            self.false_positive[class] as f64,
            self.false_negative[class] as f64,
        ))
    }

    pub fn class_accuracy(&self, class: usize) -> f64 {
        self.counts(class)
            .map_or(0.0, |(tp, tn, fp, fn_)| ratio(tp + tn, tp + tn + fp + fn_))
    }

    pub fn class_precision(&self, class: usize) -> f64 {
        self.counts(class).map_or(0.0, |(tp, _, fp, _)| ratio(tp, tp + fp))
    }

    pub fn class_recall(&self, class: usize) -> f64 {
        self.counts(class).map_or(0.0, |(tp, _, _, fn_)| ratio(tp, tp + fn_))
    }

    pub fn class_specificity(&self, class: usize) -> f64 {
        self.counts(class).map_or(0.0, |(_, tn, fp, _)| ratio(tn, tn + fp))
    }

    pub fn class_false_alarm(&self, class: usize) -> f64 {
        self.counts(class).map_or(0.0, |(_, tn, fp, _)| ratio(fp, tn + fp))
    }

    pub fn class_f1(&self, class: usize) -> f64 {
        let precision = self.class_precision(class);
        let recall = self.class_recall(class);
        ratio(2.0 * precision * recall, precision + recall)
    }

    pub fn overall_accuracy(&self) -> f64 {
        self.mean_over_classes(Self::class_accuracy)
    }

    pub fn overall_precision(&self) -> f64 {
        self.mean_over_classes(Self::class_precision)
    }

    pub fn overall_recall(&self) -> f64 {
        self.mean_over_classes(Self::class_recall)
    }

    pub fn overall_specificity(&self) -> f64 {
        self.mean_over_classes(Self::class_specificity)
    }

    pub fn overall_false_alarm(&self) -> f64 {
        self.mean_over_classes(Self::class_false_alarm)
    }

    pub fn overall_f1(&self) -> f64 {
        self.mean_over_classes(Self::class_f1)
    }

    fn mean_over_classes(&self, metric: fn(&Self, usize) -> f64) -> f64 {
        let classes = self.classes();
        if classes == 0 {
            return 0.0;
        }
        (0..classes).map(|c| metric(self, c)).sum::<f64>() / classes as f64
    }
}

/// `num / den`, or 0 when the denominator is zero.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
