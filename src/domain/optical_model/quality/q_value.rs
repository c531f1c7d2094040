use serde::{Deserialize, Serialize};
use std::fmt;

/// Q-value of a signal together with the threshold it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QValue {
    pub q: f64,
    pub threshold: f64,
}

impl QValue {
    pub fn new(q: f64, threshold: f64) -> Self {
        Self { q, threshold }
    }

    pub fn margin(&self) -> f64 {
        self.q - self.threshold
    }

    pub fn meets_threshold(&self) -> bool {
        self.q >= self.threshold
    }

    /// The more pessimistic of two directions.
    pub fn lower(self, other: QValue) -> QValue {
        if other.q < self.q { other } else { self }
    }
}

impl fmt::Display for QValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qvalue={:.3} Qmargin={:.3}", self.q, self.margin())
    }
}

/// Evaluates the OSNR to Q polynomial. `constants` are ordered from the
/// highest degree down to the constant term.
pub fn calc_q(constants: &[f64], osnr: f64) -> f64 {
    constants.iter().fold(0.0, |acc, c| acc * osnr + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_q_matches_direct_evaluation() {
        let constants = [0.002, -0.1, 1.5, -2.0];
        for osnr in [0.0_f64, 12.5, 18.0, 25.3] {
            let expected = 0.002 * osnr.powi(3) - 0.1 * osnr.powi(2) + 1.5 * osnr - 2.0;
            assert!((calc_q(&constants, osnr) - expected).abs() < 1e-9, "Q mismatch at OSNR {}", osnr);
        }
    }

    #[test]
    fn test_constant_polynomial() {
        assert_eq!(calc_q(&[8.5], 19.7), 8.5);
        assert_eq!(calc_q(&[], 19.7), 0.0);
    }

    #[test]
    fn test_margin_and_lower() {
        let forward = QValue::new(8.5, 7.0);
        let backward = QValue::new(8.1, 7.0);
        assert!((forward.margin() - 1.5).abs() < 1e-12);
        assert_eq!(forward.lower(backward), backward);
        assert_eq!(forward.to_string(), "Qvalue=8.500 Qmargin=1.500");
    }
}
