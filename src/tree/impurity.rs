/// Gini impurity of a class histogram together with a human-readable
/// derivation, e.g. `1 - ((3/4)^2 + (1/4)^2) = 1 - (0.750^2 + 0.250^2) = 0.375`.
pub fn gini_formula(counts: &[u64]) -> (f64, String) {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return (0.0, String::from("0"));
    }

    let probs: Vec<f64> = counts
        .iter()
        .map(|&count| count as f64 / total as f64)
        .collect();
    let gini = 1.0 - probs.iter().map(|p| p * p).sum::<f64>();

    let fractions = counts
        .iter()
        .map(|count| format!("({count}/{total})^2"))
        .collect::<Vec<_>>()
        .join(" + ");
    let numbers = probs
        .iter()
        .map(|p| format!("{p:.3}^2"))
        .collect::<Vec<_>>()
        .join(" + ");

    (gini, format!("1 - ({fractions}) = 1 - ({numbers}) = {gini:.3}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_node_has_zero_impurity() {
        let (gini, _) = gini_formula(&[10, 0, 0]);
        assert!(gini.abs() < 1e-12);
    }

    #[test]
    fn derivation_lists_every_class() {
        let (gini, calc) = gini_formula(&[3, 1]);
        assert!((gini - 0.375).abs() < 1e-12);
        assert_eq!(
            calc,
            "1 - ((3/4)^2 + (1/4)^2) = 1 - (0.750^2 + 0.250^2) = 0.375"
        );
    }

    #[test]
    fn empty_histogram() {
        assert_eq!(gini_formula(&[0, 0, 0]), (0.0, String::from("0")));
    }
}
