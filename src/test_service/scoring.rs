/// Percentage of correctly answered questions, rounded to the nearest integer.
///
/// Unanswered questions count as wrong. A template without questions scores 0.
pub fn calculate_score(correct_answers: i64, total_questions: i64) -> i64 {
    if total_questions <= 0 {
        return 0;
    }

    let correct = correct_answers.clamp(0, total_questions);
    ((correct as f64 / total_questions as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_template_scores_zero() {
        assert_eq!(calculate_score(0, 0), 0);
    }

    #[test]
    fn score_is_rounded_percentage() {
        assert_eq!(calculate_score(1, 3), 33);
        assert_eq!(calculate_score(2, 3), 67);
        assert_eq!(calculate_score(3, 4), 75);
        assert_eq!(calculate_score(4, 4), 100);
        assert_eq!(calculate_score(0, 5), 0);
    }
}
