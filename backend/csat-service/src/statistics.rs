use std::collections::HashMap;

use crate::models::{Question, QuestionStatistics, RatingCount};

/// Fold per-rating counts into per-question statistics, keeping question order.
/// Questions without answers report zero counts and a 0.0 average.
pub fn summarize(questions: Vec<Question>, counts: &[RatingCount]) -> Vec<QuestionStatistics> {
    let mut distributions: HashMap<i32, [i64; 5]> = HashMap::new();
    for count in counts {
        if !(1..=5).contains(&count.rating) {
            continue;
        }
        let bucket = distributions.entry(count.question_id).or_insert([0; 5]);
        bucket[(count.rating - 1) as usize] += count.answers;
    }

    questions
        .into_iter()
        .map(|q| {
            let distribution = distributions.get(&q.id).copied().unwrap_or([0; 5]);
            let answers: i64 = distribution.iter().sum();
            let weighted: i64 = distribution
                .iter()
                .enumerate()
                .map(|(i, n)| (i as i64 + 1) * n)
                .sum();
            let average = if answers == 0 {
                0.0
            } else {
                weighted as f64 / answers as f64
            };
            QuestionStatistics {
                question_id: q.id,
                text: q.text,
                answers,
                average,
                distribution,
            }
        })
        .collect()
}
