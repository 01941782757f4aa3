//! Case-insensitive substring search over question text.

use crate::models::Question;

/// Every question whose text contains `term`, ignoring case, in input order.
/// Search results are never paginated.
pub fn filter_questions<'a>(questions: &'a [Question], term: &str) -> Vec<&'a Question> {
    let needle = term.to_lowercase();
    questions
        .iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect()
}
