//! Quiz play: serve one random question the player has not seen yet.
//!
//! A round starts from a candidate pool, either every question or the
//! questions of one category. The player's history is a list of entries that
//! are either question texts (what older clients send) or question ids. A
//! draw only ever returns a candidate that matches no history entry.

use std::collections::HashSet;

use log::debug;
use rand::{seq::SliceRandom, Rng};
use serde_derive::Deserialize;
use serde_json::Value;

use crate::models::{category_key, Question};

/// Body of `POST /quizzes`.
#[derive(Deserialize, Debug)]
pub struct QuizRequest {
    pub quiz_category: Option<QuizCategory>,
    pub previous_questions: Option<Vec<Served>>,
}

#[derive(Deserialize, Debug)]
pub struct QuizCategory {
    pub id: Value,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

/// One entry of the player's history. Entries that are neither a question
/// id nor a text still count towards the history size but match nothing.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Served {
    Id(i32),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    /// Any id that reads as the integer 0 means "no filter". `None` when the
    /// id is neither a string nor an integer.
    pub fn from_id(id: &Value) -> Option<Self> {
        let key = category_key(id)?;
        if key.trim().parse::<i64>().ok() == Some(0) {
            Some(CategoryFilter::All)
        } else {
            Some(CategoryFilter::Only(key))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Pick<'a> {
    Found(&'a Question),
    Exhausted,
}

impl<'a> Pick<'a> {
    pub fn question(self) -> Option<&'a Question> {
        match self {
            Pick::Found(q) => Some(q),
            Pick::Exhausted => None,
        }
    }
}

struct History<'s> {
    texts: HashSet<&'s str>,
    ids: HashSet<i32>,
}

impl<'s> History<'s> {
    fn new(served: &'s [Served]) -> Self {
        let mut texts = HashSet::new();
        let mut ids = HashSet::new();
        for entry in served {
            match entry {
                Served::Id(id) => {
                    ids.insert(*id);
                }
                Served::Text(text) => {
                    texts.insert(text.as_str());
                }
                Served::Other(_) => {}
            }
        }
        Self { texts, ids }
    }

    fn contains(&self, question: &Question) -> bool {
        self.ids.contains(&question.id) || self.texts.contains(question.question.as_str())
    }
}

/// Draws uniformly from the candidates not yet served.
///
/// A pool no larger than the history counts as exhausted, even if some of the
/// history entries belong to other categories.
pub fn pick<'a, R: Rng + ?Sized>(pool: &'a [Question], served: &[Served], rng: &mut R) -> Pick<'a> {
    if pool.len() <= served.len() {
        debug!("Pool of {} covered by {} served entries", pool.len(), served.len());
        return Pick::Exhausted;
    }

    let history = History::new(served);
    let unserved: Vec<&Question> = pool.iter().filter(|q| !history.contains(q)).collect();
    debug!("{} of {} candidates unserved", unserved.len(), pool.len());

    match unserved.choose(rng) {
        Some(&question) => Pick::Found(question),
        // Only reachable when served texts are shared by several candidates.
        None => Pick::Exhausted,
    }
}
