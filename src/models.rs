use diesel::{Insertable, Queryable};
use serde_derive::Serialize;
use serde_json::Value;

use crate::schema::{categories, questions};

/// A stored trivia question. `category` is a loose reference to
/// [`Category::id`] in string form; nothing checks that it resolves.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub difficulty: Option<i32>,
}

#[derive(Insertable, Debug)]
#[table_name = "questions"]
pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub category: Option<&'a str>,
    pub difficulty: Option<i32>,
}

#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub type_: String,
}

#[derive(Insertable, Debug)]
#[table_name = "categories"]
pub struct NewCategory<'a> {
    pub id: i32,
    pub type_: &'a str,
}

/// String form of a loosely typed category id as sent by clients: strings are
/// kept as they are, integers are formatted. Anything else has no key.
pub fn category_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string())),
        _ => None,
    }
}

/// Difficulty as sent by clients: an integer, or a string holding one.
/// Anything the integer column cannot hold has no value.
pub fn difficulty_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_keys() {
        assert_eq!(category_key(&json!("4")).as_deref(), Some("4"));
        assert_eq!(category_key(&json!(4)).as_deref(), Some("4"));
        assert_eq!(category_key(&json!(2.5)), None);
        assert_eq!(category_key(&json!(true)), None);
        assert_eq!(category_key(&json!(null)), None);
    }

    #[test]
    fn difficulty_values() {
        assert_eq!(difficulty_value(&json!(3)), Some(3));
        assert_eq!(difficulty_value(&json!("3")), Some(3));
        assert_eq!(difficulty_value(&json!(" 5 ")), Some(5));
        assert_eq!(difficulty_value(&json!(-1)), Some(-1));
        assert_eq!(difficulty_value(&json!("hard")), None);
        assert_eq!(difficulty_value(&json!(2.5)), None);
        assert_eq!(difficulty_value(&json!(1_u64 << 40)), None);
        assert_eq!(difficulty_value(&json!([3])), None);
    }

    #[test]
    fn question_serializes_with_nulls() {
        let question = Question {
            id: 9,
            question: "What is the heaviest organ in the human body?".to_owned(),
            answer: "The Liver".to_owned(),
            category: None,
            difficulty: None,
        };

        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            json!({
                "id": 9,
                "question": "What is the heaviest organ in the human body?",
                "answer": "The Liver",
                "category": null,
                "difficulty": null,
            })
        );
    }
}
