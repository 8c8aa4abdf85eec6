use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;

/// Display predicate attached to a question, evaluated against the answers
/// collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    LiteralBool { value: bool },
    AnswerEquals { key: String, value: String },
    Answered { key: String },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
}

impl Expr {
    pub fn answer_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::AnswerEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Evaluates the predicate. Unanswered keys never equal anything.
    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        match self {
            Expr::LiteralBool { value } => *value,
            Expr::AnswerEquals { key, value } => answers.get(key) == Some(value.as_str()),
            Expr::Answered { key } => answers.contains(key),
            Expr::And { expressions } => expressions.iter().all(|expr| expr.evaluate(answers)),
            Expr::Or { expressions } => expressions.iter().any(|expr| expr.evaluate(answers)),
            Expr::Not { expression } => !expression.evaluate(answers),
        }
    }

    /// Every answer key the predicate reads.
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            Expr::LiteralBool { .. } => {}
            Expr::AnswerEquals { key, .. } | Expr::Answered { key } => keys.push(key),
            Expr::And { expressions } | Expr::Or { expressions } => {
                for expr in expressions {
                    expr.collect_keys(keys);
                }
            }
            Expr::Not { expression } => expression.collect_keys(keys),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn answer_equals_requires_matching_answer() {
        let expr = Expr::answer_equals("dandruff", "Yes");
        assert!(!expr.evaluate(&AnswerMap::new()));
        assert!(!expr.evaluate(&answers(&[("dandruff", "No")])));
        assert!(expr.evaluate(&answers(&[("dandruff", "Yes")])));
    }

    #[test]
    fn combinators_compose() {
        let expr = Expr::And {
            expressions: vec![
                Expr::Answered { key: "goal".into() },
                Expr::Not {
                    expression: Box::new(Expr::answer_equals("hair_fall", "No")),
                },
            ],
        };
        assert!(expr.evaluate(&answers(&[("goal", "Regrow Hair")])));
        assert!(!expr.evaluate(&answers(&[("goal", "Regrow Hair"), ("hair_fall", "No")])));
        assert_eq!(expr.referenced_keys(), vec!["goal", "hair_fall"]);
    }

    #[test]
    fn deserializes_from_tagged_json() {
        let expr: Expr = serde_json::from_str(
            r#"{"op": "or", "expressions": [{"op": "literal_bool", "value": false}, {"op": "answered", "key": "goal"}]}"#,
        )
        .expect("expr");
        assert!(expr.evaluate(&answers(&[("goal", "x")])));
    }
}
