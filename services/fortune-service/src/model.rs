use serde::{Deserialize, Serialize};

/// A fortune: a saying plus an optional attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortune {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_is_optional_on_the_wire() {
        let anon: Fortune = serde_json::from_str(r#"{"text":"know thyself"}"#).unwrap();
        assert_eq!(anon.author, None);
        assert!(!serde_json::to_string(&anon).unwrap().contains("author"));

        let named: Fortune =
            serde_json::from_str(r#"{"text":"know thyself","author":"Thales"}"#).unwrap();
        assert_eq!(named.author.as_deref(), Some("Thales"));
    }
}
