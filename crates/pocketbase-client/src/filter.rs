// Structured filter expressions.
//
// Callers build filters from typed clauses; values are never spliced into a
// query string by hand. The PocketBase dialect is produced only by
// `to_expr`, which quotes and escapes string values. Stores that evaluate
// records locally (e.g. the in-memory test store) match on the clauses
// directly and never see the string form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single exact-match condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub value: Value,
}

/// An AND-combined list of equality clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    /// An empty filter (matches everything).
    pub fn all() -> Self {
        Self::default()
    }

    /// Single equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    /// Add another equality clause, AND-combined.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FilterClause {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The underlying clauses, for stores that match records structurally.
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Render the PocketBase filter dialect: clauses joined with `&&`,
    /// string values double-quoted with `\` and `"` escaped.
    pub fn to_expr(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{} = {}", c.field, render_value(&c.value)))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", escape(s)),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => format!("\"{}\"", escape(&other.to_string())),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clause() {
        let f = Filter::eq("user_email", "alice@example.com");
        assert_eq!(f.to_expr(), "user_email = \"alice@example.com\"");
    }

    #[test]
    fn test_and_combined() {
        let f = Filter::eq("account_provider", "github")
            .and_eq("account_provider_account_id", "gh-42");
        assert_eq!(
            f.to_expr(),
            "account_provider = \"github\" && account_provider_account_id = \"gh-42\""
        );
        assert_eq!(f.clauses().len(), 2);
    }

    #[test]
    fn test_escapes_quotes_and_backslashes() {
        let f = Filter::eq("user_name", "a\"b\\c");
        assert_eq!(f.to_expr(), "user_name = \"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_injection_attempt_stays_inert() {
        // A hostile value must stay inside the quoted literal.
        let f = Filter::eq("user_email", "\" || user_email != \"");
        assert_eq!(
            f.to_expr(),
            "user_email = \"\\\" || user_email != \\\"\""
        );
    }

    #[test]
    fn test_non_string_values() {
        assert_eq!(Filter::eq("authenticator_counter", 7).to_expr(), "authenticator_counter = 7");
        assert_eq!(
            Filter::eq("authenticator_credential_backed_up", true).to_expr(),
            "authenticator_credential_backed_up = true"
        );
    }

    #[test]
    fn test_empty_filter() {
        let f = Filter::all();
        assert!(f.is_empty());
        assert_eq!(f.to_expr(), "");
    }
}
