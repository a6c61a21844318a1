use crate::analysis::tokenizer::tokenize_single;
use crate::query::ast::{BooleanType, QueryPlan};

/// Turns a raw query string into a `QueryPlan` (§4.7). `AND`/`OR` are
/// case-insensitive and set the plan's boolean type, later ones overriding
/// earlier; `NOT` marks the next non-operator word as an exclude term.
/// `NOT` followed directly by another operator drops its exclusion intent
/// instead of carrying it to the word after the operator (§9 open
/// question, resolved per spec.md's own guidance); an unresolved trailing
/// `NOT` is silently dropped.
pub struct QueryParser;

impl QueryParser {
    pub fn parse(raw: &str) -> QueryPlan {
        let mut query_type = BooleanType::And;
        let mut include_terms = Vec::new();
        let mut exclude_terms = Vec::new();
        let mut pending_exclude = false;

        for word in raw.split_whitespace() {
            if word.eq_ignore_ascii_case("AND") {
                query_type = BooleanType::And;
                pending_exclude = false;
                continue;
            }
            if word.eq_ignore_ascii_case("OR") {
                query_type = BooleanType::Or;
                pending_exclude = false;
                continue;
            }
            if word.eq_ignore_ascii_case("NOT") {
                pending_exclude = true;
                continue;
            }

            if let Some(term) = tokenize_single(word) {
                if pending_exclude {
                    exclude_terms.push(term);
                } else {
                    include_terms.push(term);
                }
            }
            pending_exclude = false;
        }

        QueryPlan {
            raw_query: raw.to_string(),
            query_type,
            include_terms,
            exclude_terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_and() {
        let plan = QueryParser::parse("cat dog");
        assert_eq!(plan.query_type, BooleanType::And);
        assert_eq!(plan.include_terms, vec!["cat", "dog"]);
    }

    #[test]
    fn or_union() {
        let plan = QueryParser::parse("cat OR dogs");
        assert_eq!(plan.query_type, BooleanType::Or);
        assert_eq!(plan.include_terms, vec!["cat", "dog"]);
    }

    #[test]
    fn not_excludes_next_word() {
        let plan = QueryParser::parse("apple NOT juice");
        assert_eq!(plan.include_terms, vec!["apple"]);
        assert_eq!(plan.exclude_terms, vec!["juice"]);
    }

    #[test]
    fn not_followed_by_operator_drops_exclusion() {
        let plan = QueryParser::parse("apple NOT AND juice");
        assert_eq!(plan.query_type, BooleanType::And);
        assert_eq!(plan.include_terms, vec!["apple", "juice"]);
        assert!(plan.exclude_terms.is_empty());
    }

    #[test]
    fn trailing_not_is_dropped() {
        let plan = QueryParser::parse("apple NOT");
        assert_eq!(plan.include_terms, vec!["apple"]);
        assert!(plan.exclude_terms.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let plan = QueryParser::parse("   ");
        assert!(plan.is_empty());
        assert!(plan.exclude_terms.is_empty());
    }
}
