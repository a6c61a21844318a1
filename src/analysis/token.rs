/// A normalized term paired with its zero-based ordinal within the surviving
/// token stream of a document (stop-words and discarded short tokens do not
/// advance position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: u32,
}

impl Token {
    pub fn new(term: String, position: u32) -> Self {
        Token { term, position }
    }
}
