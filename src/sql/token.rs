// SQL tokens for lexical analysis

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Number(String),
    String(String),

    // Keywords
    Select,
    And,
    Or,
    Not,
    Null,
    Is,
    In,
    Exists,
    Between,
    Like,
    All,
    Any,
    Some,
    True,
    False,
    Case,
    When,
    Then,
    Else,
    End,
    Date,
    Time,
    Timestamp,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Concat,
    Pipe,
    Ampersand,
    Caret,
    AtAt,
    Question,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Dot,

    // Special
    Unknown(char),
    /// A quoted literal or identifier with no closing quote
    Unterminated(char),
    Eof,
}

impl Token {
    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Select
                | Token::And
                | Token::Or
                | Token::Not
                | Token::Null
                | Token::Is
                | Token::In
                | Token::Exists
                | Token::Between
                | Token::Like
                | Token::All
                | Token::Any
                | Token::Some
                | Token::True
                | Token::False
                | Token::Case
                | Token::When
                | Token::Then
                | Token::Else
                | Token::End
                | Token::Date
                | Token::Time
                | Token::Timestamp
        )
    }

    /// Convert a string to a keyword token if it matches
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Token::Select),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "NULL" => Some(Token::Null),
            "IS" => Some(Token::Is),
            "IN" => Some(Token::In),
            "EXISTS" => Some(Token::Exists),
            "BETWEEN" => Some(Token::Between),
            "LIKE" => Some(Token::Like),
            "ALL" => Some(Token::All),
            "ANY" => Some(Token::Any),
            "SOME" => Some(Token::Some),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            "CASE" => Some(Token::Case),
            "WHEN" => Some(Token::When),
            "THEN" => Some(Token::Then),
            "ELSE" => Some(Token::Else),
            "END" => Some(Token::End),
            "DATE" => Some(Token::Date),
            "TIME" => Some(Token::Time),
            "TIMESTAMP" => Some(Token::Timestamp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        assert!(Token::Case.is_keyword());
        assert!(Token::Date.is_keyword());
        assert!(!Token::Identifier("test".to_string()).is_keyword());
        assert!(!Token::Plus.is_keyword());
    }

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Token::keyword_from_str("BETWEEN"), Some(Token::Between));
        assert_eq!(Token::keyword_from_str("between"), Some(Token::Between));
        assert_eq!(Token::keyword_from_str("Date"), Some(Token::Date));
        assert_eq!(Token::keyword_from_str("unknown"), None);
    }
}
