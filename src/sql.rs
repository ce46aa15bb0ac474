// SQL module - expression parsing

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::*;

use crate::expression::Expression;
use anyhow::Result;

/// Parse SQL text holding a single expression
pub fn parse_expression(sql: &str) -> Result<Expression> {
    Parser::new(sql).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        let expr = parse_expression("1 + 1").unwrap();
        assert!(expr.is_constant());
        assert!(!parse_expression("a + 1").unwrap().is_constant());
        assert!(parse_expression("1 +").is_err());
    }
}
