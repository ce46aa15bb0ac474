// SQL parser - converts tokens to an expression tree

use super::lexer::{Lexer, Span};
use super::token::Token;
use crate::expression::{
    BinaryOperator, ColumnRef, Expression, InTarget, Literal, Subquery, WhenClause,
};
use anyhow::{bail, Result};

pub struct Parser {
    source: Vec<char>,
    tokens: Vec<(Token, Span)>,
    position: usize,
}

impl Parser {
    pub fn new(sql: &str) -> Self {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize_spanned();
        Parser {
            source: sql.chars().collect(),
            tokens,
            position: 0,
        }
    }

    /// Parse a single expression, optionally terminated by a semicolon
    pub fn parse(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        if self.match_token(&Token::Semicolon) {
            self.advance();
        }
        if !self.match_token(&Token::Eof) {
            bail!(
                "Unexpected token after expression: {:?}",
                self.current_token()
            );
        }
        Ok(expr)
    }

    /// Parse expression
    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_addition()?;

        if self.match_token(&Token::Is) {
            self.advance();
            let negated = self.match_not();
            self.expect_token(Token::Null)?;
            return Ok(Expression::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        if self.match_token(&Token::Not) {
            self.advance();
            if !self.match_token(&Token::In) {
                bail!("Expected IN after NOT, found {:?}", self.current_token());
            }
            return self.parse_in(left, true);
        }

        if self.match_token(&Token::In) {
            return self.parse_in(left, false);
        }

        if self.match_token(&Token::Between) {
            self.advance();
            let low = self.parse_addition()?;
            self.expect_token(Token::And)?;
            let high = self.parse_addition()?;
            return Ok(Expression::between(left, low, high));
        }

        if self.match_token(&Token::Like) {
            self.advance();
            let pattern = self.parse_addition()?;
            return Ok(Expression::like(left, pattern));
        }

        let op = match self.current_token() {
            Token::Equal => BinaryOperator::Eq,
            Token::NotEqual => BinaryOperator::Ne,
            Token::Less => BinaryOperator::Lt,
            Token::Greater => BinaryOperator::Gt,
            Token::LessEqual => BinaryOperator::Le,
            Token::GreaterEqual => BinaryOperator::Ge,
            Token::AtAt => BinaryOperator::Matches,
            _ => return Ok(left),
        };
        self.advance();

        if op.is_comparison() {
            match self.current_token() {
                Token::All => {
                    self.advance();
                    let subquery = self.parse_subquery()?;
                    return Ok(Expression::AllComparison {
                        op,
                        expr: Box::new(left),
                        subquery,
                    });
                }
                Token::Any | Token::Some => {
                    self.advance();
                    let subquery = self.parse_subquery()?;
                    return Ok(Expression::AnyComparison {
                        op,
                        expr: Box::new(left),
                        subquery,
                    });
                }
                _ => {}
            }
        }

        let right = self.parse_addition()?;
        Ok(Expression::binary_op(op, left, right))
    }

    /// Parse the remainder of `x [NOT] IN (...)`, starting at IN
    fn parse_in(&mut self, left: Expression, negated: bool) -> Result<Expression> {
        self.expect_token(Token::In)?;

        let target = if self.subquery_follows() {
            InTarget::Subquery(self.parse_subquery()?)
        } else {
            self.expect_token(Token::LeftParen)?;
            let list = self.parse_expression_list()?;
            self.expect_token(Token::RightParen)?;
            InTarget::List(list)
        };

        Ok(Expression::In {
            expr: Box::new(left),
            target,
            negated,
        })
    }

    /// Parse addition/subtraction expression
    fn parse_addition(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                Token::Concat => BinaryOperator::Concat,
                Token::Pipe => BinaryOperator::BitwiseOr,
                Token::Ampersand => BinaryOperator::BitwiseAnd,
                Token::Caret => BinaryOperator::BitwiseXor,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplication()?;
            left = Expression::binary_op(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplication(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::binary_op(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary expression. A sign directly before a number is part of the literal.
    fn parse_unary(&mut self) -> Result<Expression> {
        let sign = match self.current_token() {
            Token::Minus => "-",
            Token::Plus => "+",
            _ => return self.parse_primary(),
        };
        self.advance();

        if let Token::Number(n) = self.current_token() {
            self.advance();
            return number_literal(&format!("{}{}", sign, n));
        }

        let operand = self.parse_unary()?;
        if sign == "-" {
            Ok(Expression::Negate(Box::new(operand)))
        } else {
            Ok(operand)
        }
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expression> {
        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                number_literal(&n)
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::string(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expression::boolean(true))
            }
            Token::False => {
                self.advance();
                Ok(Expression::boolean(false))
            }
            Token::Null => {
                self.advance();
                Ok(Expression::Null)
            }
            Token::Question => {
                self.advance();
                Ok(Expression::Parameter)
            }
            Token::Date | Token::Time | Token::Timestamp => self.parse_temporal(),
            Token::LeftBrace => self.parse_escaped_literal(),
            Token::Identifier(name) => {
                self.advance();
                self.parse_identifier_expression(name)
            }
            Token::Not => {
                self.advance();
                if !self.match_token(&Token::Exists) {
                    bail!("Expected EXISTS after NOT, found {:?}", self.current_token());
                }
                self.parse_exists(true)
            }
            Token::Exists => self.parse_exists(false),
            Token::LeftParen => {
                if self.subquery_follows() {
                    bail!("Scalar subqueries are not supported");
                }
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expr)
            }
            Token::Case => self.parse_case_expression(),
            Token::Unterminated(quote) => bail!("Unterminated literal: missing closing {}", quote),
            _ => bail!("Unexpected token: {:?}", self.current_token()),
        }
    }

    /// Column reference or function call, after its first identifier
    fn parse_identifier_expression(&mut self, name: String) -> Result<Expression> {
        // Check for qualified column (table.column)
        if self.match_token(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            Ok(Expression::Column(ColumnRef::qualified(name, column)))
        }
        // Check for function call
        else if self.match_token(&Token::LeftParen) {
            self.parse_function_call(name)
        } else {
            Ok(Expression::Column(ColumnRef::new(name)))
        }
    }

    /// `DATE 'x'`, `TIME 'x'` or `TIMESTAMP 'x'`. Without a quoted literal
    /// the keyword is read as a column or function name.
    fn parse_temporal(&mut self) -> Result<Expression> {
        let keyword = self.current_token();
        let name = self.source_text(self.current_span());
        self.advance();

        if !matches!(self.current_token(), Token::String(_)) {
            return self.parse_identifier_expression(name);
        }

        let text = self.expect_quoted()?;
        let literal = match keyword {
            Token::Date => Literal::date(&text)?,
            Token::Time => Literal::time(&text)?,
            _ => Literal::timestamp(&text)?,
        };
        Ok(Expression::Literal(literal))
    }

    /// Parse `name(args)` with the current token at the opening parenthesis
    fn parse_function_call(&mut self, name: String) -> Result<Expression> {
        self.expect_token(Token::LeftParen)?;

        let args = if self.match_token(&Token::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect_token(Token::RightParen)?;

        Ok(Expression::function(name, args))
    }

    /// Parse a JDBC escape literal: `{d '...'}`, `{t '...'}` or `{ts '...'}`
    fn parse_escaped_literal(&mut self) -> Result<Expression> {
        self.expect_token(Token::LeftBrace)?;
        let kind = self.expect_identifier()?.to_lowercase();
        let text = self.expect_quoted()?;
        self.expect_token(Token::RightBrace)?;

        let literal = match kind.as_str() {
            "d" => Literal::date(&text)?,
            "t" => Literal::time(&text)?,
            "ts" => Literal::timestamp(&text)?,
            other => bail!("Unknown escape literal type: {}", other),
        };
        Ok(Expression::Literal(literal))
    }

    fn parse_exists(&mut self, negated: bool) -> Result<Expression> {
        self.expect_token(Token::Exists)?;
        let subquery = self.parse_subquery()?;
        Ok(Expression::Exists { subquery, negated })
    }

    /// Parse CASE expression
    fn parse_case_expression(&mut self) -> Result<Expression> {
        self.expect_token(Token::Case)?;

        // Check if there's an operand
        let operand = if !self.match_token(&Token::When) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        let mut when_clauses = vec![];

        while self.match_token(&Token::When) {
            self.advance();
            let when = self.parse_expression()?;
            self.expect_token(Token::Then)?;
            let then = self.parse_expression()?;
            when_clauses.push(WhenClause { when, then });
        }

        if when_clauses.is_empty() {
            bail!("CASE requires at least one WHEN clause");
        }

        let else_result = if self.match_token(&Token::Else) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect_token(Token::End)?;

        Ok(Expression::Case {
            operand,
            when_clauses,
            else_result,
        })
    }

    /// Capture `(SELECT ...)` as source text without interpreting it
    fn parse_subquery(&mut self) -> Result<Subquery> {
        if !self.subquery_follows() {
            bail!("Expected subquery, found {:?}", self.current_token());
        }
        self.expect_token(Token::LeftParen)?;

        let start = self.current_span().start;
        let mut end = start;
        let mut depth = 0usize;

        loop {
            match self.current_token() {
                Token::Eof => bail!("Unterminated subquery"),
                Token::RightParen if depth == 0 => break,
                Token::RightParen => depth -= 1,
                Token::LeftParen => depth += 1,
                _ => {}
            }
            end = self.current_span().end;
            self.advance();
        }
        self.expect_token(Token::RightParen)?;

        Ok(Subquery::new(self.source_text(start..end)))
    }

    /// Parse list of expressions
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![];

        loop {
            expressions.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(expressions)
    }

    // Helper methods

    /// Get current token
    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .map(|(token, _)| token.clone())
            .unwrap_or(Token::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .map(|(_, span)| span.clone())
            .unwrap_or(self.source.len()..self.source.len())
    }

    fn peek_token(&self) -> Token {
        self.tokens
            .get(self.position + 1)
            .map(|(token, _)| token.clone())
            .unwrap_or(Token::Eof)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    /// Consume an optional NOT
    fn match_not(&mut self) -> bool {
        if self.match_token(&Token::Not) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn subquery_follows(&self) -> bool {
        self.match_token(&Token::LeftParen) && self.peek_token() == Token::Select
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            bail!("Expected {:?}, found {:?}", token, self.current_token())
        }
    }

    /// Expect an identifier
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            // Temporal type names double as column names
            Token::Date | Token::Time | Token::Timestamp => {
                let name = self.source_text(self.current_span());
                self.advance();
                Ok(name)
            }
            _ => bail!("Expected identifier, found {:?}", self.current_token()),
        }
    }

    /// Expect a string literal and return its source text, quotes included
    fn expect_quoted(&mut self) -> Result<String> {
        match self.current_token() {
            Token::String(_) => {
                let text = self.source_text(self.current_span());
                self.advance();
                Ok(text)
            }
            _ => bail!("Expected quoted literal, found {:?}", self.current_token()),
        }
    }

    fn source_text(&self, span: Span) -> String {
        self.source[span].iter().collect()
    }
}

fn number_literal(text: &str) -> Result<Expression> {
    let literal = if text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        Literal::float(text)?
    } else {
        Literal::integer(text)?
    };
    Ok(Expression::Literal(literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::NaiveDate;

    fn parse(sql: &str) -> Expression {
        Parser::new(sql).parse().unwrap()
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        let expr = parse("R.A + (2 * B)");
        assert_eq!(
            expr,
            Expression::add_expr(
                Expression::qualified_column("R", "A"),
                Expression::mul_expr(Expression::integer(2), Expression::column("B")),
            )
        );

        let expr = parse("1 + 2 * 3 - 4");
        assert_eq!(
            expr,
            Expression::sub_expr(
                Expression::add_expr(
                    Expression::integer(1),
                    Expression::mul_expr(Expression::integer(2), Expression::integer(3)),
                ),
                Expression::integer(4),
            )
        );
    }

    #[test]
    fn test_parse_boolean_precedence() {
        let expr = parse("a = 1 OR b < 2 AND c >= 3");
        assert_eq!(
            expr,
            Expression::or(
                Expression::eq(Expression::column("a"), Expression::integer(1)),
                Expression::and(
                    Expression::lt(Expression::column("b"), Expression::integer(2)),
                    Expression::ge(Expression::column("c"), Expression::integer(3)),
                ),
            )
        );
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42"), Expression::integer(42));
        assert_eq!(parse("-42"), Expression::integer(-42));
        assert_eq!(parse("+7"), Expression::integer(7));
        assert_eq!(parse("2.5"), Expression::float(2.5));
        assert_eq!(parse("1e3"), Expression::float(1000.0));
        assert_eq!(parse("'it''s'"), Expression::string("it's"));
        assert_eq!(parse("TRUE"), Expression::boolean(true));
        assert_eq!(parse("NULL"), Expression::Null);
        assert_eq!(parse("?"), Expression::Parameter);
        assert_eq!(
            parse("-x"),
            Expression::Negate(Box::new(Expression::column("x")))
        );
    }

    #[test]
    fn test_parse_temporal_literals() {
        let expected = Expression::literal(Value::Date(
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        ));
        assert_eq!(parse("DATE '2020-01-31'"), expected);
        assert_eq!(parse("{d '2020-01-31'}"), expected);

        assert!(matches!(
            parse("TIME '12:30:00'"),
            Expression::Literal(Literal {
                value: Value::Time(_)
            })
        ));
        assert!(matches!(
            parse("{ts '2020-01-31 12:30:00'}"),
            Expression::Literal(Literal {
                value: Value::Timestamp(_)
            })
        ));

        assert!(Parser::new("DATE 'yesterday'").parse().is_err());
        assert!(Parser::new("{x '2020-01-31'}").parse().is_err());
    }

    #[test]
    fn test_parse_function_calls() {
        assert_eq!(
            parse("date('2020-01-31')"),
            Expression::function("date", vec![Expression::string("2020-01-31")])
        );
        assert_eq!(
            parse("DATE('2020-01-31')"),
            Expression::function("DATE", vec![Expression::string("2020-01-31")])
        );
        assert_eq!(parse("now()"), Expression::function("now", vec![]));
    }

    #[test]
    fn test_parse_predicates() {
        assert_eq!(
            parse("x BETWEEN 1 AND 10"),
            Expression::between(
                Expression::column("x"),
                Expression::integer(1),
                Expression::integer(10),
            )
        );
        assert_eq!(
            parse("name LIKE 'a%'"),
            Expression::like(Expression::column("name"), Expression::string("a%"))
        );
        assert_eq!(
            parse("x IS NOT NULL"),
            Expression::IsNull {
                expr: Box::new(Expression::column("x")),
                negated: true,
            }
        );
        assert_eq!(
            parse("x NOT IN (1, 2)"),
            Expression::In {
                expr: Box::new(Expression::column("x")),
                target: InTarget::List(vec![Expression::integer(1), Expression::integer(2)]),
                negated: true,
            }
        );
        assert_eq!(
            parse("a @@ b"),
            Expression::binary_op(
                BinaryOperator::Matches,
                Expression::column("a"),
                Expression::column("b"),
            )
        );
    }

    #[test]
    fn test_parse_subqueries() {
        assert_eq!(
            parse("x IN (SELECT y FROM t WHERE (z > 1))"),
            Expression::In {
                expr: Box::new(Expression::column("x")),
                target: InTarget::Subquery(Subquery::new("SELECT y FROM t WHERE (z > 1)")),
                negated: false,
            }
        );
        assert_eq!(
            parse("NOT EXISTS (SELECT 1)"),
            Expression::Exists {
                subquery: Subquery::new("SELECT 1"),
                negated: true,
            }
        );
        assert_eq!(
            parse("x > ALL (SELECT y FROM t)"),
            Expression::AllComparison {
                op: BinaryOperator::Gt,
                expr: Box::new(Expression::column("x")),
                subquery: Subquery::new("SELECT y FROM t"),
            }
        );
        assert!(matches!(
            parse("x = SOME (SELECT y FROM t)"),
            Expression::AnyComparison { .. }
        ));

        assert!(Parser::new("x IN (SELECT y").parse().is_err());
        assert!(Parser::new("(SELECT 1) + 1").parse().is_err());
    }

    #[test]
    fn test_parse_case() {
        assert_eq!(
            parse("CASE WHEN a > 1 THEN 'big' ELSE 'small' END"),
            Expression::searched_case(
                vec![(
                    Expression::gt(Expression::column("a"), Expression::integer(1)),
                    Expression::string("big"),
                )],
                Some(Expression::string("small")),
            )
        );
        assert_eq!(
            parse("CASE a WHEN 1 THEN 'one' END"),
            Expression::simple_case(
                Expression::column("a"),
                vec![(Expression::integer(1), Expression::string("one"))],
                None,
            )
        );
        assert!(Parser::new("CASE ELSE 1 END").parse().is_err());
    }

    #[test]
    fn test_parse_temporal_keywords_as_names() {
        assert_eq!(
            parse("date + 1"),
            Expression::add_expr(Expression::column("date"), Expression::integer(1))
        );
        assert_eq!(
            parse("T.time > TIMESTAMP"),
            Expression::gt(
                Expression::qualified_column("T", "time"),
                Expression::column("TIMESTAMP"),
            )
        );
        assert_eq!(
            parse("time('12:00:00')"),
            Expression::function("time", vec![Expression::string("12:00:00")])
        );
    }

    #[test]
    fn test_parse_unterminated_quotes() {
        let err = Parser::new("'abc").parse().unwrap_err();
        assert!(err.to_string().contains("Unterminated"), "{}", err);

        let err = Parser::new("\"A + 1").parse().unwrap_err();
        assert!(err.to_string().contains("Unterminated"), "{}", err);

        assert!(Parser::new("1 + 'abc").parse().is_err());
        assert!(Parser::new("DATE '2020-01-01").parse().is_err());
        assert!(Parser::new("{d '2020-01-01}").parse().is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Parser::new("").parse().is_err());
        assert!(Parser::new("1 +").parse().is_err());
        assert!(Parser::new("(1 + 2").parse().is_err());
        assert!(Parser::new("1 2").parse().is_err());
        assert!(Parser::new("a NOT LIKE 'x'").parse().is_err());
        assert!(Parser::new("99999999999999999999").parse().is_err());
        assert!(Parser::new("1 + 2;").parse().is_ok());
    }
}
