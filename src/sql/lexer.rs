// SQL lexer - tokenizes SQL expressions

use super::token::Token;
use std::ops::Range;

/// Character range of a token in the lexer input
pub type Span = Range<usize>;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.next_spanned().0
    }

    /// Get the next token with the character range it was read from
    pub fn next_spanned(&mut self) -> (Token, Span) {
        self.skip_whitespace();
        let start = self.position;

        let ch = match self.current_char {
            Some(ch) => ch,
            None => return (Token::Eof, start..start),
        };

        let token = match ch {
            '+' => self.single(Token::Plus),
            '-' => {
                self.advance();
                // Check for comments
                if self.current_char == Some('-') {
                    self.skip_comment();
                    return self.next_spanned();
                }
                Token::Minus
            }
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '=' => self.single(Token::Equal),
            '<' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessEqual
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '!' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::NotEqual
                } else {
                    Token::Unknown('!')
                }
            }
            '|' => {
                self.advance();
                if self.current_char == Some('|') {
                    self.advance();
                    Token::Concat
                } else {
                    Token::Pipe
                }
            }
            '@' => {
                self.advance();
                if self.current_char == Some('@') {
                    self.advance();
                    Token::AtAt
                } else {
                    Token::Unknown('@')
                }
            }
            '&' => self.single(Token::Ampersand),
            '^' => self.single(Token::Caret),
            '?' => self.single(Token::Question),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '{' => self.single(Token::LeftBrace),
            '}' => self.single(Token::RightBrace),
            ',' => self.single(Token::Comma),
            ';' => self.single(Token::Semicolon),
            '.' => {
                if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.read_number()
                } else {
                    self.single(Token::Dot)
                }
            }
            '\'' => self.read_string(),
            '"' => self.read_quoted_identifier(),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            other => self.single(Token::Unknown(other)),
        };

        (token, start..self.position)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comments starting with --
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a quoted identifier (e.g., "table name")
    fn read_quoted_identifier(&mut self) -> Token {
        self.advance(); // Skip opening quote
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch == '"' {
                self.advance(); // Skip closing quote
                return Token::Identifier(identifier);
            } else if ch == '\\' && self.peek() == Some('"') {
                // Handle escaped quotes
                self.advance();
                identifier.push('"');
                self.advance();
            } else {
                identifier.push(ch);
                self.advance();
            }
        }

        Token::Unterminated('"')
    }

    /// Read a string literal
    fn read_string(&mut self) -> Token {
        self.advance(); // Skip opening quote
        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == '\'' {
                if self.peek() == Some('\'') {
                    // Handle escaped single quotes
                    string.push('\'');
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // Skip closing quote
                    return Token::String(string);
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Token::Unterminated('\'')
    }

    /// Read a number: digits, an optional fraction and an optional exponent
    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut has_dot = false;
        let mut has_exponent = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && !has_exponent {
                has_dot = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E') && !has_exponent && self.exponent_follows() {
                has_exponent = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        Token::Number(number)
    }

    fn exponent_follows(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self
                .input
                .get(self.position + 2)
                .map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.tokenize_spanned()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    /// Tokenize the entire input, keeping each token's span
    pub fn tokenize_spanned(&mut self) -> Vec<(Token, Span)> {
        let mut tokens = Vec::new();

        loop {
            let (token, span) = self.next_spanned();
            let done = token == Token::Eof;
            tokens.push((token, span));
            if done {
                break;
            }
        }

        tokens
    }
}
