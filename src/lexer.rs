use std::fmt;

use crate::{
    ast::{Spanned, Token},
    error::SyntaxError,
};

/// 1-based line and column of a character in the filter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_word_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_word_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_word_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads `segment(.segment)*`. Returns the path and whether it had a dot.
    fn read_path(&mut self) -> Result<(String, bool), SyntaxError> {
        let mut path = self.read_word();
        let mut dotted = false;

        while self.current_char() == Some('.') {
            dotted = true;
            self.advance();
            match self.current_char() {
                Some(ch) if Self::is_word_start(ch) => {
                    path.push('.');
                    path.push_str(&self.read_word());
                }
                Some(ch) => {
                    return Err(SyntaxError::new(
                        self.here(),
                        format!("expected attribute name after '.' in '{path}', found '{ch}'"),
                    ));
                }
                None => {
                    return Err(SyntaxError::new(
                        self.here(),
                        format!("expected attribute name after '.' in '{path}', found end of input"),
                    ));
                }
            }
        }
        Ok((path, dotted))
    }

    /// Reads the next word of a multi-word operator such as `is not null`.
    fn read_keyword_after(&mut self, lead: &str) -> Result<String, SyntaxError> {
        self.skip_whitespace();
        match self.current_char() {
            Some(ch) if Self::is_word_start(ch) => Ok(self.read_word().to_ascii_lowercase()),
            Some(ch) => Err(SyntaxError::new(
                self.here(),
                format!("unexpected character '{ch}' after '{lead}'"),
            )),
            None => Err(SyntaxError::new(
                self.here(),
                format!("unexpected end of input after '{lead}'"),
            )),
        }
    }

    fn read_is_operator(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        match self.read_keyword_after("is")?.as_str() {
            "true" => Ok(Token::IsTrue),
            "false" => Ok(Token::IsFalse),
            "null" => Ok(Token::IsNull),
            "not" => {
                let start = self.here();
                match self.read_keyword_after("is not")?.as_str() {
                    "null" => Ok(Token::IsNotNull),
                    other => Err(SyntaxError::new(
                        start,
                        format!("expected 'null' after 'is not', found '{other}'"),
                    )),
                }
            }
            other => Err(SyntaxError::new(
                start,
                format!("expected 'true', 'false', 'null' or 'not null' after 'is', found '{other}'"),
            )),
        }
    }

    fn read_not_operator(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        match self.read_keyword_after("not")?.as_str() {
            "contains" => Ok(Token::NotContains),
            "starts" => Ok(Token::NotStarts),
            "in" => Ok(Token::NotIn),
            other => Err(SyntaxError::new(
                start,
                format!("expected 'contains', 'starts' or 'in' after 'not', found '{other}'"),
            )),
        }
    }

    fn read_word_token(&mut self) -> Result<Token, SyntaxError> {
        let (word, dotted) = self.read_path()?;
        if dotted {
            return Ok(Token::Path(word));
        }

        match word.to_ascii_lowercase().as_str() {
            "and" => Ok(Token::And),
            "or" => Ok(Token::Or),
            "contains" => Ok(Token::Contains),
            "starts" => Ok(Token::Starts),
            "in" => Ok(Token::In),
            "between" => Ok(Token::Between),
            "is" => self.read_is_operator(),
            "not" => self.read_not_operator(),
            _ => Ok(Token::Path(word)),
        }
    }

    fn read_string(&mut self) -> Result<String, SyntaxError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance();
                    match self.current_char() {
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(other) => {
                            return Err(SyntaxError::new(
                                escape_at,
                                format!("invalid escape sequence '\\{other}'"),
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(SyntaxError::new(start, "unterminated string literal"))
    }

    fn read_number(&mut self) -> Result<String, SyntaxError> {
        let mut number = String::new();

        if let Some(sign @ ('+' | '-')) = self.current_char() {
            number.push(sign);
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char() == Some('.') {
            if !self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                return Err(SyntaxError::new(
                    self.here(),
                    format!("expected digit after '{number}.'"),
                ));
            }
            number.push('.');
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    number.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Ok(number)
    }

    /// Consumes a two-character symbol whose second character is `second`.
    fn pair(&mut self, second: char) -> bool {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn read_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(',') => self.single(Token::Comma),
            Some('=') => self.single(Token::Eq),
            Some('!') => {
                if self.pair('=') {
                    Token::NotEq
                } else {
                    return Err(SyntaxError::new(start, "unexpected '!' (did you mean '!='?)"));
                }
            }
            Some('<') => {
                if self.pair('=') {
                    Token::LtEq
                } else if self.pair('>') {
                    Token::NotEq
                } else {
                    self.single(Token::Lt)
                }
            }
            Some('>') => {
                if self.pair('=') {
                    Token::GtEq
                } else {
                    self.single(Token::Gt)
                }
            }
            Some('&') => {
                if self.pair('&') {
                    Token::And
                } else {
                    return Err(SyntaxError::new(start, "unexpected '&' (did you mean '&&'?)"));
                }
            }
            Some('|') => {
                if self.pair('|') {
                    Token::Or
                } else {
                    return Err(SyntaxError::new(start, "unexpected '|' (did you mean '||'?)"));
                }
            }
            Some('\'') => Token::String(self.read_string()?),
            Some('+' | '-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                Token::Number(self.read_number()?)
            }
            Some(ch) if ch.is_ascii_digit() => Token::Number(self.read_number()?),
            Some(ch) if Self::is_word_start(ch) => self.read_word_token()?,
            Some(ch) => {
                return Err(SyntaxError::new(start, format!("unexpected character '{ch}'")));
            }
        };
        Ok(token)
    }

    /// Next token with its source text and position.
    pub fn next_spanned(&mut self) -> Result<Spanned, SyntaxError> {
        self.skip_whitespace();
        let start = self.here();
        let from = self.position;
        let token = self.read_token(start)?;
        let text = self.input[from..self.position].iter().collect();
        Ok(Spanned {
            token,
            text,
            position: start,
        })
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    /// Reads every token up to and including `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_spanned()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR Contains starts IN between");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Contains);
    assert_eq!(lexer.next_token().unwrap(), Token::Starts);
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Between);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_predicate() {
    let mut lexer = Lexer::new("address.street != 'Street A' && age >= 30");
    assert_eq!(lexer.next_token().unwrap(), Token::Path("address.street".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::NotEq);
    assert_eq!(lexer.next_token().unwrap(), Token::String("Street A".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Path("age".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Number("30".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_multi_word_text_and_position() {
    let mut lexer = Lexer::new("email\n  IS   not NULL");
    lexer.next_token().unwrap();
    let spanned = lexer.next_spanned().unwrap();
    assert_eq!(spanned.token, Token::IsNotNull);
    assert_eq!(spanned.text, "IS   not NULL");
    assert_eq!(spanned.position, Position { line: 2, column: 3 });
}
