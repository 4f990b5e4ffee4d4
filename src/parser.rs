use crate::{
    ast::{Arity, Clause, Group, LogicalOp, Operand, Operator, Predicate, Spanned, Token},
    error::SyntaxError,
    lexer::Lexer,
};

/// Recursive-descent parser for filter strings.
///
/// ```text
/// query     := clause (logicalOp clause)*
/// clause    := predicate | '(' query ')'
/// predicate := path ( relOp value
///                   | boolOp
///                   | strOp STRING
///                   | listOp '(' value (',' value)* ')'
///                   | 'between' value 'and' value )
/// ```
pub struct Parser {
    lexer: Lexer,
    current: Spanned,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, SyntaxError> {
        let current = lexer.next_spanned()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<Spanned, SyntaxError> {
        let next = self.lexer.next_spanned()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current.token) == std::mem::discriminant(token)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.current.position, message)
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<Spanned, SyntaxError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "expected '{expected}' {context}, found {}",
                self.current.token.describe()
            )));
        }
        self.advance()
    }

    /// Parse a complete filter string.
    pub fn parse(&mut self) -> Result<Group, SyntaxError> {
        if self.check(&Token::Eof) {
            return Err(self.error("empty filter"));
        }

        let group = self.parse_query()?;

        if !self.check(&Token::Eof) {
            return Err(self.error(format!(
                "expected logical operator or end of input, found {}",
                self.current.token.describe()
            )));
        }
        Ok(group)
    }

    fn parse_query(&mut self) -> Result<Group, SyntaxError> {
        let mut group = Group::new(self.parse_clause()?);

        while let Some(op) = LogicalOp::from_token(&self.current.token) {
            self.advance()?;
            group.push(op, self.parse_clause()?);
        }
        Ok(group)
    }

    fn parse_clause(&mut self) -> Result<Clause, SyntaxError> {
        match &self.current.token {
            Token::LParen => {
                self.advance()?;
                let group = self.parse_query()?;
                self.expect(Token::RParen, "to close group")?;
                Ok(Clause::Group(group))
            }
            Token::Path(_) => Ok(Clause::Predicate(self.parse_predicate()?)),
            token => Err(self.error(format!(
                "expected attribute or '(', found {}",
                token.describe()
            ))),
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate, SyntaxError> {
        let spanned = self.advance()?;
        let Token::Path(path) = spanned.token else {
            return Err(SyntaxError::new(spanned.position, "expected attribute"));
        };

        let Some(operator) = Operator::from_token(&self.current.token) else {
            return Err(self.error(format!(
                "expected operator after '{path}', found {}",
                self.current.token.describe()
            )));
        };
        self.advance()?;

        let operands = match operator.arity() {
            Arity::None => vec![],
            Arity::One => vec![self.parse_value(operator)?],
            Arity::Pattern => vec![self.parse_pattern(operator)?],
            Arity::List => self.parse_list(operator)?,
            Arity::Range => {
                let low = self.parse_value(operator)?;
                self.expect(Token::And, "between range bounds")?;
                let high = self.parse_value(operator)?;
                vec![low, high]
            }
        };

        Ok(Predicate {
            path,
            operator,
            operands,
            position: spanned.position,
        })
    }

    fn parse_value(&mut self, operator: Operator) -> Result<Operand, SyntaxError> {
        let operand = match &self.current.token {
            Token::String(s) => Operand::String(s.clone()),
            Token::Number(n) => Operand::Number(n.clone()),
            token => {
                return Err(self.error(format!(
                    "expected string or number after '{operator}', found {}",
                    token.describe()
                )));
            }
        };
        self.advance()?;
        Ok(operand)
    }

    fn parse_pattern(&mut self, operator: Operator) -> Result<Operand, SyntaxError> {
        match &self.current.token {
            Token::String(s) => {
                let operand = Operand::String(s.clone());
                self.advance()?;
                Ok(operand)
            }
            token => Err(self.error(format!(
                "expected string after '{operator}', found {}",
                token.describe()
            ))),
        }
    }

    fn parse_list(&mut self, operator: Operator) -> Result<Vec<Operand>, SyntaxError> {
        self.expect(Token::LParen, &format!("after '{operator}'"))?;

        let mut values = vec![self.parse_value(operator)?];
        while self.check(&Token::Comma) {
            self.advance()?;
            values.push(self.parse_value(operator)?);
        }

        self.expect(Token::RParen, "to close value list")?;
        Ok(values)
    }
}

/// Parse `query` into its clause tree.
pub fn parse(query: &str) -> Result<Group, SyntaxError> {
    Parser::new(Lexer::new(query))?.parse()
}
