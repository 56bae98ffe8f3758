use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenType};
use tracing::span::EnteredSpan;

/// Binding power of infix operators, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,
    Equals,
    LessGreater,
    Or,
    Xor,
    And,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    pub fn of(token_type: TokenType) -> Self {
        match token_type {
            TokenType::Equal => Precedence::Assign,
            TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
            TokenType::Less
            | TokenType::Greater
            | TokenType::LessEqual
            | TokenType::GreaterEqual => Precedence::LessGreater,
            TokenType::Pipe => Precedence::Or,
            TokenType::Caret => Precedence::Xor,
            TokenType::Ampersand => Precedence::And,
            TokenType::Plus | TokenType::Minus => Precedence::Sum,
            TokenType::Star | TokenType::Slash | TokenType::Percent => Precedence::Product,
            TokenType::LeftParen => Precedence::Call,
            TokenType::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

/// Builds an expression starting at the current token.
pub type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;

/// Extends an already parsed left operand; the current token is the operator.
pub type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

/// Pratt parser over a `Lexer`.
///
/// Syntax errors never abort parsing: they are collected in `errors` and the
/// parser moves on, so one pass reports as many problems as it can find.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program { statements }
    }

    pub fn prefix_fn(token_type: TokenType) -> Option<PrefixParseFn> {
        match token_type {
            TokenType::Identifier => Some(Parser::parse_identifier),
            TokenType::Integer => Some(Parser::parse_integer_literal),
            TokenType::String => Some(Parser::parse_string_literal),
            TokenType::True | TokenType::False => Some(Parser::parse_boolean),
            TokenType::Bang | TokenType::Minus => Some(Parser::parse_prefix_expression),
            TokenType::LeftParen => Some(Parser::parse_grouped_expression),
            TokenType::If => Some(Parser::parse_if_expression),
            TokenType::While => Some(Parser::parse_while_expression),
            TokenType::Func => Some(Parser::parse_function_literal),
            TokenType::LeftBracket => Some(Parser::parse_array_literal),
            TokenType::LeftBrace => Some(Parser::parse_hash_literal),
            _ => None,
        }
    }

    pub fn infix_fn(token_type: TokenType) -> Option<InfixParseFn> {
        match token_type {
            TokenType::Plus
            | TokenType::Minus
            | TokenType::Star
            | TokenType::Slash
            | TokenType::Percent
            | TokenType::Ampersand
            | TokenType::Pipe
            | TokenType::Caret
            | TokenType::EqualEqual
            | TokenType::BangEqual
            | TokenType::Less
            | TokenType::LessEqual
            | TokenType::Greater
            | TokenType::GreaterEqual => Some(Parser::parse_infix_expression),
            TokenType::Equal => Some(Parser::parse_assign_expression),
            TokenType::LeftParen => Some(Parser::parse_call_expression),
            TokenType::LeftBracket => Some(Parser::parse_index_expression),
            _ => None,
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let _span = self.trace("statement");
        match self.current.token_type {
            TokenType::Var | TokenType::Val => self.parse_declaration(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_declaration(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        if !self.expect_peek(TokenType::Identifier) {
            self.synchronize();
            return None;
        }
        let name = self.current_identifier();

        if !self.expect_peek(TokenType::Equal) {
            self.synchronize();
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        if token.token_type == TokenType::Val {
            Some(Statement::Val { token, name, value })
        } else {
            Some(Statement::Var { token, name, value })
        }
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Statement::Expression { token, expression })
    }

    /// Precedence climbing: keep folding infix operators into `left` while
    /// the next operator binds tighter than `precedence`.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let _span = self.trace("expression");

        let prefix = match Self::prefix_fn(self.current.token_type) {
            Some(prefix) => prefix,
            None => {
                self.no_prefix_parse_fn_error();
                return None;
            }
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            let infix = match Self::infix_fn(self.peek.token_type) {
                Some(infix) => infix,
                None => return Some(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.current_identifier()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                let message = format!("could not parse {} as integer", token.literal);
                self.error_at(&token, message);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let value = token.literal.clone();
        Some(Expression::StringLiteral { token, value })
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let value = token.token_type == TokenType::True;
        Some(Expression::Boolean { token, value })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let _span = self.trace("prefix");
        let token = self.current.clone();
        let operator = match token.token_type {
            TokenType::Bang => PrefixOperator::Not,
            _ => PrefixOperator::Negate,
        };
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let _span = self.trace("infix");
        let token = self.current.clone();
        let operator = match token.token_type {
            TokenType::Plus => InfixOperator::Add,
            TokenType::Minus => InfixOperator::Subtract,
            TokenType::Star => InfixOperator::Multiply,
            TokenType::Slash => InfixOperator::Divide,
            TokenType::Percent => InfixOperator::Modulo,
            TokenType::Ampersand => InfixOperator::BitAnd,
            TokenType::Pipe => InfixOperator::BitOr,
            TokenType::Caret => InfixOperator::BitXor,
            TokenType::EqualEqual => InfixOperator::Equal,
            TokenType::BangEqual => InfixOperator::NotEqual,
            TokenType::Less => InfixOperator::Less,
            TokenType::LessEqual => InfixOperator::LessEqual,
            TokenType::Greater => InfixOperator::Greater,
            TokenType::GreaterEqual => InfixOperator::GreaterEqual,
            other => unreachable!("{} is not registered as an infix operator", other),
        };

        let precedence = Precedence::of(token.token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    /// `name = value`. Parsed at the lowest precedence on the right, which
    /// makes chained assignments right-associative.
    fn parse_assign_expression(&mut self, left: Expression) -> Option<Expression> {
        let _span = self.trace("assign");
        let token = self.current.clone();

        let name = match left {
            Expression::Identifier(name) => name,
            other => {
                self.error_at(&token, format!("expected identifier on left but got {}", other));
                // Consume the right-hand side so it is not parsed as a new statement.
                self.next_token();
                let _ = self.parse_expression(Precedence::Lowest);
                return None;
            }
        };

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        Some(Expression::Assign {
            token,
            name,
            value: Box::new(value),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let _span = self.trace("if");
        let token = self.current.clone();
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_is(TokenType::Else) {
            self.next_token();

            if self.peek_is(TokenType::If) {
                self.next_token();
                let nested_token = self.current.clone();
                let nested = self.parse_if_expression()?;
                alternative = Some(BlockStatement {
                    token: nested_token.clone(),
                    statements: vec![Statement::Expression {
                        token: nested_token,
                        expression: nested,
                    }],
                });
            } else {
                if !self.expect_peek(TokenType::LeftBrace) {
                    return None;
                }
                alternative = Some(self.parse_block_statement());
            }
        }

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_while_expression(&mut self) -> Option<Expression> {
        let _span = self.trace("while");
        let token = self.current.clone();
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::While {
            token,
            condition: Box::new(condition),
            body,
        })
    }

    /// Parses statements up to the closing `}`; the current token must be
    /// the opening `{`.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let _span = self.trace("block");
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.next_token();
        while !self.current_is(TokenType::RightBrace) && !self.current_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        if self.current_is(TokenType::Eof) {
            let eof = self.current.clone();
            self.error_at(
                &eof,
                format!("expected {} to close block, got EOF instead", TokenType::RightBrace),
            );
        }

        BlockStatement { token, statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let _span = self.trace("function");
        let token = self.current.clone();

        if !self.expect_peek(TokenType::LeftParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenType::RightParen) {
            self.next_token();
            return Some(parameters);
        }

        if !self.expect_peek(TokenType::Identifier) {
            return None;
        }
        parameters.push(self.current_identifier());

        while self.peek_is(TokenType::Comma) {
            self.next_token();
            if !self.expect_peek(TokenType::Identifier) {
                return None;
            }
            parameters.push(self.current_identifier());
        }

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let _span = self.trace("call");
        let token = self.current.clone();
        let arguments = self.parse_expression_list(TokenType::RightParen)?;

        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let elements = self.parse_expression_list(TokenType::RightBracket)?;
        Some(Expression::ArrayLiteral { token, elements })
    }

    /// Comma separated expressions up to `end`, shared by calls and arrays.
    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RightBracket) {
            return None;
        }

        Some(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let _span = self.trace("hash");
        let token = self.current.clone();
        let mut pairs = Vec::new();

        if self.peek_is(TokenType::RightBrace) {
            self.next_token();
            return Some(Expression::HashLiteral { token, pairs });
        }

        // Like expression lists, a comma must be followed by another pair.
        loop {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenType::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek_is(TokenType::RightBrace) {
                break;
            }
            if !self.expect_peek(TokenType::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenType::RightBrace) {
            return None;
        }
        Some(Expression::HashLiteral { token, pairs })
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, token_type: TokenType) -> bool {
        self.current.token_type == token_type
    }

    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek.token_type == token_type
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.token_type)
    }

    fn current_identifier(&self) -> Identifier {
        Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    /// Advances only when the next token has the expected type, recording an
    /// error otherwise.
    fn expect_peek(&mut self, token_type: TokenType) -> bool {
        if self.peek_is(token_type) {
            self.next_token();
            true
        } else {
            self.peek_error(token_type);
            false
        }
    }

    /// Skips the rest of a malformed statement so it does not turn into a
    /// cascade of follow-up errors.
    fn synchronize(&mut self) {
        while !self.peek_is(TokenType::Semicolon)
            && !self.peek_is(TokenType::RightBrace)
            && !self.peek_is(TokenType::Eof)
        {
            self.next_token();
        }
        self.skip_semicolon();
    }

    fn peek_error(&mut self, expected: TokenType) {
        let peek = self.peek.clone();
        let message = format!(
            "expected next token to be {}, got {} instead",
            expected, peek.token_type
        );
        self.error_at(&peek, message);
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let current = self.current.clone();
        let message = match current.token_type {
            TokenType::Illegal => format!("illegal character '{}'", current.literal),
            other => format!("no prefix parse function for {} found", other),
        };
        self.error_at(&current, message);
    }

    fn error_at(&mut self, token: &Token, message: String) {
        let error = ParseError::new(message, token.line, token.column, token.span);
        tracing::debug!(%error, "parse error");
        self.errors.push(error);
    }

    fn trace(&self, rule: &'static str) -> EnteredSpan {
        tracing::trace_span!("parse", rule, token = %self.current.literal).entered()
    }
}

/// Lexes and parses `source` in one go.
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}
