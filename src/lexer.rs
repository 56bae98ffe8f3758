use crate::error::Span;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Semicolon,
    Minus,
    Plus,
    Slash,
    Star,
    Percent,
    Ampersand,
    Pipe,
    Caret,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Integer,

    // Keywords
    Func,
    Var,
    Val,
    True,
    False,
    If,
    Else,
    While,
    Return,

    // Special
    Illegal,
    Eof,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Comma => ",",
            TokenType::Colon => ":",
            TokenType::Semicolon => ";",
            TokenType::Minus => "-",
            TokenType::Plus => "+",
            TokenType::Slash => "/",
            TokenType::Star => "*",
            TokenType::Percent => "%",
            TokenType::Ampersand => "&",
            TokenType::Pipe => "|",
            TokenType::Caret => "^",
            TokenType::Bang => "!",
            TokenType::BangEqual => "!=",
            TokenType::Equal => "=",
            TokenType::EqualEqual => "==",
            TokenType::Greater => ">",
            TokenType::GreaterEqual => ">=",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Identifier => "IDENT",
            TokenType::String => "STRING",
            TokenType::Integer => "INT",
            TokenType::Func => "FUNCTION",
            TokenType::Var => "VAR",
            TokenType::Val => "VAL",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::While => "WHILE",
            TokenType::Return => "RETURN",
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, literal: String, line: usize, column: usize, span: Span) -> Self {
        Self {
            token_type,
            literal,
            line,
            column,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Token({}, {:?}) @{}:{}",
            self.token_type, self.literal, self.line, self.column
        )
    }
}

/// Streaming scanner: each `next_token` call produces exactly one token.
/// Once the input is exhausted every further call yields `Eof`.
pub struct Lexer {
    source: String,
    /// Byte offset of `ch`.
    position: usize,
    /// Byte offset of the character after `ch`.
    read_position: usize,
    ch: Option<char>,
    line: usize,
    column: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("func", TokenType::Func);
        keywords.insert("var", TokenType::Var);
        keywords.insert("val", TokenType::Val);
        keywords.insert("true", TokenType::True);
        keywords.insert("false", TokenType::False);
        keywords.insert("if", TokenType::If);
        keywords.insert("else", TokenType::Else);
        keywords.insert("while", TokenType::While);
        keywords.insert("return", TokenType::Return);

        let mut lexer = Self {
            source: source.into(),
            position: 0,
            read_position: 0,
            ch: None,
            line: 1,
            column: 0,
            keywords,
        };
        lexer.read_char();
        lexer
    }

    /// Collects the whole token stream, including the trailing `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;
        let start = self.position;

        let c = match self.ch {
            Some(c) => c,
            None => {
                return Token::new(
                    TokenType::Eof,
                    String::new(),
                    line,
                    column,
                    Span::single(self.source.len()),
                )
            }
        };

        let token_type = match c {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            ';' => TokenType::Semicolon,
            '-' => TokenType::Minus,
            '+' => TokenType::Plus,
            '/' => TokenType::Slash,
            '*' => TokenType::Star,
            '%' => TokenType::Percent,
            '&' => TokenType::Ampersand,
            '|' => TokenType::Pipe,
            '^' => TokenType::Caret,
            '!' => self.either('=', TokenType::BangEqual, TokenType::Bang),
            '=' => self.either('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => self.either('=', TokenType::LessEqual, TokenType::Less),
            '>' => self.either('=', TokenType::GreaterEqual, TokenType::Greater),
            '"' => {
                let literal = self.string();
                return Token::new(
                    TokenType::String,
                    literal,
                    line,
                    column,
                    Span::new(start, self.position),
                );
            }
            c if is_letter(c) => {
                let literal = self.identifier();
                let token_type = self
                    .keywords
                    .get(literal.as_str())
                    .copied()
                    .unwrap_or(TokenType::Identifier);
                return Token::new(token_type, literal, line, column, Span::new(start, self.position));
            }
            c if c.is_ascii_digit() => {
                let literal = self.number();
                return Token::new(
                    TokenType::Integer,
                    literal,
                    line,
                    column,
                    Span::new(start, self.position),
                );
            }
            _ => TokenType::Illegal,
        };

        self.read_char();
        let literal = self.source[start..self.position].to_string();
        Token::new(token_type, literal, line, column, Span::new(start, self.position))
    }

    fn read_char(&mut self) {
        match self.ch {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }

        self.position = self.read_position;
        self.ch = self.source[self.read_position..].chars().next();
        if let Some(c) = self.ch {
            self.read_position += c.len_utf8();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.read_position..].chars().next()
    }

    /// Consumes `expected` as the second half of a two-character operator
    /// when it follows, otherwise leaves the input alone.
    fn either(&mut self, expected: char, double: TokenType, single: TokenType) -> TokenType {
        if self.peek_char() == Some(expected) {
            self.read_char();
            double
        } else {
            single
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ' | '\t' | '\n' | '\r')) {
            self.read_char();
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.position;
        while self.ch.is_some_and(is_letter) {
            self.read_char();
        }
        self.source[start..self.position].to_string()
    }

    fn number(&mut self) -> String {
        let start = self.position;
        while self.ch.is_some_and(|c| c.is_ascii_digit()) {
            self.read_char();
        }
        self.source[start..self.position].to_string()
    }

    /// Reads up to the closing quote. An unterminated string simply runs to
    /// the end of input.
    fn string(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            match self.ch {
                Some('"') => {
                    let text = self.source[start..self.position].to_string();
                    self.read_char();
                    return text;
                }
                None => return self.source[start..self.position].to_string(),
                Some(_) => {}
            }
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
