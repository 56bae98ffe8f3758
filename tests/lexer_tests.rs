use monkey::lexer::{Lexer, TokenType};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenType> {
    Lexer::new(source).tokenize().into_iter().map(|t| t.token_type).collect()
}

#[test]
fn scans_a_small_program() {
    let source = "var five = 5;\nval add = func(x, y) { x + y; };\nadd(five, 10);";
    let tokens = Lexer::new(source).tokenize();

    let expected = vec![
        (TokenType::Var, "var"),
        (TokenType::Identifier, "five"),
        (TokenType::Equal, "="),
        (TokenType::Integer, "5"),
        (TokenType::Semicolon, ";"),
        (TokenType::Val, "val"),
        (TokenType::Identifier, "add"),
        (TokenType::Equal, "="),
        (TokenType::Func, "func"),
        (TokenType::LeftParen, "("),
        (TokenType::Identifier, "x"),
        (TokenType::Comma, ","),
        (TokenType::Identifier, "y"),
        (TokenType::RightParen, ")"),
        (TokenType::LeftBrace, "{"),
        (TokenType::Identifier, "x"),
        (TokenType::Plus, "+"),
        (TokenType::Identifier, "y"),
        (TokenType::Semicolon, ";"),
        (TokenType::RightBrace, "}"),
        (TokenType::Semicolon, ";"),
        (TokenType::Identifier, "add"),
        (TokenType::LeftParen, "("),
        (TokenType::Identifier, "five"),
        (TokenType::Comma, ","),
        (TokenType::Integer, "10"),
        (TokenType::RightParen, ")"),
        (TokenType::Semicolon, ";"),
        (TokenType::Eof, ""),
    ];

    let actual: Vec<(TokenType, &str)> = tokens.iter().map(|t| (t.token_type, t.literal.as_str())).collect();
    assert_eq!(actual, expected);
}

#[test]
fn two_character_operators() {
    assert_eq!(
        kinds("== != <= >= = ! < >"),
        vec![
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::LessEqual,
            TokenType::GreaterEqual,
            TokenType::Equal,
            TokenType::Bang,
            TokenType::Less,
            TokenType::Greater,
            TokenType::Eof,
        ]
    );
}

#[test]
fn single_character_operators() {
    assert_eq!(
        kinds("+-*/%&|^:[]"),
        vec![
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Star,
            TokenType::Slash,
            TokenType::Percent,
            TokenType::Ampersand,
            TokenType::Pipe,
            TokenType::Caret,
            TokenType::Colon,
            TokenType::LeftBracket,
            TokenType::RightBracket,
            TokenType::Eof,
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("if else while return true false funcs vars"),
        vec![
            TokenType::If,
            TokenType::Else,
            TokenType::While,
            TokenType::Return,
            TokenType::True,
            TokenType::False,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Eof,
        ]
    );
}

#[test]
fn strings_keep_their_contents() {
    let tokens = Lexer::new("\"foo bar\" \"\"").tokenize();
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].literal, "foo bar");
    assert_eq!(tokens[1].token_type, TokenType::String);
    assert_eq!(tokens[1].literal, "");
}

#[test]
fn unterminated_string_runs_to_end_of_input() {
    let tokens = Lexer::new("\"never closed").tokenize();
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].literal, "never closed");
    assert_eq!(tokens[1].token_type, TokenType::Eof);
}

#[test]
fn unknown_characters_are_illegal() {
    let tokens = Lexer::new("1 @ 2").tokenize();
    assert_eq!(tokens[1].token_type, TokenType::Illegal);
    assert_eq!(tokens[1].literal, "@");
    assert_eq!(tokens[2].token_type, TokenType::Integer);
}

#[test]
fn eof_repeats_forever() {
    let mut lexer = Lexer::new("x");
    assert_eq!(lexer.next_token().token_type, TokenType::Identifier);
    for _ in 0..3 {
        let token = lexer.next_token();
        assert_eq!(token.token_type, TokenType::Eof);
        assert_eq!(token.literal, "");
    }
}

#[test]
fn tracks_lines_and_columns() {
    let tokens = Lexer::new("var x\n  = 10;").tokenize();

    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
    assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    assert_eq!((tokens[3].line, tokens[3].column), (2, 5));
    assert_eq!(tokens[3].span.start, 10);
    assert_eq!(tokens[3].span.end, 12);
}

#[test]
fn token_display_for_dumps() {
    let tokens = Lexer::new("val").tokenize();
    assert_eq!(tokens[0].to_string(), "Token(VAL, \"val\") @1:1");
}

#[test]
fn identifiers_may_contain_underscores() {
    let tokens = Lexer::new("my_var _x").tokenize();
    assert_eq!(tokens[0].literal, "my_var");
    assert_eq!(tokens[1].token_type, TokenType::Identifier);
    assert_eq!(tokens[1].literal, "_x");
}
