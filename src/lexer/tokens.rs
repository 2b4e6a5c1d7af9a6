use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("var", TokenKind::Let);
        map.insert("function", TokenKind::Function);
        map.insert("sub", TokenKind::Sub);
        map.insert("task", TokenKind::Task);
        map.insert("return", TokenKind::Return);
        map.insert("yield", TokenKind::Yield);
        map.insert("break", TokenKind::Break);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("loop", TokenKind::Loop);
        map.insert("times", TokenKind::Times);
        map.insert("while", TokenKind::While);
        map.insert("ascent", TokenKind::Ascent);
        map.insert("descent", TokenKind::Descent);
        map.insert("in", TokenKind::In);
        map.insert("alternative", TokenKind::Alternative);
        map.insert("case", TokenKind::Case);
        map.insert("others", TokenKind::Others);
        map.insert("local", TokenKind::Local);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    Char,
    String,
    Identifier,
    /// `@Name`, value holds the name without the marker
    EntryRoutine,
    /// `#Name[...]`, value holds the raw text after `#`
    Header,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,
    OpenAbs,  // (|
    CloseAbs, // |)

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    DotDot,
    Semicolon,
    Comma,

    PlusPlus,
    MinusMinus,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    CaretEquals,
    TildeEquals,

    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Caret,
    Tilde,

    // Reserved
    Let,
    Function,
    Sub,
    Task,
    Return,
    Yield,
    Break,
    If,
    Else,
    Loop,
    Times,
    While,
    Ascent,
    Descent,
    In,
    Alternative,
    Case,
    Others,
    Local,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    pub fn debug(&self) {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Char,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::EntryRoutine,
            TokenKind::Header,
        ]) {
            tracing::trace!(kind = %self.kind, value = %self.value, "token");
        } else {
            tracing::trace!(kind = %self.kind, "token");
        }
    }
}
