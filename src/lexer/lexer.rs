use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).unwrap(),
        handler,
    }
}

lazy_static! {
    // Tried in order; every pattern is anchored so only a match at the
    // cursor counts. Longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern(r"^[0-9]+(\.[0-9]+)?", number_handler),
        pattern(r"^\s+", skip_handler),
        pattern(r"^//[^\n]*", skip_handler),
        pattern(r"^/\*(?s:.*?)\*/", skip_handler),
        pattern(r#"^"(?:[^"\\]|\\.)*""#, string_handler),
        pattern(r"^'(?:[^'\\]|\\.)'", char_handler),
        pattern(r"^@[a-zA-Z_][a-zA-Z0-9_]*", entry_routine_handler),
        pattern(r"^#[a-zA-Z_][a-zA-Z0-9_]*(\[[^\]\n]*\])?", header_handler),
        pattern(r"^\(\|", MK_DEFAULT_HANDLER!(TokenKind::OpenAbs, "(|")),
        pattern(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern(r"^\|\)", MK_DEFAULT_HANDLER!(TokenKind::CloseAbs, "|)")),
        pattern(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern(r"^\.\.", MK_DEFAULT_HANDLER!(TokenKind::DotDot, "..")),
        pattern(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(r"^\+\+", MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++")),
        pattern(r"^--", MK_DEFAULT_HANDLER!(TokenKind::MinusMinus, "--")),
        pattern(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern(r"^%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern(r"^\^=", MK_DEFAULT_HANDLER!(TokenKind::CaretEquals, "^=")),
        pattern(r"^~=", MK_DEFAULT_HANDLER!(TokenKind::TildeEquals, "~=")),
        pattern(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern(r"^\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern(r"^~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        token.debug();
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of `len` bytes starting at the cursor.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Number, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());
    let value = unescape(&matched[1..matched.len() - 1]);

    lexer.push(MK_TOKEN!(TokenKind::String, value, span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());
    let value = unescape(&matched[1..matched.len() - 1]);

    lexer.push(MK_TOKEN!(TokenKind::Char, value, span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn entry_routine_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::EntryRoutine, matched[1..].to_string(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn header_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Header, matched[1..].to_string(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let span = lexer.span_of(value.len());
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
    Ok(())
}

/// Resolves backslash escapes inside a string or character literal.
fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => result.push('\\'), // Keep the lone backslash
        }
    }

    result
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let handler = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match handler {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
