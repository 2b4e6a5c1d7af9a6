//! Parser implementation for building the node arena.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and one handler per leading keyword for statements.
//!
//! Besides the tree, the parser builds the name table of every block by
//! declaring definitions in a chain of [`Environment`]s; the table of the
//! outermost block is the global table and starts out with the host
//! built-ins.

use std::{collections::HashMap, rc::Rc};

use crate::{
    analyzer::environment::Environment,
    ast::{
        ast::{Ast, NameTable, NodeId, NodeKind},
        statements::Definition,
    },
    builtins::BuiltinTable,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
};

/// Deepest nesting of blocks and expressions accepted before parsing stops.
pub const MAX_NESTING: usize = 256;

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Arena receiving the parsed nodes
    ast: Ast,
    /// Scope of the block currently being parsed
    scope: Rc<Environment>,
    /// Open blocks and expressions around the current token
    nesting: usize,
}

impl Parser {
    /// Creates a new Parser positioned at the first token, with an empty
    /// global scope.
    pub fn new(tokens: Vec<Token>, file: Rc<String>) -> Self {
        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            ast: Ast::new(),
            scope: Environment::root(NameTable::default()),
            nesting: 0,
        }
    }

    /// Returns the current token without advancing.
    ///
    /// Past the end this keeps returning the trailing EOF token.
    pub fn current_token(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        self.pos += 1;
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: token.value.clone(),
                        message: format!("expected {}", expected_kind),
                    },
                    token.span.start.clone(),
                )),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len() && self.current_token_kind() != TokenKind::EOF
    }

    /// Error for the current token with an explanation.
    pub fn unexpected(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: message.to_string(),
            },
            token.span.start.clone(),
        )
    }

    /// Enters a nested block or expression, failing past `MAX_NESTING`.
    pub fn enter_nesting(&mut self) -> Result<(), Error> {
        if self.nesting >= MAX_NESTING {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep { limit: MAX_NESTING },
                self.current_token().span.start.clone(),
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    pub fn leave_nesting(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Binding power of the current token; tokens without an infix handler
    /// end the expression.
    pub fn current_binding_power(&self) -> BindingPower {
        *self
            .binding_power_lookup
            .get(&self.current_token_kind())
            .unwrap_or(&BindingPower::Default)
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the current position in the source file.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// End of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        match self.pos.checked_sub(1).and_then(|index| self.tokens.get(index)) {
            Some(token) => token.span.end.clone(),
            None => Position(0, Rc::clone(&self.file)),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.previous_end(),
        }
    }

    pub fn push_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.push(kind, span)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Pushes a definition node and declares it in the current scope.
    pub fn declare(&mut self, def: Definition, span: Span) -> Result<NodeId, Error> {
        let name = def.name().to_string();
        let position = span.start.clone();
        let id = self.ast.push(NodeKind::Def(def), span);
        self.scope.add_definition(&name, id, position)
    }

    /// Declares an already pushed definition node in the current scope.
    pub fn declare_existing(&mut self, id: NodeId) -> Result<NodeId, Error> {
        let node = self.ast.node(id)?;
        let position = node.span.start.clone();
        let name = self.ast.definition(id)?.name().to_string();
        self.scope.add_definition(&name, id, position)
    }

    /// Opens the scope of a nested block.
    pub fn push_scope(&mut self) {
        self.scope = Environment::new(NameTable::default(), Some(Rc::clone(&self.scope)));
        tracing::trace!(depth = self.scope.depth(), "enter scope");
    }

    /// Closes the innermost scope and returns its declarations.
    pub fn pop_scope(&mut self) -> NameTable {
        let table = self.scope.take_table();
        if let Some(parent) = self.scope.parent() {
            self.scope = Rc::clone(parent);
        }
        tracing::trace!(depth = self.scope.depth(), "leave scope");
        table
    }
}

/// Parses a stream of tokens into a node arena.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes the lookup tables, seeds the global scope with the host
/// built-ins and parses statements until EOF. The outermost block becomes
/// the root of the returned tree.
pub fn parse(tokens: Vec<Token>, file: Rc<String>, builtins: &BuiltinTable) -> Result<Ast, Error> {
    let mut parser = Parser::new(tokens, Rc::clone(&file));
    create_token_lookups(&mut parser);

    let host = Span {
        start: Position(0, Rc::clone(&file)),
        end: Position(0, Rc::clone(&file)),
    };
    for def in builtins.definitions() {
        parser.declare(def, host.clone())?;
    }

    let mut stmts = vec![];
    while parser.has_tokens() {
        if let Some(stmt) = parse_stmt(&mut parser)? {
            stmts.push(stmt);
        }
    }

    let table = parser.scope.take_table();
    let span = Span {
        start: Position(0, Rc::clone(&file)),
        end: parser.previous_end(),
    };
    let root = parser.push_node(NodeKind::Block { stmts, table }, span);
    parser.ast.set_root(root);

    tracing::debug!(nodes = parser.ast.len(), file = %file, "parsed script");
    Ok(parser.ast)
}
