/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The node arena, node kinds and name tables
/// - expressions: Unary and binary operators
/// - statements: Assignment operators and definition variants
/// - types: The value type lattice used by the analyzer
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
