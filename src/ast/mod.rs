/// AST module
/// Contains the shapes handed from the parser to code generation
///
/// Submodules:
/// - expressions: Operands, operator sequences and lowered values
/// - statements: Function and declaration descriptions
pub mod expressions;
pub mod statements;
