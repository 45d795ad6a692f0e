//! Java source front end: tokenizer, declaration parser and doc cleanup.

pub mod ast;
pub mod javadoc;
pub mod lexer;
pub mod parser;

pub use ast::CompilationUnit;
pub use javadoc::clean_doc;
pub use parser::{parse_compilation_unit, parse_type_reference, JavaSyntaxError};
