//! Recursive-descent parser for Java declarations.
//!
//! Parses compilation units down to member signatures. Method bodies,
//! constructor bodies and initializer blocks are skipped by brace matching;
//! field initializers are captured and reduced to an [`Initializer`].

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use super::ast::{
    Annotation, AnnotationValue, CompilationUnit, DeclKind, EnumConstant, FieldDecl, Import,
    Initializer, Literal, MethodDecl, Modifiers, Param, TypeDecl, Visibility,
};
use super::lexer::{tokenize, Token, TokenKind};
use crate::core::types::{TypeReference, OBJECT};

/// A Java file that could not be parsed.
#[derive(Debug, Error, Diagnostic)]
#[error("{message} ({path}:{line})")]
#[diagnostic(
    code(confmeta::java::syntax),
    help("The extractor reads declarations only; check that the file compiles")
)]
pub struct JavaSyntaxError {
    pub path: String,
    pub message: String,
    pub line: u32,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

impl JavaSyntaxError {
    fn new(path: &Path, source: &str, failure: ParseFailure) -> Self {
        let offset = failure.offset.min(source.len());
        let line = source[..offset].matches('\n').count() as u32 + 1;
        let display = path.display().to_string();
        JavaSyntaxError {
            path: display.clone(),
            message: failure.message,
            line,
            src: NamedSource::new(display, source.to_string()),
            span: (offset, failure.len).into(),
        }
    }
}

#[derive(Debug)]
struct ParseFailure {
    message: String,
    offset: usize,
    len: usize,
}

type ParseResult<T> = Result<T, ParseFailure>;

/// Parse one `.java` file.
pub fn parse_compilation_unit(path: &Path, source: &str) -> Result<CompilationUnit, JavaSyntaxError> {
    let tokens = tokenize(source).map_err(|e| {
        JavaSyntaxError::new(
            path,
            source,
            ParseFailure {
                message: e.message,
                offset: e.offset,
                len: e.len,
            },
        )
    })?;

    let mut parser = Parser { tokens, pos: 0 };
    parser
        .compilation_unit(path)
        .map_err(|failure| JavaSyntaxError::new(path, source, failure))
}

/// Parse a standalone type such as `java.util.Map<String, List<Foo>>[]`.
pub fn parse_type_reference(text: &str) -> Option<TypeReference> {
    let tokens = tokenize(text).ok()?;
    let mut parser = Parser { tokens, pos: 0 };
    let ty = parser.parse_type().ok()?;
    parser.at_eof().then_some(ty)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_punct(&self, p: &str) -> bool {
        self.peek().is_punct(p)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> ParseResult<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected `{}`", p)))
        }
    }

    fn at_ident(&self, name: &str) -> bool {
        self.peek().is_ident(name)
    }

    fn eat_ident(&mut self, name: &str) -> bool {
        if self.at_ident(name) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        if self.peek().kind == TokenKind::Ident {
            Ok(self.bump().text)
        } else {
            Err(self.error_here("expected an identifier"))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseFailure {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("`{}`", token.text),
        };
        ParseFailure {
            message: format!("{}, found {}", message.into(), found),
            offset: token.offset,
            len: token.len.max(1),
        }
    }

    fn skip_balanced(&mut self, open: &str, close: &str) -> ParseResult<()> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error_here(format!("unclosed `{}`", open)));
            }
            let token = self.bump();
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn qualified_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_name()?;
        while self.at_punct(".") && self.peek_at(1).kind == TokenKind::Ident {
            self.bump();
            name.push('.');
            name.push_str(&self.bump().text);
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Compilation unit
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self, path: &Path) -> ParseResult<CompilationUnit> {
        let mut unit = CompilationUnit {
            path: path.to_path_buf(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
        };

        while !self.at_eof() {
            if self.eat_punct(";") {
                continue;
            }
            if self.at_ident("import") {
                unit.imports.push(self.import()?);
                continue;
            }

            let doc = self.peek().doc.clone();
            let (modifiers, annotations) = self.modifiers()?;

            if self.eat_ident("package") {
                unit.package = Some(self.qualified_name()?);
                self.expect_punct(";")?;
                continue;
            }

            // module-info.java declares no types
            if self.at_ident("module") || (self.at_ident("open") && self.peek_at(1).is_ident("module")) {
                break;
            }

            if !self.at_type_decl() {
                return Err(self.error_here("expected a type declaration"));
            }
            let decl = self.type_decl(doc, modifiers, annotations)?;
            unit.types.push(decl);
        }

        Ok(unit)
    }

    fn import(&mut self) -> ParseResult<Import> {
        self.bump();
        let is_static = self.eat_ident("static");
        let mut path = self.expect_name()?;
        let mut wildcard = false;

        while self.eat_punct(".") {
            if self.eat_punct("*") {
                wildcard = true;
                break;
            }
            path.push('.');
            path.push_str(&self.expect_name()?);
        }
        self.expect_punct(";")?;

        Ok(Import {
            path,
            wildcard,
            is_static,
        })
    }

    // ------------------------------------------------------------------
    // Modifiers and annotations
    // ------------------------------------------------------------------

    fn modifiers(&mut self) -> ParseResult<(Modifiers, Vec<Annotation>)> {
        let mut modifiers = Modifiers::default();
        let mut annotations = Vec::new();

        loop {
            if self.at_punct("@") && !self.peek_at(1).is_ident("interface") {
                annotations.push(self.annotation()?);
                continue;
            }

            if self.peek().kind != TokenKind::Ident {
                break;
            }

            match self.peek().text.as_str() {
                "public" => modifiers.visibility = Visibility::Public,
                "protected" => modifiers.visibility = Visibility::Protected,
                "private" => modifiers.visibility = Visibility::Private,
                "static" => modifiers.is_static = true,
                "final" => modifiers.is_final = true,
                "abstract" => modifiers.is_abstract = true,
                "default" => modifiers.is_default = true,
                "native" | "synchronized" | "transient" | "volatile" | "strictfp" | "sealed" => {}
                "non" if self.peek_at(1).is_punct("-") && self.peek_at(2).is_ident("sealed") => {
                    self.bump();
                    self.bump();
                }
                _ => break,
            }
            self.bump();
        }

        Ok((modifiers, annotations))
    }

    fn annotation(&mut self) -> ParseResult<Annotation> {
        let line = self.peek().line;
        self.expect_punct("@")?;
        let name = self.qualified_name()?;
        let mut args = Vec::new();

        if self.eat_punct("(") && !self.eat_punct(")") {
            if self.peek().kind == TokenKind::Ident && self.peek_at(1).is_punct("=") {
                loop {
                    let key = self.expect_name()?;
                    self.expect_punct("=")?;
                    let value = self.element_value()?;
                    args.push((key, value));
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            } else {
                let value = self.element_value()?;
                args.push(("value".to_string(), value));
            }
            self.expect_punct(")")?;
        }

        Ok(Annotation { name, args, line })
    }

    fn element_value(&mut self) -> ParseResult<AnnotationValue> {
        if self.eat_punct("{") {
            let mut items = Vec::new();
            while !self.at_punct("}") {
                items.push(self.element_value()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("}")?;
            return Ok(AnnotationValue::Array(items));
        }

        if self.at_punct("@") {
            self.annotation()?;
            return Ok(AnnotationValue::Other);
        }

        let tokens = self.capture_expression(&[",", ")", "}"])?;
        Ok(annotation_value(&tokens))
    }

    /// Skip annotations that decorate a type use (`@NonNull String`).
    fn skip_type_annotations(&mut self) -> ParseResult<()> {
        while self.at_punct("@") && !self.peek_at(1).is_ident("interface") {
            self.annotation()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> ParseResult<TypeReference> {
        self.skip_type_annotations()?;

        if self.eat_punct("?") {
            if self.eat_ident("extends") {
                return self.parse_type();
            }
            if self.eat_ident("super") {
                self.parse_type()?;
                return Ok(TypeReference::simple(OBJECT));
            }
            return Ok(TypeReference::simple("?"));
        }

        let mut name = self.expect_name()?;
        let mut args = Vec::new();
        if self.at_punct("<") {
            args = self.type_args()?;
        }

        while self.at_punct(".")
            && (self.peek_at(1).kind == TokenKind::Ident || self.peek_at(1).is_punct("@"))
        {
            self.bump();
            self.skip_type_annotations()?;
            name.push('.');
            name.push_str(&self.expect_name()?);
            if self.at_punct("<") {
                args = self.type_args()?;
            }
        }

        let dims = self.array_dims();
        Ok(TypeReference {
            name,
            args,
            array_dims: dims,
        })
    }

    fn type_args(&mut self) -> ParseResult<Vec<TypeReference>> {
        self.expect_punct("<")?;
        let mut args = Vec::new();
        if self.eat_punct(">") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(">")?;
        Ok(args)
    }

    fn array_dims(&mut self) -> u8 {
        let mut dims = 0u8;
        while self.at_punct("[") && self.peek_at(1).is_punct("]") {
            self.bump();
            self.bump();
            dims = dims.saturating_add(1);
        }
        dims
    }

    fn type_params(&mut self) -> ParseResult<Vec<String>> {
        self.expect_punct("<")?;
        let mut names = Vec::new();
        loop {
            self.skip_type_annotations()?;
            names.push(self.expect_name()?);
            if self.eat_ident("extends") {
                self.parse_type()?;
                while self.eat_punct("&") {
                    self.parse_type()?;
                }
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(">")?;
        Ok(names)
    }

    fn type_list(&mut self) -> ParseResult<Vec<TypeReference>> {
        let mut types = vec![self.parse_type()?];
        while self.eat_punct(",") {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if self.eat_punct(")") {
            return Ok(params);
        }

        loop {
            let (_, annotations) = self.modifiers()?;
            let mut ty = self.parse_type()?;
            if self.eat_punct("...") {
                ty = ty.with_array_dims(1);
            }
            let name = self.expect_name()?;
            let dims = self.array_dims();
            params.push(Param {
                name,
                ty: ty.with_array_dims(dims),
                annotations,
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn at_type_decl(&self) -> bool {
        let token = self.peek();
        token.is_ident("class")
            || token.is_ident("interface")
            || token.is_ident("enum")
            || (token.is_punct("@") && self.peek_at(1).is_ident("interface"))
            || (token.is_ident("record")
                && self.peek_at(1).kind == TokenKind::Ident
                && (self.peek_at(2).is_punct("(") || self.peek_at(2).is_punct("<")))
    }

    fn type_decl(
        &mut self,
        doc: Option<String>,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
    ) -> ParseResult<TypeDecl> {
        let line = self.peek().line;
        let kind = if self.eat_punct("@") {
            self.bump();
            DeclKind::Annotation
        } else {
            let keyword = self.bump();
            DeclKind::parse(&keyword.text).ok_or_else(|| ParseFailure {
                message: format!("unexpected `{}`", keyword.text),
                offset: keyword.offset,
                len: keyword.len,
            })?
        };

        let name = self.expect_name()?;
        let mut decl = TypeDecl::new(name, kind, line);
        decl.modifiers = modifiers;
        decl.annotations = annotations;
        decl.doc = doc;

        if self.at_punct("<") {
            decl.type_params = self.type_params()?;
        }
        if kind == DeclKind::Record {
            decl.components = self.params()?;
        }

        loop {
            if self.eat_ident("extends") {
                decl.extends = self.type_list()?;
            } else if self.eat_ident("implements") {
                decl.implements = self.type_list()?;
            } else if self.eat_ident("permits") {
                self.type_list()?;
            } else {
                break;
            }
        }

        self.expect_punct("{")?;
        if kind == DeclKind::Enum {
            self.enum_constants(&mut decl)?;
        }
        self.members(&mut decl)?;
        self.expect_punct("}")?;

        Ok(decl)
    }

    fn enum_constants(&mut self, decl: &mut TypeDecl) -> ParseResult<()> {
        while !self.at_punct(";") && !self.at_punct("}") {
            let doc = self.peek().doc.clone();
            self.modifiers()?;
            let name = self.expect_name()?;
            if self.at_punct("(") {
                self.skip_balanced("(", ")")?;
            }
            if self.at_punct("{") {
                self.skip_balanced("{", "}")?;
            }
            decl.constants.push(EnumConstant { name, doc });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.eat_punct(";");
        Ok(())
    }

    fn members(&mut self, decl: &mut TypeDecl) -> ParseResult<()> {
        let in_interface = matches!(decl.kind, DeclKind::Interface | DeclKind::Annotation);

        while !self.at_punct("}") {
            if self.at_eof() {
                return Err(self.error_here(format!("unclosed body of `{}`", decl.name)));
            }
            if self.eat_punct(";") {
                continue;
            }

            let doc = self.peek().doc.clone();

            // Initializer blocks
            if self.at_punct("{") {
                self.skip_balanced("{", "}")?;
                continue;
            }
            if self.at_ident("static") && self.peek_at(1).is_punct("{") {
                self.bump();
                self.skip_balanced("{", "}")?;
                continue;
            }

            let (mut modifiers, annotations) = self.modifiers()?;
            if in_interface && modifiers.visibility == Visibility::Package {
                modifiers.visibility = Visibility::Public;
            }

            if self.at_type_decl() {
                let mut member = self.type_decl(doc, modifiers, annotations)?;
                if in_interface || member.kind != DeclKind::Class {
                    member.modifiers.is_static = true;
                }
                decl.members.push(member);
                continue;
            }

            // Generic method or constructor
            if self.at_punct("<") {
                self.type_params()?;
            }

            let line = self.peek().line;

            // Constructors, including compact record constructors
            if self.peek().is_ident(&decl.name)
                && (self.peek_at(1).is_punct("(") || self.peek_at(1).is_punct("{"))
            {
                self.bump();
                if self.at_punct("(") {
                    self.skip_balanced("(", ")")?;
                }
                if self.eat_ident("throws") {
                    self.type_list()?;
                }
                if self.at_punct("{") {
                    self.skip_balanced("{", "}")?;
                } else {
                    self.expect_punct(";")?;
                }
                continue;
            }

            let ty = self.parse_type()?;
            let name = self.expect_name()?;

            if self.at_punct("(") {
                let params = self.params()?;
                let extra_dims = self.array_dims();
                if self.eat_ident("throws") {
                    self.type_list()?;
                }

                let has_body = if self.eat_ident("default") {
                    self.element_value()?;
                    self.expect_punct(";")?;
                    false
                } else if self.at_punct("{") {
                    self.skip_balanced("{", "}")?;
                    true
                } else {
                    self.expect_punct(";")?;
                    false
                };

                if in_interface && !has_body && !modifiers.is_static {
                    modifiers.is_abstract = true;
                }

                let return_type = if ty.name == "void" && ty.array_dims == 0 {
                    None
                } else {
                    Some(ty.with_array_dims(extra_dims))
                };

                decl.methods.push(MethodDecl {
                    name,
                    return_type,
                    params,
                    modifiers,
                    annotations,
                    doc,
                    has_body,
                    line,
                });
                continue;
            }

            if in_interface {
                modifiers.is_static = true;
                modifiers.is_final = true;
            }

            let mut name = name;
            loop {
                let dims = self.array_dims();
                let initializer = if self.eat_punct("=") {
                    Some(self.initializer()?)
                } else {
                    None
                };

                decl.fields.push(FieldDecl {
                    name,
                    ty: ty.clone().with_array_dims(dims),
                    modifiers,
                    annotations: annotations.clone(),
                    doc: doc.clone(),
                    initializer,
                    line,
                });

                if self.eat_punct(",") {
                    name = self.expect_name()?;
                    continue;
                }
                self.expect_punct(";")?;
                break;
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn initializer(&mut self) -> ParseResult<Initializer> {
        if self.at_punct("{") {
            self.skip_balanced("{", "}")?;
            return Ok(Initializer::Expression);
        }
        let tokens = self.capture_expression(&[","])?;
        Ok(initializer(&tokens))
    }

    /// Collect the tokens of an expression up to a top-level stop token or `;`.
    fn capture_expression(&mut self, stops: &[&str]) -> ParseResult<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        let mut angle = 0usize;

        loop {
            if self.at_eof() {
                return Err(self.error_here("unterminated expression"));
            }

            let token = self.peek();
            if depth == 0 && token.is_punct(";") {
                break;
            }
            if depth == 0 && angle == 0 && stops.iter().any(|s| token.is_punct(s)) {
                break;
            }

            if token.kind == TokenKind::Punct {
                match token.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            // A closing bracket that belongs to the caller
                            break;
                        }
                        depth -= 1;
                    }
                    "<" if opens_type_args(tokens.last()) => angle += 1,
                    ">" if angle > 0 => angle -= 1,
                    _ => {}
                }
            }

            tokens.push(self.bump());
        }

        if tokens.is_empty() {
            return Err(self.error_here("expected an expression"));
        }
        Ok(tokens)
    }
}

/// Whether a `<` after `prev` starts type arguments rather than a comparison.
fn opens_type_args(prev: Option<&Token>) -> bool {
    match prev {
        Some(t) if t.is_punct(".") => true,
        Some(t) if t.kind == TokenKind::Ident => {
            t.text.starts_with(|c: char| c.is_uppercase())
                && !t.text.chars().all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit())
        }
        _ => false,
    }
}

fn initializer(tokens: &[Token]) -> Initializer {
    match tokens {
        [t] => literal(t)
            .map(Initializer::Literal)
            .unwrap_or_else(|| match t.kind {
                TokenKind::Ident => Initializer::Name(t.text.clone()),
                _ => Initializer::Expression,
            }),
        [minus, t] if minus.is_punct("-") => match literal(t) {
            Some(Literal::Int(v)) => Initializer::Literal(Literal::Int(v.wrapping_neg())),
            Some(Literal::Float(v)) => Initializer::Literal(Literal::Float(-v)),
            _ => Initializer::Expression,
        },
        _ => {
            if let Some(s) = string_concat(tokens) {
                Initializer::Literal(Literal::Str(s))
            } else if let Some(name) = qualified_name(tokens) {
                Initializer::Name(name)
            } else {
                Initializer::Expression
            }
        }
    }
}

fn annotation_value(tokens: &[Token]) -> AnnotationValue {
    if let Some(s) = string_concat(tokens) {
        return AnnotationValue::Str(s);
    }
    if let [t] = tokens {
        if matches!(
            t.kind,
            TokenKind::Int | TokenKind::Float | TokenKind::Char
        ) || (t.kind == TokenKind::Ident && matches!(t.text.as_str(), "true" | "false"))
        {
            return AnnotationValue::Literal(t.text.clone());
        }
    }
    if let Some(name) = qualified_name(tokens) {
        return AnnotationValue::Name(name);
    }
    AnnotationValue::Other
}

/// `"a" + "b" + ...` folded into one string.
fn string_concat(tokens: &[Token]) -> Option<String> {
    let mut value = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i % 2 == 0 {
            if token.kind != TokenKind::Str {
                return None;
            }
            value.push_str(&token.text);
        } else if !token.is_punct("+") {
            return None;
        }
    }
    (tokens.len() % 2 == 1).then_some(value)
}

/// `a.b.C` written as alternating identifiers and dots.
fn qualified_name(tokens: &[Token]) -> Option<String> {
    let mut name = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i % 2 == 0 {
            if token.kind != TokenKind::Ident {
                return None;
            }
            name.push_str(&token.text);
        } else if token.is_punct(".") {
            name.push('.');
        } else {
            return None;
        }
    }
    (tokens.len() % 2 == 1).then_some(name)
}

fn literal(token: &Token) -> Option<Literal> {
    match token.kind {
        TokenKind::Int => parse_int(&token.text).map(Literal::Int),
        TokenKind::Float => parse_float(&token.text).map(Literal::Float),
        TokenKind::Str => Some(Literal::Str(token.text.clone())),
        TokenKind::Char => token.text.chars().next().map(Literal::Char),
        TokenKind::Ident => match token.text.as_str() {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            "null" => Some(Literal::Null),
            _ => None,
        },
        _ => None,
    }
}

/// Value of an integer literal. Non-decimal `int` literals wrap to 32 bits,
/// so `0xFFFFFFFF` is -1; `long` literals (`L` suffix) wrap to 64 bits.
fn parse_int(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let is_long = cleaned.ends_with(['l', 'L']);
    let cleaned = cleaned.trim_end_matches(['l', 'L']);
    let lower = cleaned.to_ascii_lowercase();

    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex.to_string(), 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin.to_string(), 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (lower[1..].to_string(), 8)
    } else {
        (lower, 10)
    };

    let value = i64::from_str_radix(&digits, radix)
        .ok()
        .or_else(|| u64::from_str_radix(&digits, radix).ok().map(|v| v as i64))?;

    // 2147483648 is only valid under unary minus, so decimals keep their width
    if !is_long && radix != 10 {
        return Some(i64::from(value as i32));
    }
    Some(value)
}

fn parse_float(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return None;
    }
    let cleaned: String = lower.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches(['f', 'd']);
    cleaned.parse().ok()
}
