//! Default values from field initializers.
//!
//! Only initializers that need no evaluation produce a default: literals,
//! constants of the property's enum type, and references to a static field
//! of the same declaration that is itself initialized with a literal.

use serde_json::Value;

use crate::core::types::{DeclId, ResolvedType, TypeKind};
use crate::index::SourceIndex;
use crate::java::ast::{Initializer, Literal};

/// The default value of a member of type `ty` declared in `owner`.
pub fn default_value(
    initializer: &Initializer,
    ty: &ResolvedType,
    owner: DeclId,
    index: &SourceIndex,
) -> Option<Value> {
    match initializer {
        Initializer::Literal(literal) => literal_value(literal),
        Initializer::Name(name) => match ty.kind {
            TypeKind::Enum(id) => enum_constant(name, id, index),
            _ => constant_value(name, owner, index),
        },
        Initializer::Expression => None,
    }
}

fn literal_value(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::Int(i) => Some(Value::from(*i)),
        Literal::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Literal::Str(s) => Some(Value::String(s.clone())),
        Literal::Char(c) => Some(Value::String(c.to_string())),
        Literal::Bool(b) => Some(Value::Bool(*b)),
        Literal::Null => None,
    }
}

/// `Mode.FAST` or `FAST`, checked against the enum's constants.
fn enum_constant(name: &str, enum_id: DeclId, index: &SourceIndex) -> Option<Value> {
    let constant = name.rsplit('.').next().unwrap_or(name);
    index
        .decl(enum_id)
        .constants
        .iter()
        .find(|c| c.as_str() == constant)
        .map(|c| Value::String(c.clone()))
}

/// `DEFAULT_PORT` or `Owner.DEFAULT_PORT`, one level deep.
fn constant_value(name: &str, owner: DeclId, index: &SourceIndex) -> Option<Value> {
    let decl = index.decl(owner);
    let field_name = match name.rsplit_once('.') {
        Some((qualifier, field)) if qualifier == decl.simple_name || qualifier == decl.qualified_name => field,
        Some(_) => return None,
        None => name,
    };

    let field = decl.field(field_name).filter(|f| f.is_static)?;
    match field.default.as_ref()? {
        Initializer::Literal(literal) => literal_value(literal),
        _ => None,
    }
}
