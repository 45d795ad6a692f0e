//! Minimal class-file reader.
//!
//! Reads the public symbol surface of a compiled class: its name, kind,
//! generic signature, supertypes, instance fields, public methods, enum
//! constants and annotations. Method bodies are never decoded.

use thiserror::Error;

use crate::core::types::{TypeReference, OBJECT};
use crate::java::ast::{
    Annotation, AnnotationValue, DeclKind, EnumConstant, FieldDecl, MethodDecl, Modifiers, Param,
    TypeDecl, Visibility,
};

pub(crate) const ACC_PUBLIC: u16 = 0x0001;
pub(crate) const ACC_PRIVATE: u16 = 0x0002;
pub(crate) const ACC_PROTECTED: u16 = 0x0004;
pub(crate) const ACC_STATIC: u16 = 0x0008;
pub(crate) const ACC_FINAL: u16 = 0x0010;
pub(crate) const ACC_BRIDGE: u16 = 0x0040;
pub(crate) const ACC_INTERFACE: u16 = 0x0200;
pub(crate) const ACC_ABSTRACT: u16 = 0x0400;
pub(crate) const ACC_SYNTHETIC: u16 = 0x1000;
pub(crate) const ACC_ANNOTATION: u16 = 0x2000;
pub(crate) const ACC_ENUM: u16 = 0x4000;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("malformed signature `{0}`")]
    InvalidSignature(String),
}

/// The surface of one compiled class.
#[derive(Debug, Clone)]
pub struct ParsedClass {
    /// Dotted package name, empty for the default package.
    pub package: String,
    /// Enclosing class names followed by the class's own simple name.
    pub nesting: Vec<String>,
    pub decl: TypeDecl,
}

/// Whether a class-file entry name belongs to an anonymous or local class.
pub fn is_anonymous(binary_name: &str) -> bool {
    binary_name
        .split('$')
        .skip(1)
        .any(|part| part.starts_with(|c: char| c.is_ascii_digit()))
}

pub fn parse_class(bytes: &[u8]) -> Result<ParsedClass, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.read_u2()?;
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let binary_name = pool.class_name(this_class)?;
    let (package, nesting) = split_binary_name(&binary_name);
    let simple_name = nesting.last().cloned().unwrap_or_default();

    let super_name = if super_class == 0 {
        None
    } else {
        Some(pool.class_name(super_class)?)
    };

    let kind = if access_flags & ACC_ANNOTATION != 0 {
        DeclKind::Annotation
    } else if access_flags & ACC_INTERFACE != 0 {
        DeclKind::Interface
    } else if access_flags & ACC_ENUM != 0 {
        DeclKind::Enum
    } else if super_name.as_deref() == Some("java/lang/Record") {
        DeclKind::Record
    } else {
        DeclKind::Class
    };

    let mut decl = TypeDecl::new(simple_name, kind, 0);
    decl.modifiers = modifiers(access_flags);

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        interfaces.push(TypeReference::simple(binary_to_dotted(&pool.class_name(index)?)));
    }

    let fields_count = reader.read_u2()?;
    for _ in 0..fields_count {
        let access = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();
        let attributes = read_member_attributes(&mut reader, &pool)?;

        if access & ACC_SYNTHETIC != 0 {
            continue;
        }
        if access & ACC_ENUM != 0 {
            decl.constants.push(EnumConstant { name, doc: None });
            continue;
        }

        let signature = attributes.signature.as_deref().unwrap_or(&descriptor);
        let ty = SignatureParser::new(signature).field_type()?;

        if kind == DeclKind::Record && access & ACC_STATIC == 0 {
            decl.components.push(Param {
                name: name.clone(),
                ty: ty.clone(),
                annotations: attributes.annotations.clone(),
            });
        }

        decl.fields.push(FieldDecl {
            name,
            ty,
            modifiers: modifiers(access),
            annotations: attributes.annotations,
            doc: None,
            initializer: None,
            line: 0,
        });
    }

    let methods_count = reader.read_u2()?;
    for _ in 0..methods_count {
        let access = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();
        let attributes = read_member_attributes(&mut reader, &pool)?;

        if access & (ACC_SYNTHETIC | ACC_BRIDGE) != 0 || access & ACC_PUBLIC == 0 || name.starts_with('<') {
            continue;
        }

        let signature = attributes.signature.as_deref().unwrap_or(&descriptor);
        let (params, return_type) = SignatureParser::new(signature).method_type()?;

        decl.methods.push(MethodDecl {
            name,
            return_type,
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, ty)| Param {
                    name: format!("arg{}", i),
                    ty,
                    annotations: Vec::new(),
                })
                .collect(),
            modifiers: modifiers(access),
            annotations: attributes.annotations,
            doc: None,
            has_body: access & ACC_ABSTRACT == 0,
            line: 0,
        });
    }

    let class_attributes = read_member_attributes(&mut reader, &pool)?;
    decl.annotations = class_attributes.annotations;

    match class_attributes.signature {
        Some(signature) => {
            let (type_params, supertypes) = SignatureParser::new(&signature).class_type()?;
            decl.type_params = type_params;
            let mut supertypes = supertypes.into_iter();
            if let Some(superclass) = supertypes.next() {
                push_superclass(&mut decl, superclass);
            }
            decl.implements = supertypes.collect();
        }
        None => {
            if let Some(super_name) = super_name {
                push_superclass(&mut decl, TypeReference::simple(binary_to_dotted(&super_name)));
            }
            decl.implements = interfaces;
        }
    }

    if kind == DeclKind::Interface || kind == DeclKind::Annotation {
        decl.extends = std::mem::take(&mut decl.implements);
    }

    Ok(ParsedClass {
        package,
        nesting,
        decl,
    })
}

/// Record a superclass unless it is one every class of that kind has.
fn push_superclass(decl: &mut TypeDecl, superclass: TypeReference) {
    let implicit = matches!(
        superclass.name.as_str(),
        "java.lang.Enum" | "java.lang.Record"
    ) || superclass.name == OBJECT;
    if !implicit {
        decl.extends.push(superclass);
    }
}

fn modifiers(access: u16) -> Modifiers {
    let visibility = if access & ACC_PUBLIC != 0 {
        Visibility::Public
    } else if access & ACC_PROTECTED != 0 {
        Visibility::Protected
    } else if access & ACC_PRIVATE != 0 {
        Visibility::Private
    } else {
        Visibility::Package
    };

    Modifiers {
        visibility,
        is_static: access & ACC_STATIC != 0,
        is_final: access & ACC_FINAL != 0,
        is_abstract: access & ACC_ABSTRACT != 0,
        is_default: false,
    }
}

/// `com/acme/Outer$Inner` into (`com.acme`, [`Outer`, `Inner`]).
fn split_binary_name(binary_name: &str) -> (String, Vec<String>) {
    let (package, class) = match binary_name.rsplit_once('/') {
        Some((package, class)) => (package.replace('/', "."), class),
        None => (String::new(), binary_name),
    };
    let nesting = class.split('$').map(str::to_string).collect();
    (package, nesting)
}

fn binary_to_dotted(binary_name: &str) -> String {
    binary_name.replace(['/', '$'], ".")
}

// ----------------------------------------------------------------------
// Attributes
// ----------------------------------------------------------------------

#[derive(Default)]
struct MemberAttributes {
    signature: Option<String>,
    annotations: Vec<Annotation>,
}

fn read_member_attributes(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<MemberAttributes, ClassParseError> {
    let mut attributes = MemberAttributes::default();
    let count = reader.read_u2()?;

    for _ in 0..count {
        let name = pool.utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;

        match name {
            "Signature" => {
                let slice = reader.read_slice(length)?;
                let mut sub = ClassReader::new(slice);
                attributes.signature = Some(pool.utf8(sub.read_u2()?)?.to_string());
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let slice = reader.read_slice(length)?;
                let mut sub = ClassReader::new(slice);
                let num = sub.read_u2()?;
                for _ in 0..num {
                    attributes.annotations.push(read_annotation(&mut sub, pool)?);
                }
            }
            "Deprecated" => {
                reader.skip(length)?;
                if !attributes.annotations.iter().any(|a| a.name == "java.lang.Deprecated") {
                    attributes.annotations.push(Annotation {
                        name: "java.lang.Deprecated".to_string(),
                        args: Vec::new(),
                        line: 0,
                    });
                }
            }
            _ => reader.skip(length)?,
        }
    }

    Ok(attributes)
}

fn read_annotation(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Annotation, ClassParseError> {
    let type_descriptor = pool.utf8(reader.read_u2()?)?;
    let name = SignatureParser::new(type_descriptor).field_type()?.name;

    let pairs = reader.read_u2()?;
    let mut args = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let key = pool.utf8(reader.read_u2()?)?.to_string();
        let value = read_element_value(reader, pool)?;
        args.push((key, value));
    }

    Ok(Annotation {
        name,
        args,
        line: 0,
    })
}

fn read_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationValue, ClassParseError> {
    let tag = reader.read_u1()?;
    let value = match tag {
        b's' => AnnotationValue::Str(pool.utf8(reader.read_u2()?)?.to_string()),
        b'B' | b'C' | b'I' | b'S' | b'Z' | b'J' | b'F' | b'D' => {
            match pool.literal(reader.read_u2()?, tag) {
                Some(text) => AnnotationValue::Literal(text),
                None => AnnotationValue::Other,
            }
        }
        b'e' => {
            let type_descriptor = pool.utf8(reader.read_u2()?)?;
            let owner = SignatureParser::new(type_descriptor).field_type()?.name;
            let constant = pool.utf8(reader.read_u2()?)?;
            AnnotationValue::Name(format!("{}.{}", owner, constant))
        }
        b'c' => {
            reader.read_u2()?;
            AnnotationValue::Other
        }
        b'@' => {
            read_annotation(reader, pool)?;
            AnnotationValue::Other
        }
        b'[' => {
            let count = reader.read_u2()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(read_element_value(reader, pool)?);
            }
            AnnotationValue::Array(items)
        }
        other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
    };
    Ok(value)
}

// ----------------------------------------------------------------------
// Signatures
// ----------------------------------------------------------------------

/// Parser for field descriptors and generic signatures.
struct SignatureParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self) -> ClassParseError {
        ClassParseError::InvalidSignature(self.text.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn next(&mut self) -> Result<u8, ClassParseError> {
        let c = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(c)
    }

    fn expect(&mut self, c: u8) -> Result<(), ClassParseError> {
        if self.next()? == c {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str, ClassParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.text[start..self.pos])
    }

    /// `<T:Ljava/lang/Object;>Lsuper;Liface;...`
    fn class_type(&mut self) -> Result<(Vec<String>, Vec<TypeReference>), ClassParseError> {
        let type_params = self.type_params()?;
        let mut supertypes = Vec::new();
        while self.peek().is_some() {
            supertypes.push(self.field_type()?);
        }
        Ok((type_params, supertypes))
    }

    /// `<T:...>(params)return^throws`
    fn method_type(
        &mut self,
    ) -> Result<(Vec<TypeReference>, Option<TypeReference>), ClassParseError> {
        self.type_params()?;
        self.expect(b'(')?;
        let mut params = Vec::new();
        while self.peek() != Some(b')') {
            params.push(self.field_type()?);
        }
        self.expect(b')')?;

        let return_type = if self.peek() == Some(b'V') {
            self.pos += 1;
            None
        } else {
            Some(self.field_type()?)
        };
        Ok((params, return_type))
    }

    fn type_params(&mut self) -> Result<Vec<String>, ClassParseError> {
        let mut names = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(names);
        }
        self.pos += 1;

        while self.peek() != Some(b'>') {
            names.push(self.identifier(b":")?.to_string());
            // Class bound (may be empty) then interface bounds
            self.expect(b':')?;
            if !matches!(self.peek(), Some(b':') | Some(b'>')) && self.peek_is_type_start() {
                self.field_type()?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.field_type()?;
            }
        }
        self.expect(b'>')?;
        Ok(names)
    }

    fn peek_is_type_start(&self) -> bool {
        matches!(self.peek(), Some(b'L') | Some(b'T') | Some(b'['))
    }

    fn field_type(&mut self) -> Result<TypeReference, ClassParseError> {
        let c = self.next()?;
        let ty = match c {
            b'B' => TypeReference::simple("byte"),
            b'C' => TypeReference::simple("char"),
            b'D' => TypeReference::simple("double"),
            b'F' => TypeReference::simple("float"),
            b'I' => TypeReference::simple("int"),
            b'J' => TypeReference::simple("long"),
            b'S' => TypeReference::simple("short"),
            b'Z' => TypeReference::simple("boolean"),
            b'V' => TypeReference::simple("void"),
            b'[' => self.field_type()?.with_array_dims(1),
            b'T' => {
                let name = self.identifier(b";")?.to_string();
                self.expect(b';')?;
                TypeReference::simple(name)
            }
            b'L' => self.class_type_signature()?,
            _ => return Err(self.error()),
        };
        Ok(ty)
    }

    /// `Lpkg/Outer<TT;>.Inner<*>;` after the leading `L`.
    fn class_type_signature(&mut self) -> Result<TypeReference, ClassParseError> {
        let mut name = binary_to_dotted(self.identifier(b"<;.")?);
        let mut args = Vec::new();

        loop {
            if self.peek() == Some(b'<') {
                args = self.type_args()?;
            }
            match self.next()? {
                b';' => break,
                b'.' => {
                    name.push('.');
                    name.push_str(self.identifier(b"<;.")?);
                }
                _ => return Err(self.error()),
            }
        }

        Ok(TypeReference::generic(name, args))
    }

    fn type_args(&mut self) -> Result<Vec<TypeReference>, ClassParseError> {
        self.expect(b'<')?;
        let mut args = Vec::new();
        while self.peek() != Some(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeReference::simple("?")
                }
                Some(b'+') => {
                    self.pos += 1;
                    self.field_type()?
                }
                Some(b'-') => {
                    self.pos += 1;
                    self.field_type()?;
                    TypeReference::simple(OBJECT)
                }
                _ => self.field_type()?,
            };
            args.push(arg);
        }
        self.expect(b'>')?;
        Ok(args)
    }
}

/// Parse a bare descriptor or signature, e.g. `Ljava/util/List<Ljava/lang/String;>;`.
pub fn parse_field_signature(signature: &str) -> Result<TypeReference, ClassParseError> {
    SignatureParser::new(signature).field_type()
}

// ----------------------------------------------------------------------
// Constant pool
// ----------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                3 => Constant::Integer(reader.read_u4()? as i32),
                4 => Constant::Float(f32::from_bits(reader.read_u4()?)),
                5 | 6 => {
                    let high = reader.read_u4()? as u64;
                    let low = reader.read_u4()? as u64;
                    let bits = (high << 32) | low;
                    let entry = if tag == 5 {
                        Constant::Long(bits as i64)
                    } else {
                        Constant::Double(f64::from_bits(bits))
                    };
                    // 8-byte constants take two slots
                    entries.push(entry);
                    index += 1;
                    Constant::Unusable
                }
                7 => {
                    let name_index = reader.read_u2()?;
                    Constant::Class { name_index }
                }
                8 | 16 | 19 | 20 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => Ok(self.utf8(*name_index)?.to_string()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Render a numeric constant used as an annotation element of type `tag`.
    fn literal(&self, index: u16, tag: u8) -> Option<String> {
        let text = match (self.get(index).ok()?, tag) {
            (Constant::Integer(v), b'Z') => (*v != 0).to_string(),
            (Constant::Integer(v), b'C') => char::from_u32(*v as u32)?.to_string(),
            (Constant::Integer(v), _) => v.to_string(),
            (Constant::Long(v), _) => v.to_string(),
            (Constant::Float(v), _) => v.to_string(),
            (Constant::Double(v), _) => v.to_string(),
            _ => return None,
        };
        Some(text)
    }
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        const MAGIC: u32 = 0xCAFEBABE;
        let magic = self.read_u4()?;
        if magic != MAGIC {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let value = *self.data.get(self.pos).ok_or(ClassParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(value)
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}
