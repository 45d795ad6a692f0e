//! Loading prebuilt dependency surfaces.
//!
//! An archive root may be a class directory, a `.jar`/`.zip` file, a single
//! `.class` file or a `.toml` surface descriptor. Every form is turned into
//! compilation units without imports, one per package.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::ZipArchive;

use super::classfile::{is_anonymous, parse_class, ParsedClass};
use super::descriptor::parse_descriptor;
use super::errors::IndexError;
use crate::java::ast::{CompilationUnit, TypeDecl};
use crate::util::fs::files_with_extension;

/// Load one archive root.
pub fn load_archive(path: &Path) -> Result<Vec<CompilationUnit>, IndexError> {
    let classes = if path.is_dir() {
        scan_class_dir(path)?
    } else if has_extension(path, &["jar", "zip"]) {
        scan_jar(path)?
    } else if has_extension(path, &["class"]) {
        vec![read_class_file(path)?]
    } else if has_extension(path, &["toml"]) {
        let text = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_descriptor(&text).map_err(|message| IndexError::Descriptor {
            path: path.to_path_buf(),
            message,
        })?
    } else if !path.exists() {
        return Err(IndexError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        });
    } else {
        return Err(IndexError::Descriptor {
            path: path.to_path_buf(),
            message: "expected a class directory, .jar, .class or .toml file".to_string(),
        });
    };

    tracing::debug!("{}: {} classes", path.display(), classes.len());
    Ok(assemble(path, classes))
}

fn scan_class_dir(root: &Path) -> Result<Vec<ParsedClass>, IndexError> {
    let files = files_with_extension(root, "class", &[]).map_err(|e| IndexError::Io {
        path: root.to_path_buf(),
        source: std::io::Error::other(format!("{:#}", e)),
    })?;

    let mut classes = Vec::new();
    for file in files {
        let stem = file.file_stem().and_then(OsStr::to_str).unwrap_or_default();
        if should_skip_class(stem) {
            continue;
        }
        classes.push(read_class_file(&file)?);
    }
    Ok(classes)
}

fn read_class_file(path: &Path) -> Result<ParsedClass, IndexError> {
    let bytes = std::fs::read(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_class(&bytes).map_err(|source| IndexError::ClassFile {
        path: path.to_path_buf(),
        source,
    })
}

fn scan_jar(path: &Path) -> Result<Vec<ParsedClass>, IndexError> {
    let file = File::open(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|source| IndexError::Zip {
        path: path.to_path_buf(),
        source,
    })?;

    let mut classes = Vec::new();
    let mut buffer = Vec::new();

    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx).map_err(|source| IndexError::Zip {
            path: path.to_path_buf(),
            source,
        })?;

        if !entry.is_file() {
            continue;
        }

        let name = entry.name().to_string();
        if name.starts_with("META-INF/") {
            continue;
        }
        let Some(binary_name) = name
            .strip_prefix("BOOT-INF/classes/")
            .unwrap_or(name.as_str())
            .strip_suffix(".class")
        else {
            continue;
        };
        let simple = binary_name.rsplit('/').next().unwrap_or(binary_name);
        if should_skip_class(simple) {
            continue;
        }

        buffer.clear();
        entry
            .read_to_end(&mut buffer)
            .map_err(|source| IndexError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let class = parse_class(&buffer).map_err(|source| IndexError::ClassFile {
            path: path.join(&name),
            source,
        })?;
        classes.push(class);
    }

    Ok(classes)
}

fn should_skip_class(simple_name: &str) -> bool {
    simple_name == "module-info" || simple_name == "package-info" || is_anonymous(simple_name)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Group classes by package and attach member classes to their outer class.
///
/// A member class whose outer class is missing stays top-level under its
/// dotted nested name.
pub(crate) fn assemble(path: &Path, mut classes: Vec<ParsedClass>) -> Vec<CompilationUnit> {
    classes.sort_by(|a, b| {
        (&a.package, a.nesting.len(), &a.nesting).cmp(&(&b.package, b.nesting.len(), &b.nesting))
    });

    let mut packages: BTreeMap<String, Vec<TypeDecl>> = BTreeMap::new();
    for class in classes {
        let types = packages.entry(class.package).or_default();
        let outer = &class.nesting[..class.nesting.len().saturating_sub(1)];
        let mut decl = class.decl;

        match find_decl_mut(types, outer) {
            Some(parent) => {
                decl.modifiers.is_static = true;
                parent.members.push(decl);
            }
            None => {
                decl.name = class.nesting.join(".");
                types.push(decl);
            }
        }
    }

    packages
        .into_iter()
        .map(|(package, types)| CompilationUnit {
            path: path.to_path_buf(),
            package: (!package.is_empty()).then_some(package),
            imports: Vec::new(),
            types,
        })
        .collect()
}

fn find_decl_mut<'a>(types: &'a mut [TypeDecl], path: &[String]) -> Option<&'a mut TypeDecl> {
    let (first, rest) = path.split_first()?;
    let decl = types.iter_mut().find(|t| &t.name == first)?;
    if rest.is_empty() {
        Some(decl)
    } else {
        find_decl_mut(&mut decl.members, rest)
    }
}
