//! Test fixtures for common test scenarios.
//!
//! This module provides Java source trees and helpers for building an
//! index over them.

use std::path::{Path, PathBuf};

use crate::core::marker::MarkerSet;
use crate::index::{ModuleSpec, SourceIndex};

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Write every `(relative path, contents)` pair under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        write_file(&root.join(path), contents);
    }
}

/// Index `files` as a single source module named `app` rooted at `root`.
///
/// Panics if indexing reports any error.
pub fn index_sources(root: &Path, files: &[(&str, &str)]) -> SourceIndex {
    write_tree(root, files);
    let mut index = SourceIndex::new(MarkerSet::default());
    index
        .register(ModuleSpec::source("app", vec![root.to_path_buf()]))
        .unwrap();
    let errors = index.build();
    assert!(errors.is_empty(), "unexpected index errors: {:?}", errors);
    index
}

/// Fixture for a multi-module Java project on disk.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    /// Source modules: name, dependencies and files relative to the module root.
    pub modules: Vec<ModuleFixture>,
    /// Surface descriptors: file name and TOML contents.
    pub descriptors: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ModuleFixture {
    pub name: String,
    pub dependencies: Vec<String>,
    pub files: Vec<(String, String)>,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source module.
    pub fn with_module(mut self, name: &str, dependencies: &[&str], files: &[(&str, &str)]) -> Self {
        self.modules.push(ModuleFixture {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        });
        self
    }

    /// Add a surface descriptor, registered as an archive module of the same name.
    pub fn with_descriptor(mut self, file_name: &str, contents: &str) -> Self {
        self.descriptors
            .push((file_name.to_string(), contents.to_string()));
        self
    }

    /// Write the project under `base_path` and return the module specs.
    ///
    /// Modules live in `<base>/<name>/src/main/java`; descriptors in `<base>/libs`.
    pub fn write_to(&self, base_path: &Path) -> Vec<ModuleSpec> {
        let mut specs = Vec::new();

        for (file_name, contents) in &self.descriptors {
            let path = base_path.join("libs").join(file_name);
            write_file(&path, contents);
            specs.push(ModuleSpec::archive(file_name.clone(), path));
        }

        for module in &self.modules {
            let root = module_root(base_path, &module.name);
            for (path, contents) in &module.files {
                write_file(&root.join(path), contents);
            }
            let mut spec = ModuleSpec::source(module.name.clone(), vec![root]);
            for dep in &module.dependencies {
                spec = spec.depends_on(dep.clone());
            }
            specs.push(spec);
        }

        specs
    }

    /// Write the project and build an index over it.
    pub fn build(&self, base_path: &Path) -> (SourceIndex, Vec<crate::index::IndexError>) {
        let mut index = SourceIndex::new(MarkerSet::default());
        for spec in self.write_to(base_path) {
            index.register(spec).unwrap();
        }
        let errors = index.build();
        (index, errors)
    }
}

/// Source root of a module written by [`ProjectFixture::write_to`].
pub fn module_root(base_path: &Path, module: &str) -> PathBuf {
    base_path.join(module).join("src/main/java")
}

/// Pre-built Java sources.
pub mod sources {
    /// A holder with a plain property and a nested group whose property is
    /// deprecated in favor of `root.retry.limit`.
    pub const RETRY_PROPERTIES: &str = r#"package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;
import org.springframework.boot.context.properties.DeprecatedConfigurationProperty;

@ConfigurationProperties(prefix = "root")
public class RootProperties {

    private int timeout = 30;

    private final Retry retry = new Retry();

    public int getTimeout() {
        return timeout;
    }

    public void setTimeout(int timeout) {
        this.timeout = timeout;
    }

    public Retry getRetry() {
        return retry;
    }

    public static class Retry {

        private int maxAttempts = 3;

        @DeprecatedConfigurationProperty(replacement = "root.retry.limit")
        public int getMaxAttempts() {
            return maxAttempts;
        }

        public void setMaxAttempts(int maxAttempts) {
            this.maxAttempts = maxAttempts;
        }
    }
}
"#;

    /// A holder exercising enums, enum-keyed maps, nested groups and
    /// accessor-level deprecation.
    pub const ACME_PROPERTIES: &str = r#"package com.acme;

import jakarta.validation.constraints.NotEmpty;
import jakarta.validation.constraints.NotNull;
import jakarta.validation.constraints.Pattern;
import org.springframework.boot.context.properties.ConfigurationProperties;
import org.springframework.boot.context.properties.DeprecatedConfigurationProperty;
import org.springframework.boot.context.properties.NestedConfigurationProperty;

import java.util.List;
import java.util.Map;

/**
 * Settings of the Acme server.
 */
@ConfigurationProperties(prefix = "acme.server")
public class AcmeProperties {

    /**
     * The host for the Acme server.
     */
    private String host;

    /**
     * The hostname for the Acme server.
     */
    @NotEmpty
    private String hostname;

    /**
     * The port number used by the Acme server. Defaults to 8080.
     */
    @NotNull
    private Integer port = 8080;

    /**
     * The value using the enumeration as a value.
     */
    private EnumeratedOptions enumeratedOption = EnumeratedOptions.OPTION_1;

    /**
     * The value using the enumeration as a value in a collection.
     */
    private List<EnumeratedOptions> enumeratedOptions = List.of(EnumeratedOptions.OPTION_1);

    /**
     * The map using enumeration as a map key.
     */
    private Map<EnumeratedKey, EnumeratedValue> enumeratedMap;

    @NestedConfigurationProperty
    private Nested nested = new Nested();

    @DeprecatedConfigurationProperty(reason = "Deprecation reason", replacement = "acme.server.hostname")
    public String getHost() {
        return host;
    }

    public void setHost(String host) {
        this.host = host;
    }

    public String getHostname() {
        return hostname;
    }

    public void setHostname(String hostname) {
        this.hostname = hostname;
    }

    public Integer getPort() {
        return port;
    }

    public void setPort(Integer port) {
        this.port = port;
    }

    public Nested getNested() {
        return nested;
    }

    public EnumeratedOptions getEnumeratedOption() {
        return enumeratedOption;
    }

    public List<EnumeratedOptions> getEnumeratedOptions() {
        return enumeratedOptions;
    }

    public Map<EnumeratedKey, EnumeratedValue> getEnumeratedMap() {
        return enumeratedMap;
    }

    public enum EnumeratedOptions {
        OPTION_1, OPTION_2, OPTION_3;
    }

    public enum EnumeratedKey {
        VALUE_1, VALUE_2, VALUE_3;
    }

    public static class EnumeratedValue {
        /**
         * The value used by the enumerated value.
         */
        @Pattern(regexp = "^[a-zA-Z0-9]+$", message = "Value must be alphanumeric")
        private String value;

        public String getValue() {
            return value;
        }
    }

    public static class Nested {

        /**
         * Name used by the nested property.
         */
        private String name;

        public String getName() {
            return name;
        }
    }
}
"#;

    /// Two holders nesting each other.
    pub const CYCLIC_PROPERTIES: &str = r#"package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;
import org.springframework.boot.context.properties.NestedConfigurationProperty;

@ConfigurationProperties("loop")
public class LoopProperties {
    public String name;

    @NestedConfigurationProperty
    public Node node;
}
"#;

    pub const CYCLIC_NODE: &str = r#"package com.acme;

import org.springframework.boot.context.properties.NestedConfigurationProperty;

public class Node {
    public int weight;

    @NestedConfigurationProperty
    public LoopProperties back;
}
"#;
}
