//! Property naming styles.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How member names are turned into property name segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameStyle {
    /// Keep the member name as declared (`maxAttempts`).
    #[default]
    AsDeclared,
    /// Lower-case, dash-separated (`max-attempts`).
    KebabCase,
}

impl NameStyle {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameStyle::AsDeclared => name.to_string(),
            NameStyle::KebabCase => to_kebab_case(name),
        }
    }
}

impl FromStr for NameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "as-declared" => Ok(NameStyle::AsDeclared),
            "kebab-case" => Ok(NameStyle::KebabCase),
            other => Err(format!(
                "unknown naming style `{}` (expected `as-declared` or `kebab-case`)",
                other
            )),
        }
    }
}

fn to_kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        let style = NameStyle::KebabCase;
        assert_eq!(style.apply("maxAttempts"), "max-attempts");
        assert_eq!(style.apply("port"), "port");
        assert_eq!(style.apply("httpURLPath"), "http-url-path");
        assert_eq!(style.apply("URL"), "url");
        assert_eq!(style.apply("retry2Count"), "retry2-count");
        assert_eq!(style.apply("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn test_as_declared_is_identity() {
        assert_eq!(NameStyle::default().apply("maxAttempts"), "maxAttempts");
    }

    #[test]
    fn test_parse_style() {
        assert_eq!("kebab-case".parse::<NameStyle>(), Ok(NameStyle::KebabCase));
        assert_eq!("as-declared".parse::<NameStyle>(), Ok(NameStyle::AsDeclared));
        assert!("camel".parse::<NameStyle>().is_err());
    }
}
