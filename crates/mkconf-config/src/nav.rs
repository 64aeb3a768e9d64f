//! Parsing of the MkDocs `nav` setting.
//!
//! MkDocs accepts several shapes for a nav item:
//!
//! ```yaml
//! nav:
//!   - index.md                      # page, title resolved later
//!   - User Guide: guide/intro.md    # titled page
//!   - Reference:                    # section
//!       - reference/api.md
//!   - Issues: https://example.com   # external link
//! ```

use serde_yaml::Value;

use crate::ConfigError;

/// A single entry of the configured navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEntry {
    /// A Markdown page, `path` relative to `docs_dir`.
    Page {
        /// Explicit title from the nav, if any.
        title: Option<String>,
        /// Source path relative to `docs_dir`.
        path: String,
    },
    /// A titled group of entries.
    Section {
        /// Section title.
        title: String,
        /// Nested entries.
        children: Vec<NavEntry>,
    },
    /// An external link.
    Link {
        /// Link title.
        title: String,
        /// Target URL.
        url: String,
    },
}

/// Parse the `nav` value of `mkdocs.yml`.
pub(crate) fn parse_nav(value: &Value) -> Result<Vec<NavEntry>, ConfigError> {
    let Value::Sequence(items) = value else {
        return Err(ConfigError::Validation("nav must be a list".to_owned()));
    };
    items.iter().map(parse_item).collect()
}

fn parse_item(item: &Value) -> Result<NavEntry, ConfigError> {
    match item {
        Value::String(target) => Ok(entry_for_target(None, target)),
        Value::Mapping(map) => {
            let mut entries = map.iter();
            let (Some((key, value)), None) = (entries.next(), entries.next()) else {
                return Err(ConfigError::Validation(format!(
                    "nav item must have exactly one title, got {} keys",
                    map.len()
                )));
            };
            let title = scalar_to_string(key).ok_or_else(|| {
                ConfigError::Validation(format!("nav title must be a string, got {key:?}"))
            })?;
            match value {
                Value::Sequence(_) => Ok(NavEntry::Section {
                    children: parse_nav(value)?,
                    title,
                }),
                Value::String(target) => Ok(entry_for_target(Some(title), target)),
                other => Err(ConfigError::Validation(format!(
                    "nav item '{title}' must point to a page, link or list, got {other:?}"
                ))),
            }
        }
        other => Err(ConfigError::Validation(format!(
            "unsupported nav item: {other:?}"
        ))),
    }
}

fn entry_for_target(title: Option<String>, target: &str) -> NavEntry {
    if is_external(target) {
        NavEntry::Link {
            title: title.unwrap_or_else(|| target.to_owned()),
            url: target.to_owned(),
        }
    } else {
        NavEntry::Page {
            title,
            path: target.trim_start_matches("./").to_owned(),
        }
    }
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nav(yaml: &str) -> Result<Vec<NavEntry>, ConfigError> {
        parse_nav(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_bare_page() {
        assert_eq!(
            nav("- index.md").unwrap(),
            vec![NavEntry::Page {
                title: None,
                path: "index.md".to_owned()
            }]
        );
    }

    #[test]
    fn test_titled_page_and_section() {
        let entries = nav(
            "- Home: index.md\n- Guide:\n    - guide/install.md\n    - Usage: guide/usage.md\n",
        )
        .unwrap();
        assert_eq!(
            entries,
            vec![
                NavEntry::Page {
                    title: Some("Home".to_owned()),
                    path: "index.md".to_owned()
                },
                NavEntry::Section {
                    title: "Guide".to_owned(),
                    children: vec![
                        NavEntry::Page {
                            title: None,
                            path: "guide/install.md".to_owned()
                        },
                        NavEntry::Page {
                            title: Some("Usage".to_owned()),
                            path: "guide/usage.md".to_owned()
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_external_link() {
        let entries = nav("- Issues: https://github.com/org/repo/issues").unwrap();
        assert_eq!(
            entries,
            vec![NavEntry::Link {
                title: "Issues".to_owned(),
                url: "https://github.com/org/repo/issues".to_owned()
            }]
        );
    }

    #[test]
    fn test_leading_dot_slash_stripped() {
        let entries = nav("- ./about.md").unwrap();
        assert_eq!(
            entries,
            vec![NavEntry::Page {
                title: None,
                path: "about.md".to_owned()
            }]
        );
    }

    #[test]
    fn test_multi_key_item_rejected() {
        let err = nav("- {A: a.md, B: b.md}").unwrap_err();
        assert!(err.to_string().contains("exactly one title"));
    }

    #[test]
    fn test_nav_must_be_list() {
        assert!(nav("home: index.md").is_err());
    }
}
