//! Tolerant schema-file parsing
//!
//! The schema is a DSL; this is not a full parser. A small line
//! state machine tracks whether the cursor is inside a `generator` or
//! `datasource` block (the opening `{` may sit on the same line or the next
//! non-empty one) and extracts the handful of assignments the application
//! cares about.

use crate::error::CoreError;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref PROVIDER_RE: Regex = Regex::new(r#"provider\s*=\s*"([^"]+)""#).unwrap();
    static ref OUTPUT_RE: Regex = Regex::new(r#"output\s*=\s*"([^"]+)""#).unwrap();
    static ref URL_RE: Regex = Regex::new(r"url\s*=\s*(.+)").unwrap();
    static ref ENV_RE: Regex = Regex::new(r#"env\("([^"]+)"\)"#).unwrap();
}

/// The url expression of a datasource block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlExpr {
    /// `url = env("VAR")`
    Env(String),
    /// `url = "literal"`
    Literal(String),
}

/// Fields recognised in a schema file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaInfo {
    /// `output` of the generator block, when explicitly set
    pub generator_output: Option<String>,
    /// `provider` of the datasource block
    pub provider: Option<String>,
    /// `url` of the datasource block
    pub url: Option<UrlExpr>,
}

impl SchemaInfo {
    /// Render the recognised fields back into schema syntax.
    ///
    /// Parsing the result yields the same `SchemaInfo` again.
    pub fn to_schema_string(&self) -> String {
        let mut out = String::new();
        if let Some(output) = &self.generator_output {
            out.push_str("generator client {\n");
            out.push_str(&format!("  output = \"{}\"\n", output));
            out.push_str("}\n\n");
        }
        out.push_str("datasource db {\n");
        if let Some(provider) = &self.provider {
            out.push_str(&format!("  provider = \"{}\"\n", provider));
        }
        match &self.url {
            Some(UrlExpr::Env(var)) => out.push_str(&format!("  url = env(\"{}\")\n", var)),
            Some(UrlExpr::Literal(url)) => out.push_str(&format!("  url = \"{}\"\n", url)),
            None => {}
        }
        out.push_str("}\n");
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Generator,
    Datasource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Top,
    AwaitingBrace(Block),
    In(Block),
}

/// Parse schema text into the recognised fields
pub fn parse_schema(content: &str) -> SchemaInfo {
    let mut info = SchemaInfo::default();
    let mut state = State::Top;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        match state {
            State::Top => {
                if let Some(rest) = line.strip_prefix("generator") {
                    state = if rest.contains('{') {
                        State::In(Block::Generator)
                    } else {
                        State::AwaitingBrace(Block::Generator)
                    };
                } else if let Some(rest) = line.strip_prefix("datasource") {
                    state = if rest.contains('{') {
                        State::In(Block::Datasource)
                    } else {
                        State::AwaitingBrace(Block::Datasource)
                    };
                }
            }
            State::AwaitingBrace(block) => {
                if line.is_empty() {
                    continue;
                }
                state = if line.starts_with('{') {
                    State::In(block)
                } else {
                    // Tolerance: a block header without a brace is skipped
                    State::Top
                };
            }
            State::In(block) => {
                if line == "}" {
                    state = State::Top;
                    continue;
                }
                match block {
                    Block::Generator => {
                        if let Some(captures) = OUTPUT_RE.captures(line) {
                            info.generator_output = Some(captures[1].to_string());
                        }
                    }
                    Block::Datasource => {
                        if let Some(captures) = PROVIDER_RE.captures(line) {
                            info.provider = Some(captures[1].to_string());
                        } else if let Some(captures) = URL_RE.captures(line) {
                            let expr = captures[1].trim();
                            if let Some(env) = ENV_RE.captures(expr) {
                                info.url = Some(UrlExpr::Env(env[1].to_string()));
                            } else {
                                info.url =
                                    Some(UrlExpr::Literal(expr.trim_matches('"').to_string()));
                            }
                        }
                    }
                }
            }
        }
    }

    info
}

/// Parse a schema file from disk
pub fn parse_schema_file(path: &Path) -> Result<SchemaInfo, CoreError> {
    if !path.is_file() {
        return Err(CoreError::SchemaNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_schema(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
generator client {
  provider = "prisma-client-js"
  output   = "../src/generated"
}

datasource db {
  provider = "postgresql"
  url      = env("DATABASE_URL")
}

model User {
  id Int @id
}
"#;

    #[test]
    fn extracts_all_recognised_fields() {
        let info = parse_schema(SCHEMA);
        assert_eq!(info.generator_output.as_deref(), Some("../src/generated"));
        assert_eq!(info.provider.as_deref(), Some("postgresql"));
        assert_eq!(
            info.url,
            Some(UrlExpr::Env("DATABASE_URL".to_string()))
        );
    }

    #[test]
    fn hardcoded_url_is_a_literal() {
        let info = parse_schema(
            "datasource db {\n  provider = \"sqlite\"\n  url = \"file:./dev.db\"\n}\n",
        );
        assert_eq!(info.url, Some(UrlExpr::Literal("file:./dev.db".to_string())));
    }

    #[test]
    fn brace_on_next_line_is_accepted() {
        let schema = "datasource db\n\n{\n  provider = \"mysql\"\n}\n";
        let info = parse_schema(schema);
        assert_eq!(info.provider.as_deref(), Some("mysql"));
    }

    #[test]
    fn provider_outside_datasource_is_ignored() {
        // generator blocks also carry a provider assignment
        let schema = "generator client {\n  provider = \"prisma-client-js\"\n}\n";
        let info = parse_schema(schema);
        assert_eq!(info.provider, None);
    }

    #[test]
    fn model_bodies_do_not_confuse_the_parser() {
        let schema = "model Thing {\n  url String\n  provider String\n}\n";
        let info = parse_schema(schema);
        assert_eq!(info, SchemaInfo::default());
    }

    #[test]
    fn parse_is_idempotent_on_its_own_output() {
        let info = parse_schema(SCHEMA);
        let rendered = info.to_schema_string();
        assert_eq!(parse_schema(&rendered), info);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = parse_schema_file(Path::new("/no/such/schema.prisma")).unwrap_err();
        assert!(matches!(err, CoreError::SchemaNotFound(_)));
    }
}
