//! `.env` file reading and the ordered environment-variable search

use std::path::Path;

/// Read one variable from a `.env` file.
///
/// Lines are `KEY=VALUE`; leading whitespace is allowed, `#` comments are
/// skipped, and single or double quotes around the value are stripped.
pub fn read_env_file(path: &Path, key: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let line = line.trim_start();
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix(key) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(value) = rest.strip_prefix('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        return Some(value.to_string());
    }
    None
}

/// Resolve an environment variable the way the Prisma tooling does.
///
/// Search order, first non-empty value wins:
/// 1. the process environment
/// 2. `<dir>/.env`
/// 3. `<dir>/prisma/.env`
pub fn resolve_env_var(project_dir: &Path, name: &str) -> Option<String> {
    if let Ok(value) = std::env::var(name) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    for candidate in [
        project_dir.join(".env"),
        project_dir.join(crate::workspace::SCHEMA_DIR_NAME).join(".env"),
    ] {
        if let Some(value) = read_env_file(&candidate, name) {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_plain_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "DATABASE_URL=postgres://localhost/db\n").unwrap();
        assert_eq!(
            read_env_file(&path, "DATABASE_URL").as_deref(),
            Some("postgres://localhost/db")
        );
    }

    #[test]
    fn strips_quotes_and_leading_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "  DATABASE_URL=\"quoted value\"\nOTHER='single'\n").unwrap();
        assert_eq!(
            read_env_file(&path, "DATABASE_URL").as_deref(),
            Some("quoted value")
        );
        assert_eq!(read_env_file(&path, "OTHER").as_deref(), Some("single"));
    }

    #[test]
    fn key_must_match_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "DATABASE_URL_SHADOW=wrong\nDATABASE_URL=right\n").unwrap();
        assert_eq!(read_env_file(&path, "DATABASE_URL").as_deref(), Some("right"));
    }

    #[test]
    fn comments_and_missing_keys_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "# DATABASE_URL=commented\n").unwrap();
        assert_eq!(read_env_file(&path, "DATABASE_URL"), None);
        assert_eq!(read_env_file(&path, "ABSENT"), None);
    }

    #[test]
    fn project_env_file_is_searched() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "LP_TEST_PROJECT_ONLY=from-root\n").unwrap();
        assert_eq!(
            resolve_env_var(dir.path(), "LP_TEST_PROJECT_ONLY").as_deref(),
            Some("from-root")
        );
    }

    #[test]
    fn schema_dir_env_file_is_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("prisma")).unwrap();
        fs::write(
            dir.path().join("prisma/.env"),
            "LP_TEST_SCHEMA_DIR_ONLY=from-prisma\n",
        )
        .unwrap();
        assert_eq!(
            resolve_env_var(dir.path(), "LP_TEST_SCHEMA_DIR_ONLY").as_deref(),
            Some("from-prisma")
        );
    }

    #[test]
    fn root_env_file_wins_over_schema_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("prisma")).unwrap();
        fs::write(dir.path().join(".env"), "LP_TEST_ORDER=root\n").unwrap();
        fs::write(dir.path().join("prisma/.env"), "LP_TEST_ORDER=prisma\n").unwrap();
        assert_eq!(
            resolve_env_var(dir.path(), "LP_TEST_ORDER").as_deref(),
            Some("root")
        );
    }

    #[test]
    fn process_environment_wins_over_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "LP_TEST_PROC_WINS=file\n").unwrap();
        std::env::set_var("LP_TEST_PROC_WINS", "process");
        assert_eq!(
            resolve_env_var(dir.path(), "LP_TEST_PROC_WINS").as_deref(),
            Some("process")
        );
        std::env::remove_var("LP_TEST_PROC_WINS");
    }

    #[test]
    fn unresolvable_variable_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_env_var(dir.path(), "LP_TEST_NOWHERE"), None);
    }
}
