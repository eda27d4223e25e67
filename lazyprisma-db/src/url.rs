//! Schema-URL to driver-native URL translation
//!
//! Schema files carry URLs in the form the Prisma engines accept, which is
//! not always what a native driver understands. The rules:
//!
//! - postgres / cockroachdb: drop the Prisma-only `schema` parameter; when
//!   `sslmode` is absent or `prefer`, force `sslmode=disable`
//! - mysql: drop Prisma-only pool/ssl parameters the driver rejects
//! - sqlite: strip the `file://` / `file:` scheme prefix, leaving a path
//! - everything else passes through unchanged

use crate::error::DbError;
use url::Url;

/// Parameters the Prisma engines accept on mysql URLs that the native driver
/// does not understand.
const MYSQL_ENGINE_PARAMS: &[&str] = &[
    "connection_limit",
    "pool_timeout",
    "socket_timeout",
    "connect_timeout",
    "sslcert",
    "sslidentity",
    "sslpassword",
    "sslaccept",
];

/// Rewrite a schema-level database URL into the driver-native form
pub fn translate_url(provider: &str, url: &str) -> Result<String, DbError> {
    match provider.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" | "cockroachdb" => Ok(translate_postgres_url(url)),
        "mysql" => translate_mysql_url(url),
        "sqlite" => Ok(translate_sqlite_url(url)),
        _ => Ok(url.to_string()),
    }
}

fn translate_postgres_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        // Unparseable URLs get the string-level treatment
        return translate_postgres_url_simple(raw);
    };

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // The `schema` parameter is a Prisma namespace extension
    pairs.retain(|(k, _)| k != "schema");

    match pairs.iter_mut().find(|(k, _)| k == "sslmode") {
        Some((_, value)) if value == "prefer" => *value = "disable".to_string(),
        Some(_) => {}
        None => pairs.push(("sslmode".to_string(), "disable".to_string())),
    }

    parsed.set_query(None);
    {
        let mut query = parsed.query_pairs_mut();
        for (k, v) in &pairs {
            query.append_pair(k, v);
        }
    }
    parsed.to_string()
}

fn translate_postgres_url_simple(raw: &str) -> String {
    let mut result = raw.to_string();

    result = result.replace("&schema=public", "");
    result = result.replace("?schema=public&", "?");
    result = result.replace("?schema=public", "");
    result = result.replace("sslmode=prefer", "sslmode=disable");

    if !result.contains("sslmode=") {
        let separator = if result.contains('?') { "&" } else { "?" };
        result.push_str(separator);
        result.push_str("sslmode=disable");
    }

    result
}

fn translate_mysql_url(raw: &str) -> Result<String, DbError> {
    let mut parsed = Url::parse(raw).map_err(|e| DbError::UrlParse(e.to_string()))?;

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !MYSQL_ENGINE_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_query(None);
    if !pairs.is_empty() {
        let mut query = parsed.query_pairs_mut();
        for (k, v) in &pairs {
            query.append_pair(k, v);
        }
    }

    Ok(parsed.to_string())
}

fn translate_sqlite_url(raw: &str) -> String {
    raw.strip_prefix("file://")
        .or_else(|| raw.strip_prefix("file:"))
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_strips_schema_parameter() {
        let out =
            translate_url("postgresql", "postgresql://u:p@localhost:5432/db?schema=public").unwrap();
        assert!(!out.contains("schema=public"));
        assert!(out.contains("sslmode=disable"));
    }

    #[test]
    fn postgres_rewrites_prefer_to_disable() {
        let out =
            translate_url("postgres", "postgres://u:p@host/db?sslmode=prefer").unwrap();
        assert!(out.contains("sslmode=disable"));
        assert!(!out.contains("prefer"));
    }

    #[test]
    fn postgres_keeps_explicit_sslmode() {
        let out =
            translate_url("postgresql", "postgresql://u:p@host/db?sslmode=require").unwrap();
        assert!(out.contains("sslmode=require"));
    }

    #[test]
    fn postgres_adds_sslmode_when_absent() {
        let out = translate_url("postgresql", "postgresql://u:p@host/db").unwrap();
        assert!(out.contains("sslmode=disable"));
    }

    #[test]
    fn cockroachdb_uses_postgres_rules() {
        let out = translate_url(
            "cockroachdb",
            "postgresql://u:p@host:26257/db?schema=public&sslmode=require",
        )
        .unwrap();
        assert!(!out.contains("schema="));
        assert!(out.contains("sslmode=require"));
    }

    #[test]
    fn postgres_fallback_on_unparseable_input() {
        let out = translate_url("postgresql", "host with spaces?schema=public").unwrap();
        assert!(!out.contains("schema=public"));
        assert!(out.contains("sslmode=disable"));
    }

    #[test]
    fn mysql_strips_engine_parameters() {
        let out = translate_url(
            "mysql",
            "mysql://root:pw@localhost:3306/app?connection_limit=5&charset=utf8mb4",
        )
        .unwrap();
        assert!(!out.contains("connection_limit"));
        assert!(out.contains("charset=utf8mb4"));
    }

    #[test]
    fn mysql_without_params_is_unchanged() {
        let out = translate_url("mysql", "mysql://root:pw@localhost:3306/app").unwrap();
        assert_eq!(out, "mysql://root:pw@localhost:3306/app");
    }

    #[test]
    fn mysql_rejects_unparseable_url() {
        assert!(translate_url("mysql", "not a url at all").is_err());
    }

    #[test]
    fn sqlite_strips_file_scheme() {
        assert_eq!(
            translate_url("sqlite", "file:///var/data/dev.db").unwrap(),
            "/var/data/dev.db"
        );
        assert_eq!(
            translate_url("sqlite", "file:./dev.db").unwrap(),
            "./dev.db"
        );
        assert_eq!(translate_url("sqlite", "./dev.db").unwrap(), "./dev.db");
    }

    #[test]
    fn unknown_provider_passes_through() {
        let url = "mongodb+srv://u:p@cluster/db";
        assert_eq!(translate_url("mongodb", url).unwrap(), url);
    }
}
