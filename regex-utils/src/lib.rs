//! Regex utilities for bug-hunter
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Wildcard signatures: `*` stands for any run of characters, everything else is literal.
pub mod wildcard {
    use super::*;

    pub const WILDCARD: char = '*';

    /// Shortest literal fragment worth reporting as a partial hit
    pub const MIN_FRAGMENT_LEN: usize = 4;

    pub fn has_wildcard(pattern: &str) -> bool {
        pattern.contains(WILDCARD)
    }

    /// Compile a wildcard pattern into an unanchored regex.
    pub fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
        let body = pattern.split(WILDCARD).map(regex::escape).collect::<Vec<_>>().join(".*?");
        let flags = if case_insensitive { "(?is)" } else { "(?s)" };
        Regex::new(&format!("{flags}{body}"))
    }

    /// Longest literal piece between wildcards, if it is long enough to mean anything.
    pub fn longest_fragment(pattern: &str) -> Option<&str> {
        pattern
            .split(WILDCARD)
            .map(str::trim)
            .filter(|fragment| fragment.chars().count() >= MIN_FRAGMENT_LEN)
            .max_by_key(|fragment| fragment.len())
    }
}

/// Precompiled patterns for scanning raw source text
pub mod code {
    use super::*;

    /// `a.b.c` style chains; group 1 is the root identifier.
    pub static PROPERTY_CHAIN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:^|[^\w$.?])([A-Za-z_$][\w$]*)\.[A-Za-z_$][\w$]*\.[A-Za-z_$][\w$]*")
            .expect("Invalid regex pattern")
    });

    pub static AWAIT_OR_THEN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\bawait\s+[\w$.]+|\.then\s*\(").expect("Invalid regex pattern")
    });

    pub static CATCH_HANDLER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\.catch\s*\(|\bcatch\s*(?:\(|\{)").expect("Invalid regex pattern")
    });

    pub static TRY_BLOCK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\btry\s*\{").expect("Invalid regex pattern"));

    /// SQL keyword followed by string concatenation or template interpolation on the same line
    pub static SQL_CONCAT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?i)\b(?:select|insert|update|delete)\b[^;\n]*(?:["'`]\s*\+\s*[\w$]|\$\{)"#)
            .expect("Invalid regex pattern")
    });

    pub static DYNAMIC_EVAL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"\b(?:eval|exec|execSync)\s*\([^)\n]*(?:\+\s*[\w$]|\$\{)"#)
            .expect("Invalid regex pattern")
    });

    pub static HTML_SINK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\.(?:innerHTML|outerHTML)\s*\+?=|dangerouslySetInnerHTML|document\.write\s*\(")
            .expect("Invalid regex pattern")
    });

    pub static SECRET_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r#"(?i)\b(?:api[_-]?key|secret|password|passwd|access[_-]?token|auth[_-]?token)\b\s*[:=]\s*["'][^"'\s]{6,}["']"#,
        )
        .expect("Invalid regex pattern")
    });

    /// Identifiers that are globals or namespaces rather than nullable values
    pub const KNOWN_ROOTS: &[&str] = &[
        "this", "self", "super", "console", "Math", "JSON", "Object", "Array", "Promise",
        "process", "window", "document", "module", "exports", "require", "Number", "String",
        "Date", "Reflect", "navigator", "std", "os", "sys",
    ];

    /// Does `code` guard `root` against null/undefined anywhere?
    pub fn has_null_guard(code: &str, root: &str) -> bool {
        // `\b` never matches next to `$`, which identifiers may start or end with
        let before = r"(?:^|[^\w$])";
        let after = r"(?:[^\w$]|$)";
        let root = regex::escape(root);
        let guard = format!(
            r"(?:\bif\s*\(\s*!?\s*{root}{after}|{before}{root}\s*(?:&&|\|\||\?\.|\?\?|[!=]==?\s*(?:null|undefined))|(?:null|undefined)\s*[!=]==?\s*{root}{after})"
        );
        Regex::new(&guard).map(|re| re.is_match(code)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_compile() {
        let re = wildcard::compile("Cannot read propert* of *", true).unwrap();
        assert!(re.is_match("TypeError: cannot read property 'x' of null"));
        assert!(!re.is_match("Cannot write property"));

        let code = wildcard::compile("query(*+", false).unwrap();
        assert!(code.is_match("db.query(\"SELECT \" + id)"));
        assert!(!wildcard::compile("Query(*+", false).unwrap().is_match("db.query(\"a\" + b)"));
    }

    #[test]
    fn test_wildcard_escapes_metacharacters() {
        let re = wildcard::compile("fn(a.b)", false).unwrap();
        assert!(re.is_match("call fn(a.b) now"));
        assert!(!re.is_match("fn(aXb)"));
    }

    #[test]
    fn test_longest_fragment() {
        assert_eq!(wildcard::longest_fragment("Cannot read * of null"), Some("Cannot read"));
        assert_eq!(wildcard::longest_fragment("a*b"), None);
    }

    #[test]
    fn test_property_chain_root() {
        let caps = code::PROPERTY_CHAIN.captures("const n = user.profile.name;").unwrap();
        assert_eq!(&caps[1], "user");
        assert!(code::PROPERTY_CHAIN.captures("user?.profile.name").is_none());
    }

    #[test]
    fn test_null_guard_detection() {
        assert!(code::has_null_guard("if (user) { user.profile.name }", "user"));
        assert!(code::has_null_guard("user && user.profile.name", "user"));
        assert!(code::has_null_guard("if (user !== null) {}", "user"));
        assert!(!code::has_null_guard("const n = user.profile.name;", "user"));
        assert!(!code::has_null_guard("if (superuser) {}", "user"));
    }

    #[test]
    fn test_null_guard_dollar_roots() {
        assert!(code::has_null_guard("if ($el) { $el.style.color = c; }", "$el"));
        assert!(code::has_null_guard("$el && $el.style.color", "$el"));
        assert!(!code::has_null_guard("a$el && x", "$el"));

        let caps = code::PROPERTY_CHAIN.captures("  $el.style.color = c;").unwrap();
        assert_eq!(&caps[1], "$el");
    }

    #[test]
    fn test_risky_sinks() {
        assert!(code::SQL_CONCAT.is_match("db.query(\"SELECT * FROM users WHERE id = \" + id)"));
        assert!(code::SQL_CONCAT.is_match("db.query(`SELECT * FROM t WHERE id = ${id}`)"));
        assert!(!code::SQL_CONCAT.is_match("db.query(\"SELECT 1\", [id])"));
        assert!(code::HTML_SINK.is_match("el.innerHTML = input;"));
        assert!(code::SECRET_ASSIGNMENT.is_match("const apiKey = \"sk-12345678\";"));
    }
}
