//! Built-in defect patterns shipped with the engine

use super::pattern::{BugPattern, Severity};

pub const NULL_DEREFERENCE: &str = "BP001";
pub const UNHANDLED_REJECTION: &str = "BP002";
pub const SQL_INJECTION: &str = "BP003";

pub fn predefined_patterns() -> Vec<BugPattern> {
    vec![
        BugPattern::new(NULL_DEREFERENCE, "Null or undefined dereference", Severity::High)
            .with_description(
                "A property or method is accessed on a value that is null or undefined",
            )
            .with_signature("Cannot read property")
            .with_signature("Cannot read propert* of *")
            .with_signature("undefined is not an object")
            .with_signature("null pointer")
            .with_signature("NullPointerException")
            .with_signature("is not an object (evaluating*")
            .with_signature("called `Option::unwrap()` on a `None` value")
            .with_fix_strategy(
                "Check the value for null/undefined before accessing its properties, \
                 or use optional chaining with a sensible default.",
            )
            .with_example(
                "const name = user.profile.name;",
                "const name = user?.profile?.name ?? 'unknown';",
            )
            .with_prevention(
                "Validate inputs at function boundaries and enable strict null checks.",
            ),
        BugPattern::new(UNHANDLED_REJECTION, "Unhandled promise rejection", Severity::High)
            .with_description("An awaited promise or `.then` chain rejects with no handler attached")
            .with_signature("UnhandledPromiseRejection")
            .with_signature("Unhandled promise rejection")
            .with_signature("Uncaught (in promise)")
            .with_signature("unhandled rejection")
            .with_code_pattern(".then(*)")
            .with_fix_strategy(
                "Wrap awaited calls in try/catch or attach a .catch() handler to every promise chain.",
            )
            .with_example(
                "const data = await fetchData();",
                "try {\n  const data = await fetchData();\n} catch (err) {\n  logger.error(err);\n}",
            )
            .with_prevention(
                "Register a process-level unhandledRejection handler and lint for floating promises.",
            ),
        BugPattern::new(SQL_INJECTION, "SQL injection", Severity::Critical)
            .with_description("User-controlled input is concatenated into a SQL statement")
            .with_signature("SQL injection")
            .with_signature("You have an error in your SQL syntax")
            .with_signature("SQLITE_ERROR")
            .with_signature("unterminated quoted string")
            .with_code_pattern("SELECT * FROM * WHERE *\" +")
            .with_code_pattern("query(`*${")
            .with_code_pattern("execute(f\"")
            .with_fix_strategy(
                "Use parameterized queries or prepared statements instead of string concatenation.",
            )
            .with_example(
                "db.query(\"SELECT * FROM users WHERE id = \" + userId);",
                "db.query(\"SELECT * FROM users WHERE id = ?\", [userId]);",
            )
            .with_prevention("Route all database access through a query builder or ORM."),
        BugPattern::new("BP004", "Cross-site scripting", Severity::High)
            .with_description("Untrusted content is written into the DOM as HTML")
            .with_signature("Content Security Policy")
            .with_signature("XSS")
            .with_code_pattern("innerHTML =")
            .with_code_pattern("dangerouslySetInnerHTML")
            .with_code_pattern("document.write(")
            .with_fix_strategy(
                "Assign text via textContent or sanitize HTML before inserting it into the DOM.",
            )
            .with_example("el.innerHTML = comment;", "el.textContent = comment;"),
        BugPattern::new("BP005", "Not a function", Severity::Medium)
            .with_description("A value is invoked as a function but holds something else")
            .with_signature("is not a function")
            .with_signature("object is not callable")
            .with_signature("is not callable")
            .with_fix_strategy(
                "Verify the value's type before calling it and check for typos in method names.",
            ),
        BugPattern::new("BP006", "Unbounded recursion", Severity::High)
            .with_description("A recursive call never reaches its base case")
            .with_signature("Maximum call stack size exceeded")
            .with_signature("stack overflow")
            .with_signature("RecursionError")
            .with_fix_strategy(
                "Add or correct the base case, or convert the recursion into an iterative loop.",
            ),
        BugPattern::new("BP007", "Memory leak", Severity::Medium)
            .with_description("Listeners, timers or caches grow without being released")
            .with_signature("heap out of memory")
            .with_signature("MaxListenersExceededWarning")
            .with_signature("out of memory")
            .with_code_pattern("setInterval(")
            .with_code_pattern("addEventListener(")
            .with_fix_strategy(
                "Remove listeners and clear intervals when the owning component is disposed.",
            )
            .with_prevention("Pair every subscription with an explicit teardown."),
        BugPattern::new("BP008", "Index out of range", Severity::Medium)
            .with_description("A collection is indexed past its bounds")
            .with_signature("index out of bounds")
            .with_signature("index out of range")
            .with_signature("IndexError")
            .with_signature("ArrayIndexOutOfBoundsException")
            .with_code_pattern("<= *.length")
            .with_fix_strategy(
                "Check the index against the collection length; loops should use `<` not `<=`.",
            )
            .with_example(
                "for (let i = 0; i <= items.length; i++)",
                "for (let i = 0; i < items.length; i++)",
            ),
        BugPattern::new("BP009", "Hardcoded credential", Severity::Critical)
            .with_description("A secret is committed in source code")
            .with_signature("hardcoded credential")
            .with_signature("secret detected")
            .with_code_pattern("password = \"")
            .with_code_pattern("apiKey = \"")
            .with_fix_strategy(
                "Move the secret into environment variables or a secret manager and rotate it.",
            ),
        BugPattern::new("BP010", "Race condition", Severity::High)
            .with_description("Concurrent operations touch shared state without coordination")
            .with_signature("race condition")
            .with_signature("data race")
            .with_signature("deadlock")
            .with_fix_strategy(
                "Serialize access to the shared state with a lock, queue or atomic operation.",
            ),
    ]
}
