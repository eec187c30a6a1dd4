use std::collections::HashSet;

use regex::Regex;
use regex_utils::wildcard;

use super::pattern::{BugPattern, MatchSource};
use crate::warn;

/// How strongly a single signature hit the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// Literal signature found verbatim
    Literal,
    /// Wildcard signature matched as a whole
    Wildcard,
    /// Only the longest literal fragment of a wildcard signature was found
    Partial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'p, 't> {
    pub source: MatchSource,
    pub kind: HitKind,
    pub signature: &'p str,
    pub matched: &'t str,
}

#[derive(Debug, Clone)]
struct CompiledSignature {
    raw: String,
    source: MatchSource,
    full: Regex,
    wildcard: bool,
    fragment: Option<Regex>,
}

impl CompiledSignature {
    fn compile(raw: &str, source: MatchSource) -> Option<Self> {
        // A signature with no literal text would match every input
        if raw.replace(wildcard::WILDCARD, "").trim().is_empty() {
            return None;
        }

        let case_insensitive = source == MatchSource::Signature;
        let full = match wildcard::compile(raw, case_insensitive) {
            Ok(regex) => regex,
            Err(e) => {
                warn!("Skipping uncompilable signature {:?}: {}", raw, e);
                return None;
            }
        };
        let wildcard = wildcard::has_wildcard(raw);
        let fragment = if wildcard {
            wildcard::longest_fragment(raw)
                .and_then(|fragment| wildcard::compile(fragment, case_insensitive).ok())
        } else {
            None
        };

        Some(Self { raw: raw.to_string(), source, full, wildcard, fragment })
    }

    fn hit<'p, 't>(&'p self, text: &'t str) -> Option<Hit<'p, 't>> {
        if let Some(m) = self.full.find(text) {
            let kind = if self.wildcard { HitKind::Wildcard } else { HitKind::Literal };
            let matched = m.as_str();
            return Some(Hit { source: self.source, kind, signature: &self.raw, matched });
        }

        self.fragment.as_ref().and_then(|fragment| fragment.find(text)).map(|m| Hit {
            source: self.source,
            kind: HitKind::Partial,
            signature: &self.raw,
            matched: m.as_str(),
        })
    }
}

/// Regexes for every signature and code pattern of one `BugPattern`.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    signatures: Vec<CompiledSignature>,
}

impl CompiledPattern {
    /// Blank and repeated entries are skipped; the pattern itself is left as given.
    pub fn compile(pattern: &BugPattern) -> Self {
        let mut seen = HashSet::new();
        let sources = pattern
            .signatures
            .iter()
            .map(|raw| (raw, MatchSource::Signature))
            .chain(pattern.code_patterns.iter().map(|raw| (raw, MatchSource::Code)));

        let signatures = sources
            .filter(|&(raw, source)| seen.insert((raw.as_str(), source)))
            .filter_map(|(raw, source)| CompiledSignature::compile(raw, source))
            .collect();

        Self { signatures }
    }

    /// Every signature that hits `text`, in declaration order, signatures before code patterns.
    pub fn hits<'p, 't>(&'p self, text: &'t str) -> Vec<Hit<'p, 't>> {
        self.signatures.iter().filter_map(|signature| signature.hit(text)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::pattern::Severity;

    fn compiled() -> CompiledPattern {
        CompiledPattern::compile(
            &BugPattern::new("T1", "test", Severity::Medium)
                .with_signature("Connection refused")
                .with_signature("Timed out after * ms")
                .with_code_pattern("unwrap()"),
        )
    }

    #[test]
    fn test_signature_is_case_insensitive() {
        let pattern = compiled();
        let hits = pattern.hits("error: CONNECTION REFUSED by peer");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, HitKind::Literal);
        assert_eq!(hits[0].matched, "CONNECTION REFUSED");
    }

    #[test]
    fn test_code_pattern_is_case_sensitive() {
        let pattern = compiled();
        assert!(pattern.hits("let v = x.UNWRAP();").is_empty());
        let hits = pattern.hits("let v = x.unwrap();");
        assert_eq!(hits[0].source, MatchSource::Code);
    }

    #[test]
    fn test_wildcard_full_and_partial() {
        let pattern = compiled();
        let full = pattern.hits("Timed out after 500 ms");
        assert_eq!(full[0].kind, HitKind::Wildcard);

        let partial = pattern.hits("request Timed out after a while");
        assert_eq!(partial[0].kind, HitKind::Partial);
        assert_eq!(partial[0].matched, "Timed out after");
    }

    #[test]
    fn test_no_signatures() {
        let pattern = CompiledPattern::compile(&BugPattern::new("T2", "empty", Severity::Low));
        assert!(pattern.is_empty());

        let pattern = CompiledPattern::compile(
            &BugPattern::new("T3", "wild", Severity::Low).with_signature("* *").with_signature(""),
        );
        assert!(pattern.is_empty());
        assert!(pattern.hits("anything").is_empty());
    }

    #[test]
    fn test_duplicates_compile_once() {
        let source = BugPattern::new("T4", "", Severity::Low)
            .with_signature("boom")
            .with_signature("  ")
            .with_signature("boom")
            .with_code_pattern("boom");
        let pattern = CompiledPattern::compile(&source);

        let hits = pattern.hits("boom");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, MatchSource::Signature);
        assert_eq!(hits[1].source, MatchSource::Code);
        assert_eq!(source.signatures.len(), 3);
    }
}
