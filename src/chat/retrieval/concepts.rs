//! Technical concept catalogue used for labelling and title fallback.

use regex::Regex;

use crate::chat::core::conversation::Conversation;

/// Catalogue entries as `(display name, case-insensitive pattern)`.
///
/// Order matters: it breaks frequency ties and orders [`ConceptCatalog::found`].
const CATALOG: &[(&str, &str)] = &[
    ("JavaScript", r"\bjavascript\b"),
    ("TypeScript", r"\btypescript\b"),
    ("Python", r"\bpython\b"),
    ("Java", r"\bjava\b"),
    ("Go", r"\bgo\b"),
    ("Rust", r"\brust\b"),
    // `+` is not a word character, so C++ needs its own boundary.
    ("C++", r"\bcpp\b|\bc\+\+"),
    ("HTML", r"\bhtml\b"),
    ("CSS", r"\bcss\b"),
    ("SQL", r"\bsql\b"),
    ("Bash", r"\bbash\b"),
    ("Shell", r"\bshell\b"),
    ("Authentication", r"\bauthentication\b"),
    ("Authorization", r"\bauthorization\b"),
    ("API", r"\bapis?\b"),
    ("Database", r"\bdatabases?\b"),
    ("Frontend", r"\bfrontend\b"),
    ("Backend", r"\bbackend\b"),
    ("Microservices", r"\bmicroservices?\b"),
    ("Docker", r"\bdocker\b"),
    ("Kubernetes", r"\bkubernetes\b"),
    ("Deployment", r"\bdeployments?\b"),
    ("Testing", r"\btesting\b"),
    ("Debugging", r"\bdebugging\b"),
    ("Performance", r"\bperformance\b"),
    ("Optimization", r"\boptimi[sz]ation\b"),
    ("Security", r"\bsecurity\b"),
    ("Encryption", r"\bencryption\b"),
    ("Validation", r"\bvalidation\b"),
    ("Refactoring", r"\brefactoring\b"),
    ("React", r"\breact\b"),
    ("Vue", r"\bvue\b"),
    ("Angular", r"\bangular\b"),
    ("Node.js", r"\bnode\.?js\b"),
    ("Express", r"\bexpress\b"),
    ("FastAPI", r"\bfastapi\b"),
    ("Django", r"\bdjango\b"),
    ("Flask", r"\bflask\b"),
    ("Spring", r"\bspring\b"),
    ("Laravel", r"\blaravel\b"),
    ("Rails", r"\brails\b"),
    ("Next.js", r"\bnext\.?js\b"),
    ("Svelte", r"\bsvelte\b"),
];

struct Concept {
    name: &'static str,
    pattern: Regex,
}

/// Compiled concept catalogue.
pub struct ConceptCatalog {
    concepts: Vec<Concept>,
}

impl ConceptCatalog {
    /// Compile the built-in catalogue.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let concepts = CATALOG
            .iter()
            .map(|&(name, pattern)| {
                Ok(Concept {
                    name,
                    pattern: Regex::new(&format!("(?i){pattern}"))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { concepts })
    }

    /// Concepts mentioned in `text`, in catalogue order.
    #[must_use]
    pub fn found(&self, text: &str) -> Vec<&'static str> {
        self.concepts
            .iter()
            .filter(|concept| concept.pattern.is_match(text))
            .map(|concept| concept.name)
            .collect()
    }

    /// Most mentioned concept; ties go to the earlier catalogue entry.
    #[must_use]
    pub fn most_frequent(&self, text: &str) -> Option<&'static str> {
        let mut best: Option<(&'static str, usize)> = None;
        for concept in &self.concepts {
            let count = concept.pattern.find_iter(text).count();
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((concept.name, count));
            }
        }
        best.map(|(name, _)| name)
    }
}

impl Conversation {
    /// Catalogue concepts found anywhere in the rendered transcript.
    #[must_use]
    pub fn technical_concepts(&self, catalog: &ConceptCatalog) -> Vec<&'static str> {
        catalog.found(&self.to_markdown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::conversation::Message;
    use crate::chat::core::role::Role;

    fn catalog() -> ConceptCatalog {
        ConceptCatalog::new().unwrap()
    }

    #[test]
    fn found_is_in_catalogue_order() {
        let text = "Deploy the Docker image, then rewrite the Python API client in Go.";
        assert_eq!(catalog().found(text), ["Python", "Go", "API", "Docker"]);
    }

    #[test]
    fn matching_respects_word_boundaries() {
        let c = catalog();
        assert!(c.found("javascript only").contains(&"JavaScript"));
        assert!(!c.found("javascript only").contains(&"Java"));
        assert!(c.found("ported from C++ last year").contains(&"C++"));
        assert!(c.found("see main.cpp and cpp headers").contains(&"C++"));
        assert!(c.found("a good, gorgeous day").is_empty());
    }

    #[test]
    fn most_frequent_breaks_ties_by_catalogue_order() {
        let c = catalog();
        assert_eq!(c.most_frequent("docker docker rust"), Some("Docker"));
        assert_eq!(c.most_frequent("docker rust"), Some("Rust"));
        assert_eq!(c.most_frequent("nothing technical here"), None);
    }

    #[test]
    fn conversation_concepts_scan_all_messages() {
        let chat = Conversation::new(
            "c",
            "t",
            vec![
                Message::new("1", Role::User, "our React app is slow", 1),
                Message::new("2", Role::Assistant, "profile the SQL queries", 2),
            ],
            2,
        );
        assert_eq!(chat.technical_concepts(&catalog()), ["SQL", "React"]);
    }
}
