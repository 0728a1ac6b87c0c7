//! Query templates (§4.3).
//!
//! Four generators, pure functions of one or two names. Order within a
//! generated set is stable so tests can assert determinism.

/// `direct(A,B)` -> `"A B"`.
pub fn direct(a: &str, b: &str) -> String {
    format!("{a} {b}")
}

/// `discovery(A)` -> small fan-out used to discover co-appearing third parties.
pub fn discovery(a: &str) -> Vec<String> {
    vec![
        a.to_string(),
        format!("{a} event"),
        format!("{a} with"),
        format!("{a} meeting"),
    ]
}

/// `bridge(A, C)` -> queries used when verifying a candidate bridge.
pub fn bridge(a: &str, c: &str) -> Vec<String> {
    vec![
        format!("{a} {c}"),
        format!("{a} and {c}"),
        format!("{a} {c} event"),
    ]
}

/// `verification(A, C)` -> direct variants emphasizing co-presence, used
/// when connecting a bridge candidate to the target.
pub fn verification(a: &str, c: &str) -> Vec<String> {
    vec![
        format!("{a} {c}"),
        format!("{a} and {c} together"),
        format!("{a} {c} photo"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_is_concatenation() {
        assert_eq!(direct("Donald Trump", "Kanye West"), "Donald Trump Kanye West");
    }

    #[test]
    fn discovery_is_deterministic_and_ordered() {
        let first = discovery("Elon Musk");
        let second = discovery("Elon Musk");
        assert_eq!(first, second);
        assert_eq!(first[0], "Elon Musk");
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn bridge_includes_conjunction_and_event_variants() {
        let qs = bridge("Elon Musk", "Jimmy Fallon");
        assert_eq!(qs.len(), 3);
        assert!(qs[1].contains("and"));
        assert!(qs[2].contains("event"));
    }

    #[test]
    fn verification_queries_are_non_empty() {
        for q in verification("Jimmy Fallon", "Beyoncé") {
            assert!(!q.trim().is_empty());
        }
    }
}
