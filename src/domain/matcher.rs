//! Subsequence matching used to filter commands and entities.

use super::models::{EntityInfo, PaletteCommand};
use std::cmp::Ordering;

/// Case-insensitive subsequence test: every character of `query` must occur
/// in `text`, in order, each after the previous match. The empty query
/// matches everything.
#[must_use]
pub fn fuzzy_match(query: &str, text: &str) -> bool {
    let text = text.to_lowercase();
    let mut rest = text.as_str();
    for c in query.to_lowercase().chars() {
        match rest.find(c) {
            Some(pos) => rest = &rest[pos + c.len_utf8()..],
            None => return false,
        }
    }
    true
}

#[must_use]
pub fn filter_commands<'a>(commands: &'a [PaletteCommand], query: &str) -> Vec<&'a PaletteCommand> {
    if query.is_empty() {
        return commands.iter().collect();
    }
    commands
        .iter()
        .filter(|c| fuzzy_match(query, &c.title))
        .collect()
}

/// Filters entities on display or logical name, then moves prefix matches
/// ahead of plain subsequence matches. Ties keep display-name order.
#[must_use]
pub fn filter_entities<'a>(entities: &'a [EntityInfo], query: &str) -> Vec<&'a EntityInfo> {
    let mut items: Vec<&EntityInfo> = entities
        .iter()
        .filter(|e| fuzzy_match(query, &e.display_name) || fuzzy_match(query, &e.logical_name))
        .collect();

    if !query.is_empty() {
        let lower = query.to_lowercase();
        let starts = |e: &EntityInfo| {
            e.display_name.to_lowercase().starts_with(&lower)
                || e.logical_name.to_lowercase().starts_with(&lower)
        };
        items.sort_by(|a, b| match (starts(a), starts(b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => compare_display_names(&a.display_name, &b.display_name),
        });
    }
    items
}

/// Locale-like ordering: case-insensitive first, raw text as the tie-break.
#[must_use]
pub fn compare_display_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_by_display_name(entities: &mut [EntityInfo]) {
    entities.sort_by(|a, b| compare_display_names(&a.display_name, &b.display_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn entity(logical: &str, display: &str) -> EntityInfo {
        EntityInfo {
            logical_name: logical.to_string(),
            display_name: display.to_string(),
            primary_id_attribute: format!("{logical}id"),
            primary_name_attribute: "name".to_string(),
            logical_collection_name: format!("{logical}s"),
        }
    }

    #[test]
    fn test_fuzzy_match_basics() {
        assert!(fuzzy_match("", "anything"));
        assert!(fuzzy_match("", ""));
        assert!(fuzzy_match("opr", "Open Record"));
        assert!(fuzzy_match("OPEN", "open record"));
        assert!(!fuzzy_match("rop", "Open Record x"));
        assert!(!fuzzy_match("a", ""));
        // Repeated characters need distinct occurrences.
        assert!(fuzzy_match("oo", "foo"));
        assert!(!fuzzy_match("ooo", "foo"));
    }

    #[test]
    fn test_fuzzy_match_non_ascii() {
        assert!(fuzzy_match("üb", "Übersicht"));
        assert!(fuzzy_match("ét", "Société"));
    }

    /// Reference definition: q is a subsequence of t.
    fn is_subsequence(q: &[char], t: &[char]) -> bool {
        let mut it = t.iter();
        q.iter().all(|c| it.any(|x| x == c))
    }

    #[test]
    fn test_fuzzy_match_agrees_with_subsequence_definition() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let alphabet = ['a', 'b', 'c', 'A', 'B', 'd'];
        for _ in 0..2000 {
            let q: String = (0..rng.gen_range(0..4))
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();
            let t: String = (0..rng.gen_range(0..8))
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();
            let ql: Vec<char> = q.to_lowercase().chars().collect();
            let tl: Vec<char> = t.to_lowercase().chars().collect();
            assert_eq!(fuzzy_match(&q, &t), is_subsequence(&ql, &tl), "q={q:?} t={t:?}");
        }
    }

    #[test]
    fn test_filter_commands_by_title() {
        let commands = vec![
            PaletteCommand {
                id: "openRecordSpotlight".to_string(),
                category: "Navigation".to_string(),
                title: "Open Record".to_string(),
                icon: None,
            },
            PaletteCommand {
                id: "myRoles".to_string(),
                category: "myRoles".to_string(),
                title: "My Roles".to_string(),
                icon: None,
            },
        ];
        assert_eq!(filter_commands(&commands, "").len(), 2);
        let hits = filter_commands(&commands, "orec");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "openRecordSpotlight");
    }

    #[test]
    fn test_filter_entities_prefix_first() {
        let entities = vec![
            entity("msdyn_accountplan", "Account Plan"),
            entity("account", "Account"),
            entity("contact", "Contact"),
            entity("bankaccount", "Bank Account"),
            entity("lead", "Lead"),
        ];
        let hits: Vec<&str> = filter_entities(&entities, "acc")
            .iter()
            .map(|e| e.logical_name.as_str())
            .collect();
        // Prefix matches (by display or logical name) come first, each group
        // ordered by display name.
        assert_eq!(hits, ["account", "msdyn_accountplan", "bankaccount"]);
    }

    #[test]
    fn test_filter_entities_logical_name_prefix() {
        let entities = vec![entity("usersettings", "User Settings"), entity("systemuser", "User")];
        let hits = filter_entities(&entities, "sys");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].logical_name, "systemuser");

        // "us" is a display-name prefix of both; display order decides.
        let hits = filter_entities(&entities, "us");
        assert_eq!(hits[0].logical_name, "systemuser");
        assert_eq!(hits[1].logical_name, "usersettings");
    }

    #[test]
    fn test_sort_by_display_name_is_case_insensitive() {
        let mut entities = vec![entity("b", "beta"), entity("a", "Alpha"), entity("c", "Gamma")];
        sort_by_display_name(&mut entities);
        let names: Vec<&str> = entities.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "beta", "Gamma"]);
    }
}
