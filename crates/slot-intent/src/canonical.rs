//! Synonym-group canonicalization of spoken item names

/// Synonym groups shipped with the card holder. The first member of each
/// group is the canonical name.
pub fn default_synonym_groups() -> Vec<Vec<String>> {
    [
        &["주민등록증", "민증", "등록증"][..],
        &["롯데카드", "롯데"][..],
        &["삼성카드", "삼성"][..],
    ]
    .iter()
    .map(|group| group.iter().map(|s| s.to_string()).collect())
    .collect()
}

/// Resolves surface forms to their group representative.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    groups: Vec<Vec<String>>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(default_synonym_groups())
    }
}

impl Canonicalizer {
    /// Build from synonym groups. Empty groups are dropped.
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        let groups = groups.into_iter().filter(|g| !g.is_empty()).collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Exact (case and whitespace sensitive) match of the trimmed input
    /// against every group; unknown names come back trimmed but unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        let name = raw.trim();
        for group in &self.groups {
            if group.iter().any(|member| member == name) {
                return group[0].clone();
            }
        }
        name.to_string()
    }

    /// Every known surface form, longest first so that regex alternations
    /// prefer "롯데카드" over its prefix "롯데".
    pub fn surface_forms(&self) -> Vec<&str> {
        let mut forms: Vec<&str> = self
            .groups
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        forms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        forms.dedup();
        forms
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.groups.iter().flatten().any(|m| m == name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_member_maps_to_group_head() {
        let c = Canonicalizer::default();
        for group in c.groups() {
            for member in group {
                assert_eq!(c.canonicalize(member), group[0]);
            }
        }
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let c = Canonicalizer::default();
        for input in ["민증", "  롯데 ", "삼성카드", "신한카드", "", "  "] {
            let once = c.canonicalize(input);
            assert_eq!(c.canonicalize(&once), once);
        }
    }

    #[test]
    fn unknown_names_pass_through_trimmed() {
        let c = Canonicalizer::default();
        assert_eq!(c.canonicalize("  신한카드  "), "신한카드");
        // Matching is exact: no case folding or inner whitespace collapsing.
        assert_eq!(c.canonicalize("롯데 카드"), "롯데 카드");
    }

    #[test]
    fn surface_forms_are_longest_first() {
        let c = Canonicalizer::default();
        let forms = c.surface_forms();
        let lotte_card = forms.iter().position(|f| *f == "롯데카드");
        let lotte = forms.iter().position(|f| *f == "롯데");
        assert!(lotte_card < lotte);
        assert_eq!(forms.len(), 7);
    }

    #[test]
    fn empty_groups_are_dropped() {
        let c = Canonicalizer::new(vec![vec![], vec!["a".into(), "b".into()]]);
        assert_eq!(c.groups().len(), 1);
        assert_eq!(c.canonicalize("b"), "a");
        assert!(c.is_known(" a "));
    }
}
