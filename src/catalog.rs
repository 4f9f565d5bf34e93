use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const BUILTIN_CHALLENGES: &str = include_str!("catalog_builtin/challenges.json");

/// One starter-code exercise. Immutable after load; looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub starter_code: StarterCode,
}

/// Fixed three-field starter record, one text per buffer kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterCode {
    pub markup: String,
    pub style: String,
    pub behavior: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLoadDiagnostic {
    pub challenge_ref: String,
    pub reason: String,
}

impl CatalogLoadDiagnostic {
    pub fn to_log_line(&self) -> String {
        format!(
            "challenge catalog rejected entry={} reason={}",
            self.challenge_ref, self.reason
        )
    }
}

/// Static, queryable challenge set. Validated once at load; invalid records
/// are excluded with a diagnostic instead of aborting the catalog. Categories
/// are always derived from the loaded records, never stored separately.
#[derive(Debug, Clone, Default)]
pub struct ChallengeCatalog {
    challenges: Vec<Challenge>,
}

impl ChallengeCatalog {
    pub fn load_builtin() -> (Self, Vec<CatalogLoadDiagnostic>) {
        Self::from_raw(BUILTIN_CHALLENGES)
    }

    pub fn from_raw(raw: &str) -> (Self, Vec<CatalogLoadDiagnostic>) {
        let mut diagnostics = Vec::new();
        let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(entries) => entries,
            Err(err) => {
                diagnostics.push(CatalogLoadDiagnostic {
                    challenge_ref: "catalog".to_string(),
                    reason: format!("catalog parse failed: {err}"),
                });
                return (Self::default(), diagnostics);
            }
        };

        let mut challenges: Vec<Challenge> = Vec::new();
        let mut seen_ids = BTreeSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let challenge_ref = format!("entry:{index}");
            match parse_and_validate_challenge(entry, &mut seen_ids) {
                Ok(challenge) => challenges.push(challenge),
                Err(reason) => diagnostics.push(CatalogLoadDiagnostic {
                    challenge_ref,
                    reason,
                }),
            }
        }

        challenges.sort_by(|left, right| left.id.cmp(&right.id));
        (Self { challenges }, diagnostics)
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|challenge| challenge.id == id)
    }

    pub fn list_by_category(&self, category: &str) -> Vec<&Challenge> {
        self.challenges
            .iter()
            .filter(|challenge| challenge.category == category)
            .collect()
    }

    /// Distinct category values among the loaded challenges, sorted. A new
    /// category appears here the moment a challenge carrying it loads.
    pub fn categories(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .challenges
            .iter()
            .map(|challenge| challenge.category.as_str())
            .collect();
        distinct.into_iter().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

fn parse_and_validate_challenge(
    entry: serde_json::Value,
    seen_ids: &mut BTreeSet<String>,
) -> Result<Challenge, String> {
    let mut challenge: Challenge =
        serde_json::from_value(entry).map_err(|err| format!("challenge parse failed: {err}"))?;

    challenge.id = challenge.id.trim().to_string();
    challenge.title = challenge.title.trim().to_string();
    challenge.category = challenge.category.trim().to_string();

    if challenge.id.is_empty() {
        return Err("id is required".to_string());
    }
    if challenge.title.is_empty() {
        return Err("title is required".to_string());
    }
    if challenge.category.is_empty() {
        return Err("category is required".to_string());
    }
    if !seen_ids.insert(challenge.id.clone()) {
        return Err(format!("duplicate id {}", challenge.id));
    }

    Ok(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(id: &str, category: &str) -> String {
        format!(
            r#"{{
  "id": "{id}",
  "title": "Title {id}",
  "description": "desc",
  "category": "{category}",
  "starter_code": {{"markup": "<p>m</p>", "style": "p{{}}", "behavior": "// js"}}
}}"#
        )
    }

    #[test]
    fn builtin_catalog_loads_without_diagnostics() {
        let (catalog, diagnostics) = ChallengeCatalog::load_builtin();
        assert!(diagnostics.is_empty());
        assert!(catalog.len() >= 6);
        assert!(catalog.get("interactivity.counter").is_some());
    }

    #[test]
    fn categories_are_derived_from_loaded_challenges() {
        let raw = format!(
            "[{},{},{}]",
            sample_entry("a.one", "alpha"),
            sample_entry("a.two", "alpha"),
            sample_entry("b.one", "beta")
        );
        let (catalog, diagnostics) = ChallengeCatalog::from_raw(&raw);
        assert!(diagnostics.is_empty());
        assert_eq!(catalog.categories(), vec!["alpha", "beta"]);

        // a challenge with a brand-new category surfaces it with no separate
        // registration step
        let extended = format!(
            "[{},{},{},{}]",
            sample_entry("a.one", "alpha"),
            sample_entry("a.two", "alpha"),
            sample_entry("b.one", "beta"),
            sample_entry("c.one", "gamma")
        );
        let (extended_catalog, _) = ChallengeCatalog::from_raw(&extended);
        assert_eq!(extended_catalog.categories(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn list_by_category_filters_exactly() {
        let raw = format!(
            "[{},{}]",
            sample_entry("a.one", "alpha"),
            sample_entry("b.one", "beta")
        );
        let (catalog, _) = ChallengeCatalog::from_raw(&raw);
        let alpha = catalog.list_by_category("alpha");
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].id, "a.one");
        assert!(catalog.list_by_category("missing").is_empty());
    }

    #[test]
    fn invalid_entries_are_excluded_with_diagnostics() {
        let raw = format!(
            "[{},{{\"id\": \"\", \"title\": \"x\", \"description\": \"\", \"category\": \"c\", \"starter_code\": {{\"markup\": \"\", \"style\": \"\", \"behavior\": \"\"}}}}]",
            sample_entry("ok.one", "alpha")
        );
        let (catalog, diagnostics) = ChallengeCatalog::from_raw(&raw);
        assert_eq!(catalog.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].reason.contains("id is required"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = format!(
            "[{},{}]",
            sample_entry("dup", "alpha"),
            sample_entry("dup", "beta")
        );
        let (catalog, diagnostics) = ChallengeCatalog::from_raw(&raw);
        assert_eq!(catalog.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].reason.contains("duplicate id"));
    }

    #[test]
    fn unknown_id_lookup_returns_none() {
        let (catalog, _) = ChallengeCatalog::load_builtin();
        assert!(catalog.get("nope.missing").is_none());
    }
}
