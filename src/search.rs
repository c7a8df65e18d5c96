use crate::models::{Collection, Container, Group, Snippet};

/// Which part of a snippet matched a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Name,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<'a> {
    pub container: Container,
    pub snippet: &'a Snippet,
    pub field: MatchField,
    /// The command step that matched, for command matches
    pub match_context: Option<&'a str>,
}

/// Finds a snippet by id, then exact name, then partial name (case-insensitive)
pub fn find_snippet<'a>(collection: &'a Collection, query: &str) -> Option<(Container, &'a Snippet)> {
    if let Some(found) = collection.find_snippet(query) {
        return Some(found);
    }

    let name = query.to_lowercase();
    collection
        .all_snippets()
        .find(|(_, s)| s.name.to_lowercase() == name)
        .or_else(|| {
            collection
                .all_snippets()
                .find(|(_, s)| s.name.to_lowercase().contains(&name))
        })
}

/// Finds a group by id, then exact name, then partial name (case-insensitive)
pub fn find_group<'a>(collection: &'a Collection, query: &str) -> Option<&'a Group> {
    if let Some(group) = collection.group(query) {
        return Some(group);
    }

    let name = query.to_lowercase();
    collection
        .groups
        .iter()
        .find(|g| g.group_name.to_lowercase() == name)
        .or_else(|| {
            collection
                .groups
                .iter()
                .find(|g| g.group_name.to_lowercase().contains(&name))
        })
}

/// Searches snippet names and command steps, in display order
pub fn search_snippets<'a>(collection: &'a Collection, query: &str) -> Vec<SearchResult<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::new();
    for (container, snippet) in collection.all_snippets() {
        if snippet.name.to_lowercase().contains(&query) {
            results.push(SearchResult {
                container,
                snippet,
                field: MatchField::Name,
                match_context: None,
            });
            continue;
        }

        if let Some(step) = snippet
            .command
            .iter()
            .find(|step| step.to_lowercase().contains(&query))
        {
            results.push(SearchResult {
                container,
                snippet,
                field: MatchField::Command,
                match_context: Some(step.as_str()),
            });
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Collection {
        let mut git = Group::new("g1", "Git");
        git.snippets = vec![
            Snippet::new("b", "status", vec!["git status".into()], false),
            Snippet::new("c", "status short", vec!["git status -s".into()], false),
        ];
        Collection::new(
            vec![Snippet::new("a", "List files", vec!["ls -la".into()], false)],
            vec![git],
        )
    }

    #[test]
    fn exact_name_beats_partial() {
        let collection = sample();
        let (container, snippet) = find_snippet(&collection, "STATUS").unwrap();
        assert_eq!(snippet.id, "b");
        assert_eq!(container, Container::Group("g1".into()));

        assert_eq!(find_snippet(&collection, "short").map(|(_, s)| s.id.as_str()), Some("c"));
        assert_eq!(find_snippet(&collection, "a").map(|(_, s)| s.id.as_str()), Some("a"));
        assert!(find_snippet(&collection, "docker").is_none());
    }

    #[test]
    fn groups_by_id_or_name() {
        let collection = sample();
        assert_eq!(find_group(&collection, "g1").map(|g| g.id.as_str()), Some("g1"));
        assert_eq!(find_group(&collection, "gi").map(|g| g.id.as_str()), Some("g1"));
        assert!(find_group(&collection, "k8s").is_none());
    }

    #[test]
    fn search_reports_field_and_context() {
        let collection = sample();
        let results = search_snippets(&collection, "-la");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].field, MatchField::Command);
        assert_eq!(results[0].match_context, Some("ls -la"));

        let results = search_snippets(&collection, "status");
        assert_eq!(results.iter().map(|r| r.snippet.id.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(search_snippets(&collection, "  ").is_empty());
    }
}
