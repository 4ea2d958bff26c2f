//! Literal find → replace over file contents.
//!
//! Pairs are applied in insertion order. Each pair is substituted across the
//! whole content (non-overlapping, left to right) before the next one runs,
//! so a later pair sees the output of the earlier ones.

use serde::Serialize;

/// A single literal substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub find: String,
    pub replace: String,
}

/// Ordered list of literal substitutions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReplacementMap {
    pairs: Vec<Replacement>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Pairs with an empty `find` are kept but never applied.
    pub fn with(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.pairs.push(Replacement {
            find: find.into(),
            replace: replace.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replacement> {
        self.pairs.iter()
    }
}

impl<F: Into<String>, R: Into<String>> FromIterator<(F, R)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (F, R)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (find, replace)| map.with(find, replace))
    }
}

/// Apply every pair of `map` to `content`.
pub fn apply(content: &str, map: &ReplacementMap) -> String {
    apply_counted(content, map).0
}

/// Apply every pair of `map` to `content`, also returning how many
/// substitutions were made in total.
pub fn apply_counted(content: &str, map: &ReplacementMap) -> (String, usize) {
    let mut result = content.to_string();
    let mut count = 0;

    for pair in map.iter() {
        if pair.find.is_empty() {
            continue;
        }
        let hits = result.matches(pair.find.as_str()).count();
        if hits == 0 {
            continue;
        }
        result = result.replace(&pair.find, &pair.replace);
        count += hits;
    }

    (result, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_is_identity() {
        let content = "<?php\n\nnamespace App\\Models;\n";
        assert_eq!(apply(content, &ReplacementMap::new()), content);
    }

    #[test]
    fn missing_term_leaves_content_alone() {
        let map = ReplacementMap::new().with("namespace App\\Http;", "namespace App;");
        let content = "<?php\n\nnamespace App\\Models;\n";
        let (out, count) = apply_counted(content, &map);
        assert_eq!(out, content);
        assert_eq!(count, 0);
    }

    #[test]
    fn replaces_every_occurrence() {
        let map = ReplacementMap::new().with("\\App\\Http\\Middleware\\", "\\Support\\Middlewares\\");
        let content = "\\App\\Http\\Middleware\\TrimStrings::class,\n\\App\\Http\\Middleware\\TrustProxies::class,\n";
        let (out, count) = apply_counted(content, &map);
        assert_eq!(
            out,
            "\\Support\\Middlewares\\TrimStrings::class,\n\\Support\\Middlewares\\TrustProxies::class,\n"
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn pairs_apply_in_order() {
        // The second pair only matches after the first one has run.
        let map = ReplacementMap::new()
            .with("class Kernel extends HttpKernel", "class HttpKernel extends Kernel")
            .with("HttpKernel extends", "Renamed extends");
        let out = apply("class Kernel extends HttpKernel\n", &map);
        assert_eq!(out, "class Renamed extends Kernel\n");
    }

    #[test]
    fn matches_do_not_overlap() {
        let map = ReplacementMap::new().with("aa", "b");
        assert_eq!(apply("aaa", &map), "ba");
    }

    #[test]
    fn empty_find_is_skipped() {
        let map = ReplacementMap::new().with("", "x");
        assert_eq!(apply("abc", &map), "abc");
    }

    #[test]
    fn collects_from_pairs() {
        let map: ReplacementMap = [("a", "b"), ("c", "d")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(apply("ac", &map), "bd");
    }
}
