//! Substitutes local image paths with their remote URLs.
//!
//! Replacement is plain substring replacement over the whole document: any
//! `<prefix><filename>` is rewritten, whether or not it sits inside an image
//! link. At each prefix the longest known filename wins, so the result does
//! not depend on map order.
//!
//! The one exception: text starting with `<base_url>/` is copied through
//! untouched, even if a `<prefix><filename>` follows inside it. This keeps a
//! second run from rewriting the `/images/<name>` tail of an already remote
//! URL. Nothing else is skipped.

use crate::reconcile::Reconciliation;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::collections::BTreeMap;

/// Filename to remote URL for every referenced image.
#[derive(Debug, Clone)]
pub struct ImageMap {
    base_url: String,
    prefix: String,
    urls: BTreeMap<String, String>,
    /// Distinct filename lengths in bytes, longest first.
    name_lengths: Vec<usize>,
    /// `<base_url>/` | `<prefix>`; names are looked up after a prefix hit.
    candidates: Regex,
}

impl ImageMap {
    /// Maps found and missing names alike; a missing file may already be
    /// uploaded.
    pub fn build(reconciliation: &Reconciliation, base_url: &str, prefix: &str) -> Result<Self> {
        Self::from_names(reconciliation.all_names(), base_url, prefix)
    }

    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
        base_url: &str,
        prefix: &str,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            bail!("Base URL must not be empty");
        }
        if prefix.is_empty() {
            bail!("Image prefix must not be empty");
        }

        let urls: BTreeMap<String, String> = names
            .into_iter()
            .map(|name| (name.to_string(), format!("{base_url}/{name}")))
            .collect();

        let mut name_lengths: Vec<usize> = urls.keys().map(String::len).collect();
        name_lengths.sort_unstable_by(|a, b| b.cmp(a));
        name_lengths.dedup();

        let candidates = Regex::new(&format!(
            "{}/|{}",
            regex::escape(&base_url),
            regex::escape(prefix)
        ))
        .context("Failed to build image replacement pattern")?;

        Ok(Self {
            base_url,
            prefix: prefix.to_string(),
            urls,
            name_lengths,
            candidates,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns `content` with every `<prefix><filename>` replaced by its URL.
    pub fn rewrite(&self, content: &str) -> String {
        if self.urls.is_empty() {
            return content.to_string();
        }

        let mut out = String::with_capacity(content.len());
        let mut copied = 0;
        let mut at = 0;

        while let Some(m) = self.candidates.find_at(content, at) {
            if m.as_str() != self.prefix {
                // already a remote URL
                at = m.end();
                continue;
            }

            match self.longest_name(&content[m.end()..]) {
                Some((name, url)) => {
                    out.push_str(&content[copied..m.start()]);
                    out.push_str(url);
                    copied = m.end() + name.len();
                    at = copied;
                }
                None => {
                    at = m.start()
                        + content[m.start()..]
                            .chars()
                            .next()
                            .map_or(1, char::len_utf8);
                }
            }
        }

        out.push_str(&content[copied..]);
        out
    }

    fn longest_name(&self, rest: &str) -> Option<(&str, &str)> {
        self.name_lengths
            .iter()
            .filter_map(|&len| rest.get(..len))
            .find_map(|candidate| self.urls.get_key_value(candidate))
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_image_references;

    const BASE: &str = "https://raw.githubusercontent.com/devinschumacher/uploads/main/images";
    const PREFIX: &str = "/images/";

    fn map(names: &[&str]) -> ImageMap {
        ImageMap::from_names(names.iter().copied(), BASE, PREFIX).unwrap()
    }

    #[test]
    fn rewrites_image_links() {
        let md = "![a](/images/a.png) and [![b](/images/b.png)](https://x.com)";
        let out = map(&["a.png", "b.png"]).rewrite(md);
        assert_eq!(
            out,
            format!("![a]({BASE}/a.png) and [![b]({BASE}/b.png)](https://x.com)")
        );
    }

    #[test]
    fn replaces_outside_link_context_too() {
        let md = "See /images/a.png for details.\n![a](/images/a.png)";
        let out = map(&["a.png"]).rewrite(md);
        assert_eq!(out, format!("See {BASE}/a.png for details.\n![a]({BASE}/a.png)"));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let md = "![a](/images/a.png)\n![b](/images/b.png)";
        let m = map(&["a.png", "b.png"]);
        let once = m.rewrite(md);
        let twice = m.rewrite(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn overlapping_names_take_the_longest() {
        let md = "![x](/images/a.png.webp) ![y](/images/a.png)";
        let out = map(&["a.png", "a.png.webp"]).rewrite(md);
        assert_eq!(out, format!("![x]({BASE}/a.png.webp) ![y]({BASE}/a.png)"));
    }

    #[test]
    fn leaves_unmapped_and_external_links_alone() {
        let md = "![e](https://example.com/e.png) ![u](/images/unknown.png)";
        let out = map(&["a.png"]).rewrite(md);
        assert_eq!(out, md);
    }

    #[test]
    fn empty_map_returns_content_unchanged() {
        let md = "![a](/images/a.png)";
        assert_eq!(map(&[]).rewrite(md), md);
    }

    #[test]
    fn filenames_with_regex_metacharacters() {
        let md = "![p](/images/chart (1)+v2.png)";
        let out = map(&["chart (1)+v2.png"]).rewrite(md);
        assert_eq!(out, format!("![p]({BASE}/chart (1)+v2.png)"));
    }

    #[test]
    fn trailing_slash_on_base_url_is_not_doubled() {
        let m = ImageMap::from_names(["a.png"], "https://cdn.example.com/img/", PREFIX).unwrap();
        assert_eq!(m.url_for("a.png"), Some("https://cdn.example.com/img/a.png"));
        assert_eq!(m.base_url(), "https://cdn.example.com/img");
    }

    #[test]
    fn builds_from_found_and_missing() {
        let mut reconciliation = Reconciliation::default();
        reconciliation
            .found
            .insert("a.png".into(), "/src/a.png".into());
        reconciliation.missing.push("b.png".into());

        let m = ImageMap::build(&reconciliation, BASE, PREFIX).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.url_for("a.png"), Some(format!("{BASE}/a.png").as_str()));
        assert_eq!(m.url_for("b.png"), Some(format!("{BASE}/b.png").as_str()));
    }

    #[test]
    fn no_local_path_survives_extract_then_rewrite() {
        let md = "# Post\n![one](/images/one.png)\n[![two](/images/two.jpg)](/link)\n\
                  ![one again](/images/one.png) ![ext](https://a.b/c.png)";
        let names = extract_image_references(md, PREFIX);
        let m = ImageMap::from_names(names.iter().map(String::as_str), BASE, PREFIX).unwrap();
        let out = m.rewrite(md);

        for name in &names {
            let remaining = out.replace(&format!("{BASE}/{name}"), "");
            assert!(!remaining.contains(&format!("{PREFIX}{name}")));
        }
        assert!(out.contains("https://a.b/c.png"));
    }

    #[test]
    fn handles_thousands_of_names() {
        let names: Vec<String> = (0..5000)
            .map(|i| format!("screenshot-of-some-long-article-{i:05}.png"))
            .collect();
        let m = ImageMap::from_names(names.iter().map(String::as_str), BASE, PREFIX).unwrap();
        assert_eq!(m.len(), 5000);

        let md = format!(
            "![first](/images/{}) ![last](/images/{})",
            names[0], names[4999]
        );
        assert_eq!(
            m.rewrite(&md),
            format!("![first]({BASE}/{}) ![last]({BASE}/{})", names[0], names[4999])
        );
    }

    #[test]
    fn text_already_under_base_url_is_kept() {
        let md = format!("![a]({BASE}/images/a.png) ![b](/images/a.png)");
        let out = map(&["a.png"]).rewrite(&md);
        assert_eq!(out, format!("![a]({BASE}/images/a.png) ![b]({BASE}/a.png)"));
    }

    #[test]
    fn prefix_without_known_name_then_known_name() {
        let md = "/images//images/a.png and /images/ alone";
        let out = map(&["a.png"]).rewrite(md);
        assert_eq!(out, format!("/images/{BASE}/a.png and /images/ alone"));
    }

    #[test]
    fn empty_base_url_or_prefix_is_rejected() {
        assert!(ImageMap::from_names(["a.png"], "", PREFIX).is_err());
        assert!(ImageMap::from_names(["a.png"], "/", PREFIX).is_err());
        assert!(ImageMap::from_names(["a.png"], BASE, "").is_err());
    }
}
