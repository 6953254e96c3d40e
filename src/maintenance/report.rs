//! Translation coverage per locale and its effect on the sitemap.

use serde::Serialize;

use super::ContentDir;
use crate::content::{ArticleCatalog, FsContentStore, TranslationStatus};
use crate::error::ContentError;
use crate::i18n::Locale;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocaleCoverage {
    pub locale: String,
    pub genuine: Vec<String>,
    pub duplicate: Vec<String>,
    pub missing: Vec<String>,
}

impl LocaleCoverage {
    /// Share of canonical articles with a genuine translation, in percent.
    pub fn coverage(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.genuine.len() as f64 * 100.0 / total as f64
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationReport {
    pub total: usize,
    pub locales: Vec<LocaleCoverage>,
    /// Blank, padded or repeated slugs in any locale file
    pub slug_problems: Vec<String>,
}

impl TranslationReport {
    /// Article URLs in the sitemap: every canonical article plus each
    /// genuine translation.
    pub fn sitemap_article_urls(&self) -> usize {
        self.total + self.locales.iter().map(|l| l.genuine.len()).sum::<usize>()
    }

    /// Locale URLs left out of the sitemap because they duplicate canonical.
    pub fn duplicate_urls(&self) -> usize {
        self.locales.iter().map(|l| l.duplicate.len()).sum()
    }

    /// 1 when any locale file has slug problems.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.slug_problems.is_empty())
    }

    pub fn render_text(&self) -> String {
        let rule = "=".repeat(72);
        let mut out = format!("{rule}\nARTICLE TRANSLATION REPORT\n{rule}\n");

        if !self.slug_problems.is_empty() {
            out.push_str(&format!("\nSLUG PROBLEMS ({})\n", self.slug_problems.len()));
            for problem in &self.slug_problems {
                out.push_str(&format!("  - {problem}\n"));
            }
        }

        for locale in &self.locales {
            out.push_str(&format!(
                "\n[{}]\n  Genuine translations: {}\n  Duplicates (same as canonical): {}\n  Missing: {}\n",
                locale.locale.to_uppercase(),
                locale.genuine.len(),
                locale.duplicate.len(),
                locale.missing.len()
            ));
            let shown = locale.duplicate.iter().take(10);
            for slug in shown {
                out.push_str(&format!("    - {slug} (duplicate, excluded from sitemap)\n"));
            }
            if locale.duplicate.len() > 10 {
                out.push_str(&format!("    ... and {} more\n", locale.duplicate.len() - 10));
            }
        }

        out.push_str(&format!("\n{rule}\nSUMMARY\n{rule}\n"));
        out.push_str(&format!("Total canonical articles: {}\n", self.total));
        for locale in &self.locales {
            out.push_str(&format!(
                "  {}: {} genuine ({:.1}% coverage), {} duplicates, {} missing\n",
                locale.locale.to_uppercase(),
                locale.genuine.len(),
                locale.coverage(self.total),
                locale.duplicate.len(),
                locale.missing.len()
            ));
        }
        out.push_str(&format!(
            "\nSitemap article URLs: {}\nDuplicate URLs removed: {}\n",
            self.sitemap_article_urls(),
            self.duplicate_urls()
        ));
        out
    }
}

/// Classify every canonical article in every other locale.
pub fn translation_report(dir: &ContentDir) -> Result<TranslationReport, ContentError> {
    // The request-time store hides malformed files; surface them here first.
    let mut slug_problems = Vec::new();
    for locale in Locale::all() {
        if !locale.is_canonical() && !dir.ressources_path(locale.code()).is_file() {
            continue;
        }
        let ressources = dir.read_ressources(locale.code())?;
        slug_problems.extend(ressources.index(locale.code()).problems);
    }

    let store = FsContentStore::new(dir.base(), true);
    let catalog = ArticleCatalog::load(&store).ok_or_else(|| ContentError::Shape {
        path: dir.ressources_path(Locale::canonical().code()),
        message: "canonical ressources could not be loaded".to_string(),
    })?;

    let locales = Locale::all()
        .into_iter()
        .filter(|l| !l.is_canonical())
        .map(|locale| {
            let mut coverage = LocaleCoverage {
                locale: locale.code().to_string(),
                ..LocaleCoverage::default()
            };
            for article in catalog.articles() {
                let slug = article.slug.clone();
                match catalog.status(locale, &article.slug) {
                    TranslationStatus::Genuine => coverage.genuine.push(slug),
                    TranslationStatus::Duplicate => coverage.duplicate.push(slug),
                    TranslationStatus::Missing => coverage.missing.push(slug),
                    TranslationStatus::Canonical => {}
                }
            }
            coverage
        })
        .collect();

    Ok(TranslationReport {
        total: catalog.articles().len(),
        locales,
        slug_problems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::fixtures;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let copilot = json!({"slug": "copilot", "title": "Copilot", "description": "d", "content": "c"});
        let rgpd = json!({"slug": "rgpd", "title": "RGPD", "description": "d", "content": "c"});
        fixtures::write(dir.path(), "fr", "ressources", &json!({"Articles": [copilot, rgpd]}));
        fixtures::write(
            dir.path(),
            "de",
            "ressources",
            &json!({"Articles": [
                {"slug": "copilot", "title": "Copilot (de)", "description": "d", "content": "c"},
                rgpd
            ]}),
        );
        dir
    }

    #[test]
    fn test_report_classifies_articles() {
        let dir = fixture();
        let report = translation_report(&ContentDir::new(dir.path())).unwrap();

        assert_eq!(report.total, 2);
        let de = report.locales.iter().find(|l| l.locale == "de").unwrap();
        assert_eq!(de.genuine, vec!["copilot"]);
        assert_eq!(de.duplicate, vec!["rgpd"]);
        assert!(de.missing.is_empty());
        assert_eq!(de.coverage(report.total), 50.0);

        let en = report.locales.iter().find(|l| l.locale == "en").unwrap();
        assert_eq!(en.missing, vec!["copilot", "rgpd"]);
    }

    #[test]
    fn test_sitemap_impact() {
        let dir = fixture();
        let report = translation_report(&ContentDir::new(dir.path())).unwrap();
        assert_eq!(report.sitemap_article_urls(), 3);
        assert_eq!(report.duplicate_urls(), 1);

        let text = report.render_text();
        assert!(text.contains("DE: 1 genuine (50.0% coverage), 1 duplicates, 0 missing"));
        assert!(text.contains("Sitemap article URLs: 3"));
    }

    #[test]
    fn test_malformed_translation_fails_loudly() {
        let dir = fixture();
        std::fs::create_dir_all(dir.path().join("es")).unwrap();
        std::fs::write(dir.path().join("es/ressources.json"), "{").unwrap();
        let err = translation_report(&ContentDir::new(dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_duplicate_slugs_fail_report() {
        let dir = fixture();
        fixtures::write(
            dir.path(),
            "en",
            "ressources",
            &json!({"Articles": [
                {"slug": "copilot", "title": "Copilot (en)"},
                {"slug": "copilot", "title": "Copilot again"}
            ]}),
        );
        let report = translation_report(&ContentDir::new(dir.path())).unwrap();

        assert_eq!(report.slug_problems.len(), 1);
        assert!(report.slug_problems[0].contains("\"en\""));
        assert_eq!(report.exit_code(), 1);
        assert!(report.render_text().contains("SLUG PROBLEMS (1)"));
    }

    #[test]
    fn test_clean_report_exits_zero() {
        let dir = fixture();
        let report = translation_report(&ContentDir::new(dir.path())).unwrap();
        assert!(report.slug_problems.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_empty_coverage_total() {
        assert_eq!(LocaleCoverage::default().coverage(0), 0.0);
    }
}
