//! Content maintenance CLI.
//!
//! Usage:
//!   site-maint check-links --all-locales --json
//!   site-maint clean-refs --locale de --apply
//!   site-maint sync --check
//!   site-maint translate --apply --locales=en,de --only-slugs=copilot-pme
//!   site-maint report
//!   site-maint lint-metadata --strict
//!   site-maint sitemap --out public/sitemap.xml
//!   site-maint ping --url https://houle.ai
//!
//! Environment:
//! - TRANSLATIONS_DIR (defaults to the first existing content layout)
//! - SITE_URL
//! - OPENAI_API_KEY, OPENAI_MODEL, OPENAI_API_URL (translate only)
//!
//! Exit codes: 0 success, 1 failed check or I/O error, 2 malformed content.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use houle_site::config::Config;
use houle_site::content::store::resolve_base_dir;
use houle_site::content::FsContentStore;
use houle_site::error::ContentError;
use houle_site::indexnow::IndexNowClient;
use houle_site::maintenance::links::{self, LinkCheckOptions, LinkChecker};
use houle_site::maintenance::translate::{self, ChatTranslator, TranslateOptions};
use houle_site::maintenance::{
    default_target_list, lint, report, sync, target_locales, ContentDir,
};
use houle_site::paths::PathLocalizer;
use houle_site::retry::RetryConfig;
use houle_site::sitemap::SitemapGenerator;
use tracing::info;

#[derive(Parser)]
#[command(name = "site-maint")]
#[command(about = "Content maintenance for the houle site")]
struct Cli {
    /// Translations directory (`<dir>/<locale>/<namespace>.json`)
    #[arg(long, global = true, env = "TRANSLATIONS_DIR")]
    translations_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LocaleArgs {
    /// Single locale to process
    #[arg(long, default_value = "fr")]
    locale: String,

    /// Process every locale with a ressources.json
    #[arg(long)]
    all_locales: bool,
}

#[derive(Args)]
struct ProbeArgs {
    /// Bodies below this size count as error pages
    #[arg(long, default_value_t = 600)]
    min_bytes: usize,

    /// Parallel probes
    #[arg(long, default_value_t = 6)]
    concurrency: usize,

    /// Per-request timeout
    #[arg(long, default_value_t = 10_000, env = "LINK_CHECK_TIMEOUT_MS")]
    timeout_ms: u64,
}

impl ProbeArgs {
    fn options(&self) -> LinkCheckOptions {
        LinkCheckOptions {
            min_bytes: self.min_bytes,
            timeout: Duration::from_millis(self.timeout_ms),
            concurrency: self.concurrency,
            retry: RetryConfig::link_check(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Probe article reference URLs
    CheckLinks {
        #[command(flatten)]
        locales: LocaleArgs,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Report failures but exit 0
        #[arg(long)]
        no_fail: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove dead article references (dry-run unless --apply)
    CleanRefs {
        #[command(flatten)]
        locales: LocaleArgs,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Rewrite the files
        #[arg(long)]
        apply: bool,
    },

    /// Bring translated ressources.json in line with the canonical copy
    Sync {
        /// Write changes (default is dry-run)
        #[arg(long)]
        apply: bool,

        /// Exit 1 when any locale diverges
        #[arg(long)]
        check: bool,

        #[arg(long, default_value_t = default_target_list())]
        locales: String,
    },

    /// Machine-translate canonical articles (dry-run unless --apply)
    Translate {
        #[arg(long)]
        apply: bool,

        /// Retranslate genuine translations too
        #[arg(long)]
        force: bool,

        #[arg(long, default_value_t = default_target_list())]
        locales: String,

        /// Comma-separated slugs to restrict to
        #[arg(long, value_delimiter = ',')]
        only_slugs: Vec<String>,

        /// Stop after this many articles (0 = no limit)
        #[arg(long, default_value_t = 0)]
        max: usize,
    },

    /// Genuine / duplicate / missing translations per locale (exit 1 on slug problems)
    Report {
        #[arg(long)]
        json: bool,
    },

    /// Check SEO metadata copy across locales
    LintMetadata {
        /// Exit 1 on errors
        #[arg(long)]
        strict: bool,
    },

    /// Write the sitemap to a file
    Sitemap {
        #[arg(long, default_value = "public/sitemap.xml")]
        out: PathBuf,
    },

    /// Ping search engines with the sitemap URL
    Ping {
        /// Site root (defaults to SITE_URL)
        #[arg(long)]
        url: Option<String>,

        #[arg(long, default_value = "/sitemap.xml")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("houle_site=info,site_maint=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<ContentError>())
                .map(|content| content.exit_code())
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::from_env()?;
    let base = match cli.translations_dir {
        Some(dir) => dir,
        None => resolve_base_dir(&config.translations_candidates()),
    };
    let dir = ContentDir::new(&base);
    info!("Content directory: {}", base.display());

    match cli.command {
        Commands::CheckLinks {
            locales,
            probe,
            no_fail,
            json,
        } => {
            let checker = LinkChecker::new(probe.options())?;
            let selected = dir.select_locales(&locales.locale, locales.all_locales)?;
            let report = links::check_references(&checker, &dir, &selected).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
            Ok(if report.fatal_count() > 0 && !no_fail { 1 } else { 0 })
        }

        Commands::CleanRefs {
            locales,
            probe,
            apply,
        } => {
            let checker = LinkChecker::new(probe.options())?;
            let selected = dir.select_locales(&locales.locale, locales.all_locales)?;
            if !apply {
                println!("DRY RUN: no files will be modified");
            }
            let summaries = links::clean_references(&checker, &dir, &selected, apply).await?;
            for summary in &summaries {
                for (slug, url) in &summary.removed {
                    println!("  [{}] {} removing {}", summary.locale, slug, url);
                }
                let verb = if summary.written { "Removed" } else { "Would remove" };
                println!(
                    "{}: {} {} of {} reference(s)",
                    summary.locale,
                    verb,
                    summary.removed.len(),
                    summary.checked
                );
            }
            Ok(0)
        }

        Commands::Sync {
            apply,
            check,
            locales,
        } => {
            let targets = target_locales(&locales)?;
            let report = sync::sync_ressources(&dir, &targets, apply)?;
            print!("{}", report.render_text());
            if !apply {
                println!("\nDry-run complete. (Use --apply to write changes)");
            }
            if check && report.has_differences() {
                eprintln!("Parity check FAILED: differences detected.");
                return Ok(1);
            }
            Ok(0)
        }

        Commands::Translate {
            apply,
            force,
            locales,
            only_slugs,
            max,
        } => {
            let translator = if apply {
                Some(ChatTranslator::from_config(&config, reqwest::Client::new())?)
            } else {
                None
            };
            let options = TranslateOptions {
                targets: target_locales(&locales)?,
                only_slugs: only_slugs
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max,
                force,
                apply,
            };
            let summary = translate::translate_articles(translator.as_ref(), &dir, &options).await?;

            if apply {
                println!(
                    "Done. Articles updated: {}, rejected: {}",
                    summary.updated.len(),
                    summary.rejected.len()
                );
            } else {
                for (locale, slug) in &summary.planned {
                    println!("[dry-run] Would translate {slug} to {locale}");
                }
                println!("Dry-run complete. Articles needing translation: {}", summary.planned.len());
            }
            Ok(if summary.rejected.is_empty() { 0 } else { 1 })
        }

        Commands::Report { json } => {
            let report = report::translation_report(&dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
            Ok(report.exit_code() as u8)
        }

        Commands::LintMetadata { strict } => {
            let report = lint::lint_metadata(&dir)?;
            print!("{}", report.render_text(strict));
            Ok(report.exit_code(strict) as u8)
        }

        Commands::Sitemap { out } => {
            let store = FsContentStore::new(&base, true);
            let paths = PathLocalizer::new();
            let xml = SitemapGenerator::new(&config.site_url, &store, &paths).render();
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&out, xml).map_err(|source| ContentError::Write {
                path: out.clone(),
                source,
            })?;
            println!("Sitemap written to {}", out.display());
            Ok(0)
        }

        Commands::Ping { url, path } => {
            let site = url
                .unwrap_or_else(|| config.site_url.clone())
                .trim_end_matches('/')
                .to_string();
            let sitemap_url = format!("{site}{path}");
            println!("Pinging sitemap URL: {sitemap_url}");

            let client = IndexNowClient::from_config(&config, reqwest::Client::new())
                .with_sitemap_url(sitemap_url);
            let result = client.ping_sitemap().await;
            match result.status {
                Some(status) if result.success => println!("OK    {} status {}", result.engine, status),
                Some(status) => println!("FAIL  {} status {}", result.engine, status),
                None => println!("FAIL  {} unreachable", result.engine),
            }
            Ok(0)
        }
    }
}

