//! Localized marketing site for houle: server-rendered pages under
//! `/<locale>/`, canonical-locale content fallback, SEO metadata, sitemap,
//! contact relay and the offline content maintenance tools.

pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod i18n;
pub mod indexnow;
pub mod maintenance;
pub mod paths;
pub mod retry;
pub mod security;
pub mod seo;
pub mod server;
pub mod sitemap;
