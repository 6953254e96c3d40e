//! Internationalization (i18n) module.
//!
//! All locale-related logic lives here: the set of served locales, visitor
//! language negotiation, the server's own localized strings and the checks
//! applied to machine translations.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and their metadata
//! - `locale`: Type-safe `Locale` handle, only constructible for registered codes
//! - `negotiate`: `Accept-Language` detection for the locale redirect
//! - `strings`: Localized strings rendered by the server itself
//! - `validator`: Translation quality validation for maintenance tooling
//!
//! # Example
//!
//! ```rust,ignore
//! use houle_site::i18n::{is_valid_locale, Locale};
//!
//! let canonical = Locale::canonical(); // fr
//! let german = Locale::from_code("de")?;
//! assert!(!is_valid_locale("xx"));
//! ```

mod locale;
mod negotiate;
mod registry;
mod strings;
mod validator;

pub use locale::Locale;
pub use negotiate::detect_locale;
pub use registry::{is_valid_locale, LocaleConfig, LocaleRegistry};
pub use strings::LocaleStrings;
pub use validator::{TranslationValidator, ValidationReport};
