//! # User-Visible Messages
//!
//! Reasons, notes and display labels are kept in a Fluent resource embedded at
//! build time (`locales/ja/main.ftl`). Arguments are plain strings; numbers are
//! formatted by the caller so unit suffixes stay under its control.

use anyhow::Result;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use log::warn;
use unic_langid::LanguageIdentifier;

const JA_MESSAGES: &str = include_str!("../locales/ja/main.ftl");

/// Message catalog for the single supported locale
pub struct MessageCatalog {
    bundle: FluentBundle<FluentResource>,
}

impl MessageCatalog {
    /// Build the Japanese catalog from the embedded resource
    pub fn new() -> Result<Self> {
        let locale: LanguageIdentifier = "ja".parse()?;
        let mut bundle = FluentBundle::new(vec![locale]);
        // Rendered text goes to terminals and files, not bidi-aware widgets
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(JA_MESSAGES.to_string()).unwrap_or_else(|(resource, errors)| {
            warn!("Message resource has {} parse errors: {:?}", errors.len(), errors);
            resource
        });
        if let Err(errors) = bundle.add_resource(resource) {
            warn!("Duplicate message ids in resource: {:?}", errors);
        }

        Ok(Self { bundle })
    }

    /// Format a message; unknown keys render as a visible placeholder
    pub fn get_message(&self, key: &str, args: &[(&str, &str)]) -> String {
        let Some(message) = self.bundle.get_message(key) else {
            return format!("Missing translation: {}", key);
        };
        let Some(pattern) = message.value() else {
            return format!("Missing value for key: {}", key);
        };

        let fluent_args = if args.is_empty() {
            None
        } else {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            Some(fluent_args)
        };

        let mut errors = vec![];
        let value = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .to_string();
        if !errors.is_empty() {
            warn!("Formatting '{}' reported errors: {:?}", key, errors);
        }
        value
    }

    pub fn has_message(&self, key: &str) -> bool {
        self.bundle.has_message(key)
    }
}

thread_local! {
    static CATALOG: MessageCatalog =
        MessageCatalog::new().expect("embedded message catalog should load");
}

/// Message without arguments
pub fn t(key: &str) -> String {
    CATALOG.with(|catalog| catalog.get_message(key, &[]))
}

/// Message with string arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    CATALOG.with(|catalog| catalog.get_message(key, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message() {
        assert_eq!(t("shopping-title"), "買い物リスト");
    }

    #[test]
    fn test_message_with_args() {
        assert_eq!(t_args("week-day", &[("day", "3")]), "3日目");
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(t("no-such-key"), "Missing translation: no-such-key");
    }
}
