//! Locale tags used to select node translations.

use anyhow::Result;

/// Validate that a locale follows BCP 47 primary subtag format.
///
/// Accepts: lowercase alpha 2-3 chars, optionally followed by hyphen-separated
/// alphanumeric subtags (e.g., "en", "nl", "pt-br", "zh-hans").
pub fn validate_locale(locale: &str) -> Result<()> {
    if locale.is_empty() || locale.len() > 12 {
        anyhow::bail!("locale must be 1-12 characters, got '{locale}'");
    }

    let mut parts = locale.split('-');

    match parts.next() {
        Some(primary) if (2..=3).contains(&primary.len()) => {
            if !primary.bytes().all(|b| b.is_ascii_lowercase()) {
                anyhow::bail!("locale primary subtag must be lowercase letters, got '{locale}'");
            }
        }
        _ => {
            anyhow::bail!("locale must start with a 2-3 letter primary subtag, got '{locale}'");
        }
    }

    for subtag in parts {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            anyhow::bail!(
                "locale subtag must be 1-8 alphanumeric characters, got '{subtag}' in '{locale}'"
            );
        }
    }

    Ok(())
}
