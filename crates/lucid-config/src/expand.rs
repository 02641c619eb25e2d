//! `${VAR}` expansion for string settings.
//!
//! - `${VAR}` expands to the value of VAR, errors if unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset
//!
//! Bare `$VAR` is left alone so resource ids and URLs may contain dollars.

use crate::ConfigError;

/// Expand environment references in `value`, naming `field` in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, UnsetVar> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional setting in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_plain_value_unchanged() {
        let result = expand_env("book_page_page/books.xml/guide", "default_id").unwrap();
        assert_eq!(result, "book_page_page/books.xml/guide");
    }

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("LUCID_TEST_SITE_ROOT", "/srv/site");
        }
        let result = expand_env("${LUCID_TEST_SITE_ROOT}/public", "storage.root").unwrap();
        assert_eq!(result, "/srv/site/public");
        unsafe {
            std::env::remove_var("LUCID_TEST_SITE_ROOT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("LUCID_TEST_UNSET_ID");
        }
        let result = expand_env("${LUCID_TEST_UNSET_ID:-menu_node_page/m}", "default_id").unwrap();
        assert_eq!(result, "menu_node_page/m");
    }

    #[test]
    fn test_expand_unset_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("LUCID_TEST_MISSING");
        }
        let err = expand_env("${LUCID_TEST_MISSING}", "modules.url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("LUCID_TEST_MISSING"));
        assert!(message.contains("modules.url"));
    }

    #[test]
    fn test_bare_dollar_kept() {
        let result = expand_env("data/$books.xml", "modules.url").unwrap();
        assert_eq!(result, "data/$books.xml");
    }

    #[test]
    fn test_expand_opt_none_stays_none() {
        let mut value = None;
        expand_opt(&mut value, "default_id").unwrap();
        assert!(value.is_none());
    }
}
