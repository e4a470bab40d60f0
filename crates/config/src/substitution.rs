use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

/// Substitute environment variables written as `${VAR_NAME}`.
///
/// Unset variables keep their placeholder; the validator reports them later
/// instead of failing the parse.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    let mut result = content.to_string();

    for caps in re.captures_iter(content) {
        let placeholder = &caps[0];
        let var_name = &caps[1];

        match env::var(var_name) {
            Ok(value) => {
                debug!(var = var_name, "substituting environment variable");
                result = result.replace(placeholder, &value);
            }
            Err(_) => {
                warn!(var = var_name, "environment variable not set, keeping placeholder");
            }
        }
    }

    Ok(result)
}

/// Check if a string still contains `${VAR}` placeholders.
pub fn has_unresolved_env_vars(content: &str) -> bool {
    Regex::new(r"\$\{(\w+)\}").expect("static pattern").is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_set_variable() {
        std::env::set_var("CALGATE_SUB_TEST", "hello");
        let out = substitute_env_vars("value: ${CALGATE_SUB_TEST}").unwrap();
        std::env::remove_var("CALGATE_SUB_TEST");
        assert_eq!(out, "value: hello");
    }

    #[test]
    fn test_unset_variable_keeps_placeholder() {
        let out = substitute_env_vars("value: ${CALGATE_DEFINITELY_UNSET}").unwrap();
        assert_eq!(out, "value: ${CALGATE_DEFINITELY_UNSET}");
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_plain_content_untouched() {
        let out = substitute_env_vars("value: plain").unwrap();
        assert_eq!(out, "value: plain");
        assert!(!has_unresolved_env_vars(&out));
    }
}
