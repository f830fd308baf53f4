//! Identifier sanitization for graph nodes and artifact file names.
//!
//! Binding keys are free-form strings (`svc/abc-1.0`, `orders.v1.2`), but
//! the graph grammar only accepts `[A-Za-z0-9_]` in node identifiers and the
//! artifact store only writes `[A-Za-z0-9_-]` base names. Every other
//! character is replaced by a single `_`.
//!
//! Sanitization is lossy: two different strings can map to the same
//! identifier. Callers keep the original string around as a display label.

/// Converts an arbitrary string into a graph node identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`.
///
/// # Examples
///
/// ```
/// use bindflow_core::identifier::node_id;
///
/// assert_eq!(node_id("svc/abc-1.0"), "svc_abc_1_0");
/// assert_eq!(node_id("plain_name"), "plain_name");
/// ```
pub fn node_id(text: &str) -> String {
    replace_outside(text, |c| c.is_ascii_alphanumeric() || c == '_')
}

/// Converts a caller-chosen base name into a safe artifact file name.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`. Unlike [`node_id`],
/// hyphens are kept.
///
/// # Examples
///
/// ```
/// use bindflow_core::identifier::artifact_name;
///
/// assert_eq!(artifact_name("orders flow-v2"), "orders_flow-v2");
/// assert_eq!(artifact_name("../etc/passwd"), "___etc_passwd");
/// ```
pub fn artifact_name(name: &str) -> String {
    replace_outside(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn replace_outside(text: &str, keep: impl Fn(char) -> bool) -> String {
    text.chars()
        .map(|c| if keep(c) { c } else { '_' })
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn node_id_only_contains_allowed_chars(text in ".{0,40}") {
            let id = node_id(&text);
            prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            prop_assert_eq!(id.chars().count(), text.chars().count());
        }

        #[test]
        fn node_id_is_identity_on_clean_input(text in "[A-Za-z0-9_]{0,40}") {
            prop_assert_eq!(node_id(&text), text);
        }

        #[test]
        fn artifact_name_only_contains_allowed_chars(text in ".{0,40}") {
            let name = artifact_name(&text);
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        }
    }
}
