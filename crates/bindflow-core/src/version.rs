//! Numeric version keys extracted from binding keys.
//!
//! Binding keys embed versions in free text (`proc.v1.10`,
//! `svc-2.0.error`). A [`VersionKey`] keeps only ASCII digits and `.`,
//! splits on `.` and reads each piece as an unsigned integer. Keys compare
//! component-wise and numerically, so `1.2 < 1.10`. Missing trailing
//! components count as `0`, which makes `1` and `1.0` equal.

use std::cmp::Ordering;

/// A dot-separated numeric version extracted from arbitrary text.
///
/// # Examples
///
/// ```
/// use bindflow_core::version::VersionKey;
///
/// let a = VersionKey::parse("proc.v1.2");
/// let b = VersionKey::parse("proc.v1.10");
/// assert!(a < b);
/// assert_eq!(VersionKey::parse("v1"), VersionKey::parse("v1.0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionKey(Vec<u64>);

impl VersionKey {
    /// Extracts the version key from `text`.
    ///
    /// Empty components (from leading, trailing or doubled dots, or text
    /// without digits) read as `0`. A component too large for `u64`
    /// saturates to `u64::MAX`.
    pub fn parse(text: &str) -> Self {
        let kept: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let components = kept
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    0
                } else {
                    part.parse::<u64>().unwrap_or(u64::MAX)
                }
            })
            .collect();

        Self(components)
    }

    /// Returns the parsed components, including explicit zeros.
    pub fn components(&self) -> &[u64] {
        &self.0
    }

    fn component(&self, idx: usize) -> u64 {
        self.0.get(idx).copied().unwrap_or(0)
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|idx| self.component(idx).cmp(&other.component(idx)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
