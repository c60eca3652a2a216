//! Per-call save options and legacy argument coercion.

use crate::SaveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Recognized save options.
pub struct SaveOptions {
    /// Prepend a UTF-8 byte-order mark to UTF-8 text and XML payloads.
    pub auto_bom: bool,
}

/// Options argument as supplied by a caller, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveOptionsArg {
    /// No options passed.
    #[default]
    Absent,
    /// A proper options record.
    Record(SaveOptions),
    /// A non-record value, reduced to its truthiness.
    Legacy(bool),
}

impl SaveOptionsArg {
    /// Resolves the effective options.
    ///
    /// A legacy value `v` becomes `{ auto_bom: !v }` and is reported as deprecated usage.
    pub fn normalize(self) -> (SaveOptions, Option<SaveError>) {
        match self {
            Self::Absent => (SaveOptions::default(), None),
            Self::Record(options) => (options, None),
            Self::Legacy(truthy) => (
                SaveOptions { auto_bom: !truthy },
                Some(SaveError::DeprecatedUsage(
                    "Expected third argument to be a object".to_string(),
                )),
            ),
        }
    }
}

impl From<SaveOptions> for SaveOptionsArg {
    fn from(options: SaveOptions) -> Self {
        Self::Record(options)
    }
}

impl From<Option<SaveOptions>> for SaveOptionsArg {
    fn from(options: Option<SaveOptions>) -> Self {
        options.map_or(Self::Absent, Self::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_boolean_is_inverted_and_flagged() {
        let (options, warning) = SaveOptionsArg::Legacy(true).normalize();
        assert_eq!(options, SaveOptions { auto_bom: false });
        assert!(matches!(warning, Some(SaveError::DeprecatedUsage(_))));

        let (options, _) = SaveOptionsArg::Legacy(false).normalize();
        assert_eq!(options, SaveOptions { auto_bom: true });
    }

    #[test]
    fn absent_and_record_pass_through_without_warning() {
        assert_eq!(
            SaveOptionsArg::Absent.normalize(),
            (SaveOptions::default(), None)
        );
        let record = SaveOptions { auto_bom: true };
        assert_eq!(SaveOptionsArg::from(record).normalize(), (record, None));
    }
}
