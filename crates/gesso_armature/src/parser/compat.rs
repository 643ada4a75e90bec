//! Legacy syntax gates.
//!
//! Every check is a no-op when the parser runs without a compat config.

use gesso_relief::{CompilerWarning, DeprecationType, SourceLocation};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn is_compat_enabled(&self, key: DeprecationType) -> bool {
        self.options
            .compat
            .as_ref()
            .is_some_and(|config| config.is_enabled(key))
    }

    /// Like [`Self::is_compat_enabled`], reporting the deprecation when the
    /// legacy behaviour applies.
    pub(super) fn check_compat_enabled(
        &mut self,
        key: DeprecationType,
        loc: &SourceLocation,
        arg: Option<&str>,
    ) -> bool {
        let enabled = self.is_compat_enabled(key);
        if enabled {
            self.warn_deprecation(key, loc, arg);
        }
        enabled
    }

    pub(super) fn warn_deprecation(
        &mut self,
        key: DeprecationType,
        loc: &SourceLocation,
        arg: Option<&str>,
    ) {
        let suppressed = self
            .options
            .compat
            .as_ref()
            .is_some_and(|config| config.is_warning_suppressed(key));
        if suppressed {
            return;
        }
        tracing::trace!(key = key.key(), offset = loc.start.offset, "deprecated syntax");
        self.warnings
            .push(CompilerWarning::new(key, Some(loc.clone()), arg));
    }
}
