//! Error reporting policy.

use std::cell::RefCell;

use lucid_config::ErrorMode;

use crate::error::BlockError;

/// Decides what a reported failure does to the render.
///
/// In strict mode the error is handed back and halts the enclosing
/// expansion. In lenient mode it is logged, recorded, and the failing branch
/// completes without its replacement.
#[derive(Debug, Default)]
pub struct ErrorPolicy {
    mode: ErrorMode,
    warnings: RefCell<Vec<String>>,
}

impl ErrorPolicy {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            warnings: RefCell::new(Vec::new()),
        }
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    pub fn report(&self, err: BlockError) -> Result<(), BlockError> {
        match self.mode {
            ErrorMode::Strict => Err(err),
            ErrorMode::Lenient => {
                tracing::warn!(kind = ?err.kind(), "{err}");
                self.warnings.borrow_mut().push(err.to_string());
                Ok(())
            }
        }
    }

    /// Messages recorded in lenient mode.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    /// Drain recorded messages.
    pub fn take_warnings(&self) -> Vec<String> {
        self.warnings.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_returns_error() {
        let policy = ErrorPolicy::new(ErrorMode::Strict);
        let result = policy.report(BlockError::UnknownPageType("x".to_owned()));
        assert!(matches!(result, Err(BlockError::UnknownPageType(_))));
        assert!(policy.warnings().is_empty());
    }

    #[test]
    fn test_lenient_records_warning() {
        let policy = ErrorPolicy::new(ErrorMode::Lenient);
        policy
            .report(BlockError::MissingArgument("menu_id".to_owned()))
            .unwrap();
        assert_eq!(
            policy.take_warnings(),
            vec!["required block argument 'menu_id' is missing".to_owned()]
        );
        assert!(policy.warnings().is_empty());
    }
}
