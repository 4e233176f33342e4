/// Behavioral options for a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOption {
    /// Raise [`Error::PathNotFound`][crate::Error::PathNotFound] when a field
    /// lookup misses, instead of yielding null or silently dropping the
    /// element in array context
    ThrowOnMissingProperty,
}

/// Binds a set of [`ReadOption`]s to an evaluation
///
/// A `Configuration` is an explicit value threaded through
/// [`read_with`][crate::JsonPath::read_with] calls; there is no process-wide
/// default beyond [`Configuration::default`].
///
/// # Example
/// ```rust
/// use json_path::{Configuration, ReadOption};
///
/// let config = Configuration::default().with_option(ReadOption::ThrowOnMissingProperty);
/// assert!(config.has_option(ReadOption::ThrowOnMissingProperty));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    options: Vec<ReadOption>,
}

impl Configuration {
    /// Create a configuration with no options set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, returning the updated configuration
    pub fn with_option(mut self, option: ReadOption) -> Self {
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    /// Check whether an option is set
    pub fn has_option(&self, option: ReadOption) -> bool {
        self.options.contains(&option)
    }

    /// The options set on this configuration
    pub fn options(&self) -> &[ReadOption] {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::{Configuration, ReadOption};

    #[test]
    fn options_are_deduplicated() {
        let config = Configuration::new()
            .with_option(ReadOption::ThrowOnMissingProperty)
            .with_option(ReadOption::ThrowOnMissingProperty);
        assert_eq!(config.options().len(), 1);
    }

    #[test]
    fn default_has_no_options() {
        assert!(!Configuration::default().has_option(ReadOption::ThrowOnMissingProperty));
    }
}
