//! Adapter configuration.

use crate::adoption::PROC_SELF_FD_PREFIX;

/// Default permission bits for files created by the adapter.
pub const DEFAULT_CREATE_PERMISSIONS: u32 = 0o666;

/// Options controlling how [`FdFileFunctions`](crate::FdFileFunctions)
/// opens files.
///
/// # Example
///
/// ```rust
/// use zipfd::AdapterOptions;
///
/// // Plain filesystem access only, files created owner-only
/// let options = AdapterOptions::new()
///     .adopt_descriptors(false)
///     .create_permissions(0o600);
/// assert!(!options.adopts_descriptors());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    adopt_descriptors: bool,
    adoption_prefix: String,
    create_permissions: u32,
}

impl AdapterOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables descriptor adoption.
    ///
    /// When disabled, paths under the adoption prefix are opened like any
    /// other path.
    pub fn adopt_descriptors(mut self, adopt: bool) -> Self {
        self.adopt_descriptors = adopt;
        self
    }

    /// Sets the path prefix that marks a descriptor hand-off.
    pub fn adoption_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.adoption_prefix = prefix.into();
        self
    }

    /// Sets the permission bits used when a file is created.
    ///
    /// The process umask still applies.
    pub fn create_permissions(mut self, mode: u32) -> Self {
        self.create_permissions = mode;
        self
    }

    /// Returns true if descriptor adoption is enabled.
    pub fn adopts_descriptors(&self) -> bool {
        self.adopt_descriptors
    }

    /// Returns the adoption prefix.
    pub fn prefix(&self) -> &str {
        &self.adoption_prefix
    }

    /// Returns the permission bits used on create.
    pub fn permissions(&self) -> u32 {
        self.create_permissions
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            adopt_descriptors: true,
            adoption_prefix: PROC_SELF_FD_PREFIX.to_string(),
            create_permissions: DEFAULT_CREATE_PERMISSIONS,
        }
    }
}
