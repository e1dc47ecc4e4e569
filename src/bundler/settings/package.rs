//! Application metadata.

/// Application metadata shared by every target.
///
/// Usually read from the application's `package.json` (see
/// [`crate::metadata::load_app_metadata`]) and optionally overridden on the
/// command line or in `bundle.toml`.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_electron::bundler::PackageSettings;
///
/// let settings = PackageSettings {
///     product_name: "CopyCat".into(),
///     version: Some("1.2.0".into()),
///     ..Default::default()
/// };
/// assert_eq!(settings.product_name, "CopyCat");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PackageSettings {
    /// Product name displayed to users.
    ///
    /// Becomes the packaged executable name and the prefix of every output
    /// directory (`{product_name}-{platform}-{arch}`).
    pub product_name: String,

    /// Version string, when the app declares one. Shown in the run header
    /// and recorded in the build report.
    pub version: Option<String>,
}
