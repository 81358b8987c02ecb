//! Shared test constants

/// Extension used throughout the acquisition scenarios
pub const HELLO: &str = "hello";

/// Version published in the hello fragment
pub const HELLO_VERSION: &str = "1.0.0";

/// Binary payload shipped in hello archives
pub const HELLO_BINARY: &[u8] = b"Hello, World!";

/// sha256 of HELLO_BINARY
pub const HELLO_SHA256: &str =
    "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";

/// Archive entry holding the catalog fragment
pub const FRAGMENT_FILENAME: &str = "manifest.toml";

/// Token identifying the binary entry
pub const BINARY_PREFIX: &str = "stripe-cli-";

/// Catalog file name at the distribution base
pub const CATALOG_FILENAME: &str = "plugins.toml";

/// Distribution endpoint relative to the API origin
pub const DISTRIBUTION_ENDPOINT: &str = "stripecli/get-plugin-url";

/// Credential accepted by the mock API
pub const TEST_API_KEY: &str = "sk_test_extman";

/// Platform every test installs for
pub const TEST_OS: &str = "linux";
pub const TEST_ARCH: &str = "x86_64";

/// Binary entry name for `extension`
pub fn binary_entry(extension: &str) -> String {
    format!("{}{}", BINARY_PREFIX, extension)
}

/// `sha256:`-prefixed digest string
pub fn sha256_sum(hex: &str) -> String {
    format!("sha256:{}", hex)
}
