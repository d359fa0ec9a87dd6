//! This crate rexports all shroud crates.

pub use shroud_binary_io as binary_io;
pub use shroud_core as core;
pub use shroud_crypto as crypto;
pub use shroud_packet as packet;

/// The shroud crate version string in the form "major.minor.patch" (e.g. "1.2.3")
pub fn crate_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
/// The shroud crate major version represented as unsigned integer
pub fn crate_version_major() -> u32 {
    env!("CARGO_PKG_VERSION_MAJOR").parse().expect("Invalid major version")
}
/// The shroud crate minor version represented as unsigned integer
pub fn crate_version_minor() -> u32 {
    env!("CARGO_PKG_VERSION_MINOR").parse().expect("Invalid minor version")
}
/// The shroud crate patch version represented as unsigned integer
pub fn crate_version_patch() -> u32 {
    env!("CARGO_PKG_VERSION_PATCH").parse().expect("Invalid patch version")
}

#[cfg(test)]
mod tests {
    #[test]
    fn crate_version_is_not_empty() {
        assert_ne!(crate::crate_version(), "");
    }

    #[test]
    fn crate_version_parts() {
        let version = format!(
            "{}.{}.{}",
            crate::crate_version_major(),
            crate::crate_version_minor(),
            crate::crate_version_patch(),
        );
        assert!(crate::crate_version().starts_with(&version));
    }
}
