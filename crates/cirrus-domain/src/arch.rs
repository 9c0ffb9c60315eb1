pub const AMD64: &str = "amd64";
pub const I386: &str = "i386";
pub const ARM: &str = "armhf";
pub const ARM64: &str = "arm64";
pub const PPC64: &str = "ppc64";

pub const ALL: &[&str] = &[AMD64, I386, ARM, ARM64, PPC64];

/// Maps toolchain/kernel architecture spellings onto catalog architecture names.
/// Unknown names are returned lowercased.
#[must_use]
pub fn normalise(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "x86_64" | "amd64" => AMD64.to_string(),
        "x86" | "i386" | "i686" => I386.to_string(),
        "arm" | "armv7l" | "armhf" => ARM.to_string(),
        "aarch64" | "arm64" => ARM64.to_string(),
        "powerpc64" | "powerpc64le" | "ppc64" | "ppc64el" | "ppc64le" => PPC64.to_string(),
        _ => lowered,
    }
}

#[must_use]
pub fn is_known(arch: &str) -> bool {
    ALL.contains(&arch)
}
