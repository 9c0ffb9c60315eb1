//! OS release versions and the series names the catalog is keyed by.

const UBUNTU_SERIES: &[(&str, &str)] = &[
    ("12.04", "precise"),
    ("12.10", "quantal"),
    ("13.04", "raring"),
    ("13.10", "saucy"),
    ("14.04", "trusty"),
    ("14.10", "utopic"),
    ("15.04", "vivid"),
    ("15.10", "wily"),
    ("16.04", "xenial"),
    ("16.10", "yakkety"),
    ("17.04", "zesty"),
    ("17.10", "artful"),
    ("18.04", "bionic"),
    ("20.04", "focal"),
    ("22.04", "jammy"),
    ("24.04", "noble"),
];

/// Maps a published OS version such as `14.04` to its series name.
#[must_use]
pub fn version_series(version: &str) -> Option<&'static str> {
    let version = version.trim();
    UBUNTU_SERIES
        .iter()
        .find(|(known, _)| *known == version)
        .map(|(_, series)| *series)
}

/// Maps a series name back to its OS version.
#[must_use]
pub fn series_version(series: &str) -> Option<&'static str> {
    UBUNTU_SERIES
        .iter()
        .find(|(_, known)| *known == series)
        .map(|(version, _)| *version)
}
