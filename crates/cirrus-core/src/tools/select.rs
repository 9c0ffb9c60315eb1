use std::collections::BTreeMap;

use cirrus_domain::api::{Number, ToolBinary, VersionConstraint};

/// Which published binaries are eligible for a CLI version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub newest_wins: bool,
    pub constraint: VersionConstraint,
}

impl SelectionPolicy {
    /// Development environments and dev CLIs take the newest binary of any version.
    /// Release CLIs stay within their own major.minor. A pin admits only its exact
    /// version.
    #[must_use]
    pub fn for_cli(
        cli: &Number,
        development: bool,
        pinned: Option<Number>,
        series: &str,
        arch: Option<String>,
    ) -> Self {
        let newest_wins = development || cli.is_dev();
        let constraint = if pinned.is_some() || newest_wins {
            VersionConstraint::any(series, arch)
        } else {
            VersionConstraint::family_of(cli, series, arch)
        };
        Self {
            newest_wins,
            constraint: constraint.pinned(pinned),
        }
    }
}

/// Highest eligible version per architecture, ordered by architecture. Equal versions
/// resolve to the one listed last.
#[must_use]
pub fn select_tools(available: &[ToolBinary], policy: &SelectionPolicy) -> Vec<ToolBinary> {
    let mut by_arch: BTreeMap<&str, Vec<&ToolBinary>> = BTreeMap::new();
    for tools in available
        .iter()
        .filter(|tools| policy.constraint.matches(tools))
    {
        by_arch.entry(tools.arch.as_str()).or_default().push(tools);
    }
    by_arch
        .into_values()
        .filter_map(|candidates| candidates.into_iter().max_by_key(|tools| tools.version))
        .cloned()
        .inspect(|tools| {
            tracing::debug!(arch = %tools.arch, version = %tools.version, "selected tools");
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{number, tools};

    fn published() -> Vec<ToolBinary> {
        vec![
            tools("1.17.9", "trusty", "amd64"),
            tools("1.18.0", "trusty", "amd64"),
            tools("1.18.3", "trusty", "amd64"),
            tools("1.18.2.1", "trusty", "amd64"),
            tools("1.19.0", "trusty", "amd64"),
            tools("2.0.0", "trusty", "arm64"),
            tools("1.18.1", "trusty", "arm64"),
            tools("1.18.9", "precise", "amd64"),
        ]
    }

    fn versions(selected: &[ToolBinary]) -> Vec<String> {
        selected
            .iter()
            .map(|tools| format!("{}/{}", tools.arch, tools.version))
            .collect()
    }

    #[test]
    fn release_cli_stays_in_its_family() {
        let policy = SelectionPolicy::for_cli(&number("1.18.0"), false, None, "trusty", None);
        assert!(!policy.newest_wins);
        let selected = select_tools(&published(), &policy);
        assert_eq!(versions(&selected), ["amd64/1.18.3", "arm64/1.18.1"]);
    }

    #[test]
    fn development_mode_takes_the_newest_across_families() {
        let policy = SelectionPolicy::for_cli(&number("1.18.0"), true, None, "trusty", None);
        assert!(policy.newest_wins);
        let selected = select_tools(&published(), &policy);
        assert_eq!(versions(&selected), ["amd64/1.19.0", "arm64/2.0.0"]);
    }

    #[test]
    fn dev_cli_behaves_like_development_mode() {
        let policy = SelectionPolicy::for_cli(&number("1.19.0"), false, None, "trusty", None);
        assert!(policy.newest_wins);
        let selected = select_tools(&published(), &policy);
        assert_eq!(versions(&selected), ["amd64/1.19.0", "arm64/2.0.0"]);
    }

    #[test]
    fn arch_constraint_narrows_selection() {
        let policy = SelectionPolicy::for_cli(
            &number("1.18.0"),
            false,
            None,
            "trusty",
            Some("arm64".into()),
        );
        let selected = select_tools(&published(), &policy);
        assert_eq!(versions(&selected), ["arm64/1.18.1"]);
    }

    #[test]
    fn pin_admits_only_the_exact_version() {
        let policy = SelectionPolicy::for_cli(
            &number("1.18.0"),
            false,
            Some(number("1.17.9")),
            "trusty",
            None,
        );
        let selected = select_tools(&published(), &policy);
        assert_eq!(versions(&selected), ["amd64/1.17.9"]);
    }

    #[test]
    fn equal_versions_resolve_to_the_last_listed() {
        let mut second = tools("1.18.0", "trusty", "amd64");
        second.storage_location = "file:///second/tools.tgz".into();
        let available = vec![tools("1.18.0", "trusty", "amd64"), second.clone()];
        let policy = SelectionPolicy::for_cli(&number("1.18.0"), false, None, "trusty", None);
        assert_eq!(select_tools(&available, &policy), vec![second]);
    }
}
