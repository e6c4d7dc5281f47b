// ─── Rules ───
// Conditional inclusion of libraries and launch arguments.
//
// Libraries and arguments read the same rule documents with different
// polarity. Libraries are gated on platform equality; arguments are dropped
// when a rule names one of a few blocking conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// OS name whose argument rules are always dropped.
const BLOCKED_ARGUMENT_OS: &str = "windows";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

/// Facts about the machine and the player that rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    /// Mojang OS name: `windows`, `osx` or `linux`.
    pub os_name: String,
    /// Normalized architecture, see [`normalize_arch`].
    pub arch: String,
    pub is_demo_user: bool,
}

impl RuntimeContext {
    pub fn current(is_demo_user: bool) -> Self {
        Self {
            os_name: current_os_name().to_string(),
            arch: normalize_arch(host_arch()),
            is_demo_user,
        }
    }
}

/// Get the Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

/// Architecture in `amd64` / `386` / `arm64` spelling.
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Trim leading `a`, `m` and `d` characters and prepend `x`: `amd64`
/// becomes `x64`, `arm64` becomes `xrm64`.
pub fn normalize_arch(raw: &str) -> String {
    format!("x{}", raw.trim_start_matches(['a', 'm', 'd']))
}

/// Library selection. A library is kept unless an `allow` rule names a
/// different OS or a different architecture. Other actions are ignored.
pub fn include_library(rules: Option<&[Rule]>, ctx: &RuntimeContext) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    let excluded = rules
        .iter()
        .filter(|rule| rule.action == RuleAction::Allow)
        .filter_map(|rule| rule.os.as_ref())
        .fold(false, |excluded, os| {
            let other_os = os.name.as_deref().is_some_and(|name| name != ctx.os_name);
            let other_arch = os.arch.as_deref().is_some_and(|arch| arch != ctx.arch);
            excluded | other_os | other_arch
        });

    !excluded
}

/// Argument selection. An entry is dropped when an `allow` rule requires the
/// current demo flag or a custom resolution, targets the blocked OS name, or
/// targets the current architecture.
pub fn include_argument(rules: &[Rule], ctx: &RuntimeContext) -> bool {
    let excluded = rules
        .iter()
        .filter(|rule| rule.action == RuleAction::Allow)
        .fold(false, |excluded, rule| {
            excluded | blocks_by_feature(rule, ctx) | blocks_by_platform(rule, ctx)
        });

    !excluded
}

fn blocks_by_feature(rule: &Rule, ctx: &RuntimeContext) -> bool {
    rule.features.as_ref().is_some_and(|features| {
        features.iter().any(|(key, expected)| match key.as_str() {
            "is_demo_user" => *expected == ctx.is_demo_user,
            "has_custom_resolution" => *expected,
            _ => false,
        })
    })
}

fn blocks_by_platform(rule: &Rule, ctx: &RuntimeContext) -> bool {
    rule.os.as_ref().is_some_and(|os| {
        os.name.as_deref() == Some(BLOCKED_ARGUMENT_OS) || os.arch.as_deref() == Some(ctx.arch.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(os_name: &str, arch: &str, is_demo_user: bool) -> RuntimeContext {
        RuntimeContext {
            os_name: os_name.into(),
            arch: arch.into(),
            is_demo_user,
        }
    }

    fn rules(json: serde_json::Value) -> Vec<Rule> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn arch_normalization() {
        assert_eq!(normalize_arch("amd64"), "x64");
        assert_eq!(normalize_arch("386"), "x386");
        assert_eq!(normalize_arch("arm64"), "xrm64");
        assert_eq!(normalize_arch("dam64"), "x64");
    }

    #[test]
    fn empty_rules_include_everything() {
        let context = ctx("linux", "x64", true);
        assert!(include_library(None, &context));
        assert!(include_library(Some(&[]), &context));
        assert!(include_argument(&[], &context));
    }

    #[test]
    fn library_for_other_os_is_excluded() {
        let r = rules(serde_json::json!([{"action": "allow", "os": {"name": "osx"}}]));
        assert!(!include_library(Some(&r), &ctx("linux", "x64", false)));
        assert!(include_library(Some(&r), &ctx("osx", "x64", false)));
    }

    #[test]
    fn library_for_other_arch_is_excluded() {
        let r = rules(serde_json::json!([{"action": "allow", "os": {"arch": "x86"}}]));
        assert!(!include_library(Some(&r), &ctx("linux", "x64", false)));
        assert!(include_library(Some(&r), &ctx("linux", "x86", false)));
    }

    #[test]
    fn library_disallow_rules_are_ignored() {
        let r = rules(serde_json::json!([
            {"action": "allow"},
            {"action": "disallow", "os": {"name": "linux"}}
        ]));
        assert!(include_library(Some(&r), &ctx("linux", "x64", false)));
    }

    #[test]
    fn library_rule_without_action_counts_as_allow() {
        let r = rules(serde_json::json!([{"os": {"name": "windows"}}]));
        assert!(!include_library(Some(&r), &ctx("linux", "x64", false)));
    }

    #[test]
    fn demo_argument_follows_demo_flag() {
        let r = rules(serde_json::json!([
            {"action": "allow", "features": {"is_demo_user": true}}
        ]));
        assert!(!include_argument(&r, &ctx("linux", "x64", true)));
        assert!(include_argument(&r, &ctx("linux", "x64", false)));
    }

    #[test]
    fn custom_resolution_arguments_are_dropped() {
        let r = rules(serde_json::json!([
            {"action": "allow", "features": {"has_custom_resolution": true}}
        ]));
        assert!(!include_argument(&r, &ctx("linux", "x64", false)));

        let r = rules(serde_json::json!([
            {"action": "allow", "features": {"has_custom_resolution": false}}
        ]));
        assert!(include_argument(&r, &ctx("linux", "x64", false)));
    }

    #[test]
    fn argument_platform_blocks() {
        let windows = rules(serde_json::json!([{"action": "allow", "os": {"name": "windows"}}]));
        let osx = rules(serde_json::json!([{"action": "allow", "os": {"name": "osx"}}]));
        let same_arch = rules(serde_json::json!([{"action": "allow", "os": {"arch": "x64"}}]));
        let other_arch = rules(serde_json::json!([{"action": "allow", "os": {"arch": "x86"}}]));
        let context = ctx("linux", "x64", false);

        assert!(!include_argument(&windows, &context));
        assert!(include_argument(&osx, &context));
        assert!(!include_argument(&same_arch, &context));
        assert!(include_argument(&other_arch, &context));
    }

    #[test]
    fn argument_disallow_rules_are_ignored() {
        let r = rules(serde_json::json!([
            {"action": "disallow", "os": {"name": "windows"}}
        ]));
        assert!(include_argument(&r, &ctx("linux", "x64", false)));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let r = rules(serde_json::json!([
            {"action": "allow", "os": {"name": "linux", "arch": "x64"}},
            {"action": "allow", "features": {"is_demo_user": false}}
        ]));
        let context = ctx("linux", "x64", false);
        let first = (include_library(Some(&r), &context), include_argument(&r, &context));
        for _ in 0..10 {
            assert_eq!(
                (include_library(Some(&r), &context), include_argument(&r, &context)),
                first
            );
        }
    }
}
