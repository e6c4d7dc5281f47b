// ─── Launch Arguments ───
// Rule-gated argument lists and `${placeholder}` substitution.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::version::{include_argument, ArgumentEntry, ArgumentValue, RuntimeContext};

/// Flatten descriptor entries into tokens, dropping rule-excluded ones.
pub fn collect_arguments(entries: &[ArgumentEntry], ctx: &RuntimeContext) -> Vec<String> {
    let mut tokens = Vec::new();
    for entry in entries {
        match entry {
            ArgumentEntry::Literal(token) => tokens.push(token.clone()),
            ArgumentEntry::Conditional { rules, value } => {
                if !include_argument(rules, ctx) {
                    debug!("Skipping argument (rules): {:?}", value);
                    continue;
                }
                match value {
                    ArgumentValue::Single(token) => tokens.push(token.clone()),
                    ArgumentValue::Many(list) => tokens.extend(list.iter().cloned()),
                }
            }
        }
    }
    tokens
}

/// Space-joined, without trailing whitespace.
pub fn join_arguments(tokens: &[String]) -> String {
    tokens.join(" ").trim_end().to_string()
}

/// Single-pass replacement of every key in `values`.
///
/// The input is scanned once, left to right; at each position the longest
/// matching key wins. Inserted values are never scanned again, so the result
/// does not depend on the order of `values` or on what the values contain.
pub fn substitute(args: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(args.len());
    let mut rest = args;

    while let Some(ch) = rest.chars().next() {
        let hit = values
            .iter()
            .filter(|(key, _)| !key.is_empty() && rest.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len());
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    out
}

/// Wrap a value in double quotes for the launch script.
pub fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_demo_user: bool) -> RuntimeContext {
        RuntimeContext {
            os_name: "linux".into(),
            arch: "x64".into(),
            is_demo_user,
        }
    }

    fn entries(json: serde_json::Value) -> Vec<ArgumentEntry> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn demo_argument_follows_the_demo_flag() {
        let game = entries(serde_json::json!([
            "--arg1",
            {"rules": [{"action": "allow", "features": {"is_demo_user": true}}], "value": "--demo"}
        ]));

        assert_eq!(collect_arguments(&game, &ctx(true)), vec!["--arg1"]);
        assert_eq!(collect_arguments(&game, &ctx(false)), vec!["--arg1", "--demo"]);
    }

    #[test]
    fn array_values_are_spliced_in_order() {
        let jvm = entries(serde_json::json!([
            "-Xss1M",
            {"rules": [{"action": "allow", "os": {"name": "osx"}}], "value": ["-XstartOnFirstThread", "-Dx=y"]},
            "-cp"
        ]));
        assert_eq!(
            collect_arguments(&jvm, &ctx(false)),
            vec!["-Xss1M", "-XstartOnFirstThread", "-Dx=y", "-cp"]
        );
    }

    #[test]
    fn join_trims_trailing_space() {
        let tokens = vec!["--a".to_string(), "b".to_string(), String::new()];
        assert_eq!(join_arguments(&tokens), "--a b");
        assert_eq!(join_arguments(&[]), "");
    }

    fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_every_placeholder() {
        let values = table(&[
            ("${auth_player_name}", "Steve"),
            ("${version_name}", "1.20"),
            ("${game_directory}", "\"/mc\""),
        ]);
        let args = "--username ${auth_player_name} --version ${version_name} --gameDir ${game_directory}";

        assert_eq!(
            substitute(args, &values),
            "--username Steve --version 1.20 --gameDir \"/mc\""
        );
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let args = "--username ${auth_player_name} --version ${version_name}";
        let values = table(&[
            ("${auth_player_name}", "${version_name}"),
            ("${version_name}", "1.20"),
        ]);
        assert_eq!(
            substitute(args, &values),
            "--username ${version_name} --version 1.20"
        );

        let values = table(&[
            ("${version_name}", "${auth_player_name}"),
            ("${auth_player_name}", "Steve"),
        ]);
        assert_eq!(
            substitute(args, &values),
            "--username Steve --version ${auth_player_name}"
        );
    }

    #[test]
    fn literal_keys_are_replaced_once() {
        let values = table(&[("-Dos.name=Windows 10", "-Dos.name=\"Windows 10\"")]);
        assert_eq!(
            substitute("-Xmx2G -Dos.name=Windows 10 -cp", &values),
            "-Xmx2G -Dos.name=\"Windows 10\" -cp"
        );
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let values = BTreeMap::from([("${a}".to_string(), "1".to_string())]);
        assert_eq!(substitute("${a} ${b}", &values), "1 ${b}");
    }
}
