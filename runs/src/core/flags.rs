//! Flag aggregation: the per-key cross-product summary behind `runs flags`.

/// Ordered `key -> values` groups, keys and values in first-seen order.
pub type FlagGroups = Vec<(String, Vec<String>)>;

/// Group `key<delim>value` tokens across `commands`.
///
/// A token is split at its first delimiter; leading dashes are dropped from
/// the key, so `--lr=0.1` and `lr=0.1` both group under `lr`. Commands without
/// the delimiter contribute nothing. Repeated values for a key are listed once.
pub fn parse_flags<S: AsRef<str>>(commands: &[S], delimiter: char) -> FlagGroups {
    let mut groups: FlagGroups = Vec::new();
    for command in commands {
        let command = command.as_ref();
        if !command.contains(delimiter) {
            continue;
        }
        for word in command.split_whitespace() {
            let Some((key, value)) = word.split_once(delimiter) else {
                continue;
            };
            let key = key.trim_start_matches('-');
            let index = match groups.iter().position(|(k, _)| k == key) {
                Some(index) => index,
                None => {
                    groups.push((key.to_string(), Vec::new()));
                    groups.len() - 1
                }
            };
            let values = &mut groups[index].1;
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
    }
    groups
}

/// Render one `key<delim>v1|v2|…` line per key.
pub fn render_flags(groups: &FlagGroups, delimiter: char) -> Vec<String> {
    groups
        .iter()
        .map(|(key, values)| format!("{key}{delimiter}{}", values.join("|")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_values_by_key_in_first_seen_order() {
        let commands = ["run --lr=0.1 --bs=32", "run --lr=0.2"];
        let groups = parse_flags(&commands, '=');
        assert_eq!(
            render_flags(&groups, '='),
            vec!["lr=0.1|0.2".to_string(), "bs=32".to_string()]
        );
    }

    #[test]
    fn dashed_and_bare_keys_share_a_group() {
        let groups = parse_flags(&["run lr=0.1 -bs=32", "run --lr=0.2"], '=');
        assert_eq!(
            render_flags(&groups, '='),
            vec!["lr=0.1|0.2".to_string(), "bs=32".to_string()]
        );
    }

    #[test]
    fn splits_at_first_delimiter_only() {
        let groups = parse_flags(&["x --opt=a=b"], '=');
        assert_eq!(
            groups,
            vec![("opt".to_string(), vec!["a=b".to_string()])]
        );
    }

    #[test]
    fn commands_without_delimiter_contribute_nothing() {
        let groups = parse_flags(&["python train.py --fast", "echo"], '=');
        assert!(groups.is_empty());
    }

    #[test]
    fn repeated_values_are_listed_once() {
        let groups = parse_flags(&["a --s=1", "b --s=1", "c --s=2"], '=');
        assert_eq!(render_flags(&groups, '='), vec!["s=1|2".to_string()]);
    }

    #[test]
    fn custom_delimiter() {
        let groups = parse_flags(&["train seed:1 lr:0.1", "train seed:2"], ':');
        assert_eq!(
            render_flags(&groups, ':'),
            vec!["seed:1|2".to_string(), "lr:0.1".to_string()]
        );
    }
}
