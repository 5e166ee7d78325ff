//! Comma-separated argument lists with backslash escapes.
//!
//! `\\` and `\,` escape a backslash and a comma; maps additionally accept
//! `\=`. Any other escape is rejected.

use crate::bundler::error::{Error, Result};
use std::collections::BTreeMap;

/// Splits `a,b\,c` into `["a", "b,c"]`.
///
/// An empty input yields one empty element.
pub fn split_list(input: &str) -> Result<Vec<String>> {
    let mut output = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(unescape(chars.next(), &['\\', ','])?),
            ',' => output.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    output.push(current);
    Ok(output)
}

/// Splits `k1=v1,k2=v\=2` into `{k1: v1, k2: v=2}`.
///
/// Only the first unescaped `=` of a pair separates key and value; a pair
/// without `=` maps to an empty value. Later keys replace earlier ones.
pub fn split_map(input: &str) -> Result<BTreeMap<String, String>> {
    let mut output = BTreeMap::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        let current = if in_value { &mut value } else { &mut key };
        match c {
            '\\' => current.push(unescape(chars.next(), &['\\', ',', '='])?),
            '=' if !in_value => in_value = true,
            ',' => {
                output.insert(std::mem::take(&mut key), std::mem::take(&mut value));
                in_value = false;
            }
            _ => current.push(c),
        }
    }
    output.insert(key, value);
    Ok(output)
}

fn unescape(next: Option<char>, allowed: &[char]) -> Result<char> {
    match next {
        Some(c) if allowed.contains(&c) => Ok(c),
        Some(c) => Err(Error::Configuration(format!("invalid escaped character: {c}"))),
        None => Err(Error::Configuration(
            "backslash without escaped character".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_honor_escapes() {
        assert_eq!(
            split_list(r"-Xmx2G,-Dfoo=a\,b,C:\\tmp").unwrap(),
            vec!["-Xmx2G", "-Dfoo=a,b", r"C:\tmp"]
        );
        assert_eq!(split_list("").unwrap(), vec![""]);
    }

    #[test]
    fn maps_split_on_first_equals() {
        let map = split_map(r"-Dfoo=-Dfoo=1,path=a\=b\,c,flag").unwrap();
        assert_eq!(map["-Dfoo"], "-Dfoo=1");
        assert_eq!(map["path"], "a=b,c");
        assert_eq!(map["flag"], "");
    }

    #[test]
    fn bad_escapes_are_configuration_errors() {
        assert!(split_list(r"a\n").unwrap_err().is_fatal());
        assert!(split_list("trailing\\").unwrap_err().is_fatal());
        assert!(split_list(r"a\=b").is_err());
        assert!(split_map(r"a=\x").is_err());
    }
}
