use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cookie jar for the VRChat session.
///
/// Only `name=value` pairs are kept; attributes (`Path`, `Expires`, ...) are
/// discarded. Names are case-sensitive and a later cookie with the same name
/// replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie`-header-style string (`"a=1; b=2"`) into a jar.
    pub fn parse(cookie_string: &str) -> Self {
        let mut jar = Self::new();
        for item in cookie_string.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (name, value) = match item.split_once('=') {
                Some((name, value)) => (name, value),
                None => (item, ""),
            };
            if name.is_empty() {
                continue;
            }
            jar.0.insert(name.to_string(), value.to_string());
        }
        jar
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Merge `Set-Cookie` header values into the jar, last-write-wins per
    /// name. Each value looks like `name=value; Path=/; HttpOnly`; everything
    /// after the first `;` is dropped.
    pub fn merge_set_cookie<I, S>(&mut self, set_cookie_values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in set_cookie_values {
            let pair = value.as_ref().split(';').next().unwrap_or("").trim();
            if pair.is_empty() {
                continue;
            }
            let (name, value) = match pair.split_once('=') {
                Some((name, value)) => (name, value),
                None => (pair, ""),
            };
            if name.is_empty() {
                continue;
            }
            self.0.insert(name.to_string(), value.to_string());
        }
    }

    /// Merge every `Set-Cookie` header carried by a response. A response may
    /// carry none, one, or several; all shapes end up in the same jar.
    pub fn merge_headers(&mut self, headers: &reqwest::header::HeaderMap) {
        let values = headers
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());
        self.merge_set_cookie(values);
    }

    /// Serialize the whole jar into a single `Cookie` header value.
    pub fn header_value(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_pairs_and_trims() {
        let jar = CookieJar::parse("auth=abc; apiKey=xyz;  flag ");
        assert_eq!(jar.get("auth"), Some("abc"));
        assert_eq!(jar.get("apiKey"), Some("xyz"));
        assert_eq!(jar.get("flag"), Some(""));
    }

    #[test]
    fn merge_discards_attributes() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookie(["auth=token123; Path=/; HttpOnly; Expires=Wed, 01 Jan 2031 00:00:00 GMT"]);
        assert_eq!(jar.get("auth"), Some("token123"));
        assert_eq!(jar.header_value(), "auth=token123");
    }

    #[test]
    fn merge_is_last_write_wins_per_name() {
        let mut jar = CookieJar::parse("auth=old; twoFactorAuth=keep");
        jar.merge_set_cookie(["auth=new; Path=/"]);
        assert_eq!(jar.get("auth"), Some("new"));
        assert_eq!(jar.get("twoFactorAuth"), Some("keep"));
    }

    #[test]
    fn merge_applied_twice_is_idempotent() {
        let mut jar = CookieJar::parse("a=1; b=2");
        let headers = ["b=3; Path=/", "c=4"];
        jar.merge_set_cookie(headers);
        let once = jar.clone();
        jar.merge_set_cookie(headers);
        assert_eq!(jar, once);
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("3"));
        assert_eq!(jar.get("c"), Some("4"));
    }

    #[test]
    fn merge_with_no_headers_changes_nothing() {
        let mut jar = CookieJar::parse("a=1");
        jar.merge_set_cookie(std::iter::empty::<&str>());
        assert_eq!(jar.header_value(), "a=1");
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookie(["token=abc=def==; Secure"]);
        assert_eq!(jar.get("token"), Some("abc=def=="));
    }

    #[test]
    fn cookie_names_are_case_sensitive() {
        let mut jar = CookieJar::parse("Auth=upper");
        jar.merge_set_cookie(["auth=lower"]);
        assert_eq!(jar.get("Auth"), Some("upper"));
        assert_eq!(jar.get("auth"), Some("lower"));
    }
}
