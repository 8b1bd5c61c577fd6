//! Tokenizer for request query strings.
//!
//! Source-like parameters (`url`, `bgurl`, `clrfile`, `shpfile`) may carry
//! values with literal `&` characters, so they are terminated by the `;&`
//! sequence instead of the next `&`. Every other key uses plain `&`
//! separation.

use percent_encoding::percent_decode_str;

/// Keys whose values end at `;&` rather than `&`.
pub const DELIMITED_KEYS: [&str; 4] = ["url", "bgurl", "clrfile", "shpfile"];

/// Terminator for delimited values.
pub const VALUE_TERMINATOR: &str = ";&";

/// One `key[=value]` pair exactly as it appeared in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawParam<'a> {
    key: &'a str,
    value: Option<&'a str>,
    /// Byte span of the whole parameter, excluding its trailing separator.
    span: (usize, usize),
}

/// Parsed query string that preserves the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryString {
    raw: String,
    params: Vec<(String, Option<String>, (usize, usize))>,
}

impl QueryString {
    pub fn parse(raw: &str) -> Self {
        let params = tokenize(raw)
            .into_iter()
            .map(|p| {
                (
                    p.key.to_string(),
                    p.value.map(normalize_value),
                    p.span,
                )
            })
            .collect();

        Self {
            raw: raw.to_string(),
            params,
        }
    }

    /// The query string as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Decoded value of the first occurrence of `key`.
    ///
    /// A key given without `=` yields `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _, _)| k == key)
            .map(|(_, v, _)| v.as_deref().unwrap_or(""))
    }

    /// Decoded value of `key`, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Whether `key` appears at all, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _, _)| k == key)
    }

    /// The original query text with every occurrence of `keys` removed.
    ///
    /// Delimited values are always closed with `;` so that parameters
    /// appended after them are not swallowed into the value.
    pub fn raw_without(&self, keys: &[&str]) -> String {
        let mut out = String::with_capacity(self.raw.len() + 1);
        for (k, _, (start, end)) in &self.params {
            if keys.contains(&k.as_str()) {
                continue;
            }
            if !out.is_empty() {
                out.push('&');
            }
            let piece = &self.raw[*start..*end];
            out.push_str(piece);
            if DELIMITED_KEYS.contains(&k.as_str()) && !piece.ends_with(';') {
                out.push(';');
            }
        }
        out
    }
}

fn tokenize(raw: &str) -> Vec<RawParam<'_>> {
    let mut params = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        let rest = &raw[pos..];
        if rest.starts_with('&') {
            pos += 1;
            continue;
        }

        let key_end = rest.find(['=', '&']).unwrap_or(rest.len());
        let key = &rest[..key_end];

        if !rest[key_end..].starts_with('=') {
            params.push(RawParam {
                key,
                value: None,
                span: (pos, pos + key_end),
            });
            pos += key_end;
            continue;
        }

        let value_start = key_end + 1;
        let (value_end, next) = if DELIMITED_KEYS.contains(&key) {
            match rest[value_start..].find(VALUE_TERMINATOR) {
                Some(i) => (value_start + i, value_start + i + VALUE_TERMINATOR.len()),
                None => (rest.len(), rest.len()),
            }
        } else {
            match rest[value_start..].find('&') {
                Some(i) => (value_start + i, value_start + i + 1),
                None => (rest.len(), rest.len()),
            }
        };

        params.push(RawParam {
            key,
            value: Some(&rest[value_start..value_end]),
            span: (pos, pos + value_end),
        });
        pos += next;
    }

    params
}

/// Decodes a raw parameter value.
///
/// Percent-decodes, maps Windows backslashes to `/`, drops stray `;`
/// characters and repairs `http:/` that lost one of its slashes.
pub fn normalize_value(raw: &str) -> String {
    let mut value = percent_decode_str(raw).decode_utf8_lossy().into_owned();

    value = value.replace('\\', "/").replace(';', "");

    for scheme in ["http", "https"] {
        let broken = format!("{}:/", scheme);
        let fixed = format!("{}://", scheme);
        if value.contains(&broken) && !value.contains(&fixed) {
            value = value.replace(&broken, &fixed);
        }
    }

    value
}
