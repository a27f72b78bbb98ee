//! Glob patterns for key and field scans: `*`, `?`, `[abc]`, `[a-z]`, `[^a]`
//! and `\` escapes.

/// Match `text` against an optional pattern; no pattern matches everything
pub(crate) fn matches(pattern: Option<&str>, text: &str) -> bool {
    match pattern {
        None => true,
        Some(pattern) => glob_match(pattern.as_bytes(), text.as_bytes()),
    }
}

fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern, text) {
        ([], []) => true,
        ([], _) => false,
        ([b'*', rest @ ..], _) => {
            glob_match(rest, text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        (_, []) => false,
        ([b'?', p_rest @ ..], [_, t_rest @ ..]) => glob_match(p_rest, t_rest),
        ([b'\\', escaped, p_rest @ ..], [ch, t_rest @ ..]) => {
            escaped == ch && glob_match(p_rest, t_rest)
        }
        ([b'[', p_rest @ ..], [ch, t_rest @ ..]) => match p_rest.iter().position(|&b| b == b']') {
            None => *ch == b'[' && glob_match(p_rest, t_rest),
            Some(end) => {
                class_match(&p_rest[..end], *ch) && glob_match(&p_rest[end + 1..], t_rest)
            }
        },
        ([p, p_rest @ ..], [t, t_rest @ ..]) => p == t && glob_match(p_rest, t_rest),
    }
}

fn class_match(class: &[u8], ch: u8) -> bool {
    let (negate, class) = match class {
        [b'^' | b'!', rest @ ..] => (true, rest),
        _ => (false, class),
    };
    let mut found = false;
    let mut rest = class;
    while let Some((&first, tail)) = rest.split_first() {
        match tail {
            [b'-', last, after @ ..] => {
                found |= (first..=*last).contains(&ch);
                rest = after;
            }
            _ => {
                found |= first == ch;
                rest = tail;
            }
        }
    }
    found != negate
}

/// One page of a cursor scan over `items`. The cursor is the position of
/// the next item to examine; `page_size` items are examined per call and
/// the returned cursor is `0` once the scan is complete.
pub(crate) fn scan_page<T: Clone>(
    items: &[T],
    text: impl Fn(&T) -> &str,
    pattern: Option<&str>,
    cursor: u64,
    page_size: usize,
) -> (u64, Vec<T>) {
    let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(page_size.max(1)).min(items.len());
    let page = items[start..end]
        .iter()
        .filter(|item| matches(pattern, text(*item)))
        .cloned()
        .collect();
    let next = if end >= items.len() { 0 } else { end as u64 };
    (next, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(matches(Some("user:*"), "user:1"));
        assert!(matches(Some("user:*"), "user:"));
        assert!(!matches(Some("user:*"), "users"));
        assert!(matches(Some("h?llo"), "hello"));
        assert!(!matches(Some("h?llo"), "hllo"));
        assert!(matches(None, "anything"));
    }

    #[test]
    fn test_classes_and_escapes() {
        assert!(matches(Some("h[ae]llo"), "hallo"));
        assert!(!matches(Some("h[ae]llo"), "hillo"));
        assert!(matches(Some("h[a-c]llo"), "hbllo"));
        assert!(matches(Some("h[^e]llo"), "hallo"));
        assert!(!matches(Some("h[^e]llo"), "hello"));
        assert!(matches(Some("a\\*b"), "a*b"));
        assert!(!matches(Some("a\\*b"), "axb"));
    }

    #[test]
    fn test_scan_pages_until_cursor_wraps() {
        let items: Vec<String> = (0..5).map(|i| format!("k{}", i)).collect();
        let (cursor, first) = scan_page(&items, |s| s.as_str(), None, 0, 2);
        assert_eq!((cursor, first.len()), (2, 2));
        let (cursor, second) = scan_page(&items, |s| s.as_str(), None, cursor, 2);
        assert_eq!((cursor, second.len()), (4, 2));
        let (cursor, last) = scan_page(&items, |s| s.as_str(), Some("k4"), cursor, 2);
        assert_eq!(cursor, 0);
        assert_eq!(last, vec!["k4".to_string()]);
    }
}
