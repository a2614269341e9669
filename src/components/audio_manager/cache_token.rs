// Cache-busting query tokens for audio URLs.
//
// `with_cache_token` always appends the token as the last query parameter and
// `strip_cache_token` only removes a trailing one, so
// `strip_cache_token(&with_cache_token(u, t)) == u` for every `u`.

pub const CACHE_TOKEN_PARAM: &str = "v";

pub fn new_cache_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn split_fragment(url: &str) -> (&str, &str) {
    match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

pub fn with_cache_token(url: &str, token: &str) -> String {
    let (head, fragment) = split_fragment(url);
    let separator = if head.contains('?') { '&' } else { '?' };
    format!(
        "{head}{separator}{CACHE_TOKEN_PARAM}={}{fragment}",
        urlencoding::encode(token)
    )
}

pub fn strip_cache_token(url: &str) -> String {
    let (head, fragment) = split_fragment(url);
    let Some(query_start) = head.find('?') else {
        return url.to_string();
    };

    let prefix = format!("{CACHE_TOKEN_PARAM}=");
    let query = &head[query_start + 1..];
    let (kept_end, last) = match query.rfind('&') {
        Some(pos) => (query_start + 1 + pos, &query[pos + 1..]),
        // Token is the whole query: drop the `?` along with it.
        None => (query_start, query),
    };

    if !last.starts_with(&prefix) {
        return url.to_string();
    }
    format!("{}{fragment}", &head[..kept_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLS: [&str; 7] = [
        "audio/it/1.mp3",
        "audio/it/1.mp3?",
        "audio/it/1.mp3?quality=high",
        "audio/it/1.mp3?v=legacy",
        "audio/it/1.mp3#t=10",
        "https://cdn.example.org/a.mp3?x=1&y=2#frag?x",
        "",
    ];

    #[test]
    fn appends_as_last_parameter() {
        assert_eq!(with_cache_token("a.mp3", "t1"), "a.mp3?v=t1");
        assert_eq!(with_cache_token("a.mp3?q=1", "t1"), "a.mp3?q=1&v=t1");
        assert_eq!(with_cache_token("a.mp3#t=5", "t1"), "a.mp3?v=t1#t=5");
    }

    #[test]
    fn strip_inverts_with() {
        for url in URLS {
            for token in ["abc", "a&b#c", ""] {
                assert_eq!(strip_cache_token(&with_cache_token(url, token)), url, "{url} / {token}");
            }
        }
    }

    #[test]
    fn repeated_rounds_do_not_accumulate() {
        let mut url = "audio/en/2.mp3".to_string();
        for _ in 0..5 {
            let busted = with_cache_token(&url, &new_cache_token());
            url = strip_cache_token(&busted);
        }
        assert_eq!(url, "audio/en/2.mp3");
    }

    #[test]
    fn strip_leaves_other_queries_alone() {
        assert_eq!(strip_cache_token("a.mp3?q=1"), "a.mp3?q=1");
        assert_eq!(strip_cache_token("a.mp3?vv=1"), "a.mp3?vv=1");
        assert_eq!(strip_cache_token("a.mp3"), "a.mp3");
    }
}
