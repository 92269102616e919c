//! Extraction of delimited fields from free-form model output
//!
//! Model prompts ask for `<tag>...</tag>` sections; this is the single
//! place that parses them back out. Case-sensitive, first match wins,
//! nested tags are not specially handled (the first closer ends the span).

use regex::RegexBuilder;

/// Extract the trimmed content of the first `<tag>...</tag>` span.
///
/// With `tag = None`, matches the first generic `<...>...</...>` span,
/// used where the tag name is fixed by the calling prompt. Returns `None`
/// when no span exists or on any internal failure; never panics.
pub fn extract_tag(text: &str, tag: Option<&str>) -> Option<String> {
    let pattern = match tag {
        Some(name) => {
            let name = regex::escape(name);
            format!("<{name}>(.*?)</{name}>")
        }
        None => "<.*?>(.*?)</.*?>".to_string(),
    };
    let re = RegexBuilder::new(&pattern)
        .dot_matches_new_line(true)
        .build()
        .ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_named_tag() {
        let text = "<result>True</result>";
        assert_eq!(extract_tag(text, Some("result")).as_deref(), Some("True"));
    }

    #[test]
    fn round_trips_with_whitespace_trimmed() {
        let text = "<priority>\n  Medium  \n</priority>";
        assert_eq!(
            extract_tag(text, Some("priority")).as_deref(),
            Some("Medium")
        );
    }

    #[test]
    fn spans_multiple_lines() {
        let text = "<acceptance_criteria>1. one\n2. two\n3. three</acceptance_criteria>";
        assert_eq!(
            extract_tag(text, Some("acceptance_criteria")).as_deref(),
            Some("1. one\n2. two\n3. three")
        );
    }

    #[test]
    fn absent_tag_returns_none() {
        assert_eq!(extract_tag("no tags here", Some("result")), None);
        assert_eq!(
            extract_tag("<other>value</other>", Some("result")),
            None
        );
    }

    #[test]
    fn generic_tag_matches_first_span() {
        let text = "preamble <result>False</result> <thought>x</thought>";
        assert_eq!(extract_tag(text, None).as_deref(), Some("False"));
    }

    #[test]
    fn first_match_wins() {
        let text = "<result>one</result><result>two</result>";
        assert_eq!(extract_tag(text, Some("result")).as_deref(), Some("one"));
    }

    #[test]
    fn unclosed_tag_is_a_miss() {
        assert_eq!(extract_tag("<result>True<result>", Some("result")), None);
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(extract_tag("<Result>True</Result>", Some("result")), None);
    }

    #[test]
    fn tag_with_regex_metacharacters_does_not_panic() {
        assert_eq!(extract_tag("<a.b>x</a.b>", Some("a.b")).as_deref(), Some("x"));
    }
}
