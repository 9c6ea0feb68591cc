use std::sync::OnceLock;

use regex::Regex;

/// Opening fence, an optional language tag (letters, digits, `+ # - _` and
/// spaces), then the shortest body up to the next fence.
fn fence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"```([a-zA-Z0-9+#\-_ ]*)([\s\S]*?)```").expect("Invalid code fence regex")
    })
}

/// Body of the first fenced code block in a block's markdown, trimmed.
/// `None` when the markdown has no complete fence.
pub fn extract_fenced_code(markdown: &str) -> Option<String> {
    let captures = fence_regex().captures(markdown)?;
    Some(captures.get(2)?.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("```js\nconst a=1;\n```", Some("const a=1;"))]
    #[case("```\nplain\n```", Some("plain"))]
    #[case("```c++\nint x;\n```", Some("int x;"))]
    #[case("```c#\nvar x;\n```", Some("var x;"))]
    #[case("```objective-c\n[x y];\n```", Some("[x y];"))]
    #[case("```shell script\nls -la\n```", Some("ls -la"))]
    #[case("```python\n\n    indented()\n\n```", Some("indented()"))]
    #[case("before ```js\na\n``` after ```js\nb\n```", Some("a"))]
    #[case("```js\nunterminated", None)]
    #[case("no fences here", None)]
    fn test_extract_fenced_code(#[case] markdown: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_fenced_code(markdown).as_deref(), expected);
    }
}
