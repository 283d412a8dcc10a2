//! Text transformation steps.
//!
//! Each cleanup rule applied to titles and bodies lives here as a named,
//! separately testable function. [`BodyConverter`] chains the body steps
//! in the order the pipeline applies them.

use memchr::{memchr, memmem};
use once_cell::sync::Lazy;
use regex::Regex;

/// `<script>` and `<style>` elements, content included.
static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("script/style pattern is valid")
});

/// Whitespace followed by a run of `x`.
///
/// The release-note exports carry stray ` x`/` xx` tokens where checkbox
/// and bullet glyphs were flattened. Only the export artifact is targeted;
/// words that start with `x` after a space get truncated too.
static X_ARTIFACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\sx+").expect("artifact pattern is valid"));

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W+").expect("non-word pattern is valid"));

static UNDERSCORE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));

/// Tags that separate words when rendered. Removing them leaves a space.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// How a record title is turned into a file base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleStyle {
    /// Remove every whitespace character: `"Q3 Update"` -> `"Q3Update"`.
    #[default]
    Compact,
    /// Snake-case with non-word characters folded: `"Q3 Update!"` -> `"Q3_Update"`.
    Snake,
}

/// Sanitizes a title into a file base name.
///
/// May return an empty string; callers pick a fallback name in that case.
#[must_use]
pub fn sanitize_title(title: &str, style: TitleStyle) -> String {
    match style {
        TitleStyle::Compact => remove_whitespace(title),
        TitleStyle::Snake => {
            let folded = NON_WORD_RE.replace_all(title, "_");
            let collapsed = UNDERSCORE_RUN_RE.replace_all(&folded, "_");
            collapsed.trim_matches('_').to_string()
        }
    }
}

/// Removes every whitespace character.
#[must_use]
pub fn remove_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses whitespace runs to a single space and trims both ends.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    let mut normalized = String::with_capacity(s.len());
    for segment in s.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Strips HTML markup, returning whitespace-normalized plain text.
///
/// `<script>` and `<style>` elements are dropped with their content. Block
/// level tags become a space so adjacent paragraphs don't run together;
/// inline tags vanish. A `<` that doesn't open a tag is kept as text.
/// A `>` inside a quoted attribute value or a `<!-- -->` comment doesn't
/// end the tag. Entities are left as written.
#[must_use]
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let without_scripts = SCRIPT_STYLE_RE.replace_all(html, " ");
    let input = without_scripts.as_ref();
    let bytes = input.as_bytes();

    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(rel) = memchr(b'<', &bytes[pos..]) {
        let open = pos + rel;
        out.push_str(&input[pos..open]);

        let Some(close) = tag_end(bytes, open) else {
            out.push('<');
            pos = open + 1;
            continue;
        };

        if is_block_tag(&input[open + 1..close]) {
            out.push(' ');
        }
        pos = close + 1;
    }
    out.push_str(&input[pos..]);

    collapse_whitespace(&out)
}

/// Removes every whitespace-plus-`x`-run artifact.
///
/// `"foo x bar xx baz"` -> `"foo bar baz"`.
#[must_use]
pub fn remove_x_artifacts(text: &str) -> String {
    X_ARTIFACT_RE.replace_all(text, "").into_owned()
}

/// Returns the index of the `>` closing a tag opened at `open`, if the
/// `<` actually starts one.
///
/// Comments end at `-->`. Elsewhere a quote right after `=` opens an
/// attribute value that runs to the matching quote. An unterminated
/// comment or value falls back to the first `>`.
fn tag_end(bytes: &[u8], open: usize) -> Option<usize> {
    let next = *bytes.get(open + 1)?;
    if !(next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?')) {
        return None;
    }

    if bytes[open..].starts_with(b"<!--") {
        if let Some(rel) = memmem::find(&bytes[open + 4..], b"-->") {
            return Some(open + 4 + rel + 2);
        }
    }

    let mut quote = None;
    let mut after_eq = false;
    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => continue,
            None => match b {
                b'>' => return Some(i),
                b'"' | b'\'' if after_eq => {
                    quote = Some(b);
                    continue;
                }
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_eq = b == b'=';
        }
    }

    memchr(b'>', &bytes[open + 1..]).map(|rel| open + 1 + rel)
}

fn is_block_tag(inner: &str) -> bool {
    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BLOCK_TAGS.contains(&name.as_str())
}

/// Converts an HTML body into the text written to disk.
#[derive(Debug, Clone, Copy)]
pub struct BodyConverter {
    remove_artifacts: bool,
}

impl Default for BodyConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BodyConverter {
    /// Creates a converter; `remove_artifacts` toggles the `\sx+` cleanup.
    #[must_use]
    pub const fn new(remove_artifacts: bool) -> Self {
        Self { remove_artifacts }
    }

    /// Strips markup, then applies artifact cleanup when enabled.
    #[must_use]
    pub fn convert(&self, html: &str) -> String {
        let stripped = strip_html(html);
        if self.remove_artifacts {
            remove_x_artifacts(&stripped)
        } else {
            stripped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_title_removes_all_whitespace() {
        assert_eq!(sanitize_title("Hello World", TitleStyle::Compact), "HelloWorld");
        assert_eq!(sanitize_title("Q3 Update", TitleStyle::Compact), "Q3Update");
        assert_eq!(
            sanitize_title("  Spring \t Release\n  Notes ", TitleStyle::Compact),
            "SpringReleaseNotes"
        );
    }

    #[test]
    fn test_compact_title_keeps_punctuation() {
        assert_eq!(sanitize_title("v2.1 (beta)", TitleStyle::Compact), "v2.1(beta)");
        assert_eq!(sanitize_title("a / b", TitleStyle::Compact), "a/b");
    }

    #[test]
    fn test_snake_title() {
        assert_eq!(sanitize_title("CLI Test Note", TitleStyle::Snake), "CLI_Test_Note");
        assert_eq!(sanitize_title("  Fix: login -- page! ", TitleStyle::Snake), "Fix_login_page");
        assert_eq!(sanitize_title("a / b", TitleStyle::Snake), "a_b");
    }

    #[test]
    fn test_title_can_sanitize_to_empty() {
        assert_eq!(sanitize_title("   ", TitleStyle::Compact), "");
        assert_eq!(sanitize_title("?!", TitleStyle::Snake), "");
    }

    #[test]
    fn test_strip_html_basic() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_html("<p>Test</p>"), "Test");
        assert_eq!(
            strip_html("<div><p>Test <strong>bold</strong></p></div>"),
            "Test bold"
        );
    }

    #[test]
    fn test_strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<p>Test    with \n  spaces</p>"), "Test with spaces");
    }

    #[test]
    fn test_strip_html_inline_tags_do_not_split_words() {
        assert_eq!(strip_html("un<em>believ</em>able"), "unbelievable");
    }

    #[test]
    fn test_strip_html_block_tags_separate_words() {
        assert_eq!(strip_html("<p>one</p><p>two</p>"), "one two");
        assert_eq!(strip_html("line<br/>break"), "line break");
        assert_eq!(strip_html("<ul><li>a</li><li>b</li></ul>"), "a b");
    }

    #[test]
    fn test_strip_html_drops_script_and_style() {
        let html = "<style>p { color: red; }</style><p>Body</p><SCRIPT>alert(1)</SCRIPT>";
        assert_eq!(strip_html(html), "Body");
    }

    #[test]
    fn test_strip_html_keeps_bare_angle_brackets() {
        assert_eq!(strip_html("<p>a < b and 3 <5</p>"), "a < b and 3 <5");
    }

    #[test]
    fn test_strip_html_attributes_and_comments() {
        let html = r#"<!-- note --><a href="https://example.com" class="x">link</a>"#;
        assert_eq!(strip_html(html), "link");
    }

    #[test]
    fn test_strip_html_gt_inside_attribute_values() {
        assert_eq!(strip_html(r#"<a title="a>b">x</a>"#), "x");
        assert_eq!(strip_html("<p class='q>'>y</p>"), "y");
        assert_eq!(strip_html(r#"<img alt = "1 > 0">z"#), "z");
    }

    #[test]
    fn test_strip_html_gt_inside_comment() {
        assert_eq!(strip_html("<!-- a > b -->text"), "text");
        assert_eq!(strip_html("<p>one</p><!-- <p>x</p> --><p>two</p>"), "one two");
    }

    #[test]
    fn test_strip_html_unterminated_quote_ends_at_first_gt() {
        assert_eq!(strip_html(r#"<a title="open>rest"#), "rest");
        assert_eq!(strip_html("<b>it's</b> fine"), "it's fine");
    }

    #[test]
    fn test_strip_html_plain_and_empty() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("no markup"), "no markup");
    }

    #[test]
    fn test_remove_x_artifacts_all_occurrences() {
        assert_eq!(remove_x_artifacts("foo x bar xx baz"), "foo bar baz");
        assert_eq!(remove_x_artifacts("done xxx"), "done");
    }

    #[test]
    fn test_remove_x_artifacts_needs_leading_whitespace() {
        assert_eq!(remove_x_artifacts("xylophone box"), "xylophone box");
        assert_eq!(remove_x_artifacts("a\txx b"), "a b");
    }

    #[test]
    fn test_body_converter() {
        let converter = BodyConverter::default();
        assert_eq!(
            converter.convert("<p>Fixed login x</p><p>Faster sync xx</p>"),
            "Fixed login Faster sync"
        );

        let keep = BodyConverter::new(false);
        assert_eq!(keep.convert("<p>foo x bar</p>"), "foo x bar");
    }
}
