//! Pure composition of the three source buffers into one executable HTML
//! document. No I/O, no failure mode: any three strings produce a document.

pub const TOOLKIT_STYLESHEET_URL: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
pub const FONT_STYLESHEET_URL: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;600&display=swap";

const SHELL_TAGS: [&str; 3] = ["html", "head", "body"];

/// Composes a self-contained document: fixed CDN stylesheet references, the
/// style buffer in a single `<style>` block, the cleaned markup buffer as the
/// body, and the behavior buffer in a single trailing `<script>` block.
///
/// A literal `</script>` inside the behavior buffer is not escaped and will
/// break the assembled document; known limitation.
pub fn assemble(markup: &str, style: &str, behavior: &str) -> String {
    let body = strip_shell_tags(markup);
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <link rel=\"stylesheet\" href=\"{TOOLKIT_STYLESHEET_URL}\">\n\
         <link rel=\"stylesheet\" href=\"{FONT_STYLESHEET_URL}\">\n\
         <style>\n{style}\n</style>\n\
         </head>\n\
         <body>\n\
         {body}\n\
         <script>\n{behavior}\n</script>\n\
         </body>\n\
         </html>\n"
    )
}

/// Removes `<html>`, `<head>` and `<body>` open/close tags (attributes
/// tolerated, case-insensitive) from user markup so it nests cleanly inside
/// the assembled shell. Plain text substitution; everything else passes
/// through untouched.
fn strip_shell_tags(markup: &str) -> String {
    let mut output = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        output.push_str(&rest[..open]);
        let tail = &rest[open..];
        match shell_tag_len(tail) {
            Some(len) => rest = &tail[len..],
            None => {
                output.push('<');
                rest = &tail[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

/// If `tail` (starting at `<`) opens a shell tag, returns the byte length of
/// the whole tag including the closing `>`.
fn shell_tag_len(tail: &str) -> Option<usize> {
    let mut consumed = 1;
    let mut inner = &tail[1..];
    if let Some(stripped) = inner.strip_prefix('/') {
        inner = stripped;
        consumed += 1;
    }

    let name_len = SHELL_TAGS.iter().find_map(|name| {
        let bytes = inner.as_bytes();
        if bytes.len() >= name.len() && bytes[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            Some(name.len())
        } else {
            None
        }
    })?;

    let after = &inner[name_len..];
    match after.chars().next() {
        Some('>') => Some(consumed + name_len + 1),
        // `<body class="x">` — skip to the closing bracket, unless another
        // tag opens first (then this was never a complete tag)
        Some(ch) if ch.is_whitespace() => {
            let close = after.find('>')?;
            if after[..close].contains('<') {
                return None;
            }
            Some(consumed + name_len + close + 1)
        }
        // `<header>` and friends are not shell tags
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn empty_buffers_produce_a_minimal_shell() {
        let document = assemble("", "", "");
        assert!(document.starts_with("<!DOCTYPE html>"));
        assert_eq!(count_occurrences(&document, "<style>"), 1);
        assert_eq!(count_occurrences(&document, "<script>"), 1);
        assert!(document.contains(TOOLKIT_STYLESHEET_URL));
    }

    #[test]
    fn buffers_land_in_their_own_blocks_exactly_once() {
        let document = assemble("<p>hi</p>", "p{color:red}", "console.log(1)");
        assert_eq!(count_occurrences(&document, "<style>"), 1);
        assert_eq!(count_occurrences(&document, "<script>"), 1);
        assert!(document.contains("p{color:red}"));
        assert!(document.contains("console.log(1)"));
        assert_eq!(count_occurrences(&document, "<p>hi</p>"), 1);
    }

    #[test]
    fn user_supplied_shell_tags_are_stripped() {
        let markup = "<html><head></head><body class=\"page\"><p>hi</p></body></html>";
        let document = assemble(markup, "", "");
        let body_start = document.find("<body>").expect("shell body open tag");
        let inner = &document[body_start..];
        assert!(inner.contains("<p>hi</p>"));
        assert!(!inner.contains("class=\"page\""));
        // only the shell's own html/body tags remain
        assert_eq!(count_occurrences(&document, "<html>"), 1);
        assert_eq!(count_occurrences(&document, "<body>"), 1);
        assert_eq!(count_occurrences(&document, "<head>"), 1);
    }

    #[test]
    fn stripping_is_case_insensitive() {
        let document = assemble("<BODY><p>hi</p></BODY>", "", "");
        assert!(!document.contains("<BODY>"));
        assert!(document.contains("<p>hi</p>"));
    }

    #[test]
    fn similar_tag_names_pass_through() {
        let markup = "<header>top</header><article>text</article>";
        let document = assemble(markup, "", "");
        assert!(document.contains("<header>top</header>"));
        assert!(document.contains("<article>text</article>"));
    }

    #[test]
    fn assembly_is_total_for_hostile_input() {
        let cases = [
            ("", "", ""),
            ("<html", "</style>", "</script>"),
            ("<p>unclosed", "@import 'x';", "while(true){}"),
            ("日本語 <body> テキスト", "content: \"✓\";", "let s = '🦀';"),
            ("<<<>>>", "<", ">"),
        ];
        for (markup, style, behavior) in cases {
            let document = assemble(markup, style, behavior);
            assert!(!document.is_empty());
        }
    }

    #[test]
    fn unterminated_shell_open_tag_is_preserved() {
        // `<body ` with no closing bracket cannot be a complete tag; the text
        // passes through rather than swallowing the rest of the buffer.
        let document = assemble("<body class=broken <p>hi</p>", "", "");
        assert!(document.contains("<p>hi</p>"));
    }
}
