/// Cleanup applied to recognized text before it reaches the session
pub trait Postprocessor: Send + Sync {
    // Default: only trim
    fn process(&self, text: &str) -> String {
        text.trim().to_string()
    }
}

pub struct PlainText;
impl Postprocessor for PlainText {}

/// Vision models like to answer with LaTeX delimiters; markdown wants dollars
pub struct MarkdownMath;

impl Postprocessor for MarkdownMath {
    fn process(&self, text: &str) -> String {
        let text = replace_delimited(text, r"\[", r"\]", "$$");
        let text = replace_delimited(&text, r"\(", r"\)", "$");
        collapse_blank_lines(&text).trim().to_string()
    }
}

/// `open … close` becomes `marker…marker` with the inner text trimmed.
/// An unmatched opener is left alone.
fn replace_delimited(text: &str, open: &str, close: &str, marker: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(close) else {
            break;
        };

        out.push_str(&rest[..start]);
        out.push_str(marker);
        out.push_str(after_open[..end].trim());
        out.push_str(marker);
        rest = &after_open[end + close.len()..];
    }

    out.push_str(rest);
    out
}

/// Any whitespace run spanning three or more line breaks keeps one blank line
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();

    let flush = |run: &mut String, out: &mut String| {
        if run.matches('\n').count() >= 3 {
            let first = run.find('\n').unwrap_or(0);
            let last = run.rfind('\n').unwrap_or(run.len() - 1);
            out.push_str(&run[..first]);
            out.push_str("\n\n");
            out.push_str(&run[last + 1..]);
        } else {
            out.push_str(run);
        }
        run.clear();
    };

    for ch in text.chars() {
        if ch.is_whitespace() {
            run.push(ch);
        } else {
            flush(&mut run, &mut out);
            out.push(ch);
        }
    }
    flush(&mut run, &mut out);

    out
}
