// Sanitization of untrusted display text.
//
// Server-supplied strings (welcome and chat messages) may carry HTML markup
// and terminal escape sequences. Everything that reaches the log goes
// through here first: markup is stripped with script/style subtrees dropped
// entirely, entities are decoded by the parser, then ANSI sequences and
// stray control characters are removed. Callers trim the result.

use scraper::{Html, Node};

/// Reduce an untrusted string to plain, terminal-safe text.
pub fn sanitize(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut text = String::with_capacity(input.len());
    collect_text(&fragment, &mut text);

    let stripped = strip_ansi_escapes::strip_str(&text);
    stripped
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

// Nesting depth is input-controlled; the walk keeps its own stack.
fn collect_text(fragment: &Html, out: &mut String) {
    let mut stack = vec![fragment.root_element().children()];
    while let Some(mut children) = stack.pop() {
        while let Some(child) = children.next() {
            match child.value() {
                Node::Text(t) => out.push_str(t),
                // Script and style bodies are text nodes too; never surface them.
                Node::Element(el) if matches!(el.name(), "script" | "style") => {}
                Node::Element(_) => {
                    stack.push(children);
                    children = child.children();
                }
                _ => {}
            }
        }
    }
}
