//! Named placeholder substitution for prompt templates.
//!
//! Placeholders are written `{name}`; `{{` and `}}` produce literal braces.

/// Replace every known `{name}` placeholder with the value `lookup` returns.
///
/// Placeholders `lookup` does not know are kept verbatim, so a template
/// written for a newer set of placeholders still renders.
pub fn fill_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        match placeholder_name(tail) {
            Some(name) => {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        tracing::warn!(placeholder = name, "Unknown prompt placeholder");
                        out.push_str(&tail[..name.len() + 2]);
                    }
                }
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// The identifier of a placeholder starting at `text`, which begins with `{`.
fn placeholder_name(text: &str) -> Option<&str> {
    let end = text.find('}')?;
    let name = &text[1..end];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}
