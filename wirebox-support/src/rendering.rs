//! Text rendering for wiring diagnostics.
//!
//! Turns type names, value keys and build generations into the short,
//! readable fragments used by error messages and build reports.

/// Joins names into a single comma-separated line.
///
/// # Examples
/// ```
/// use wirebox_support::rendering::render_list;
///
/// assert_eq!(render_list(&["SmsClient", "PushClient"]), "SmsClient, PushClient");
/// assert_eq!(render_list::<&str>(&[]), "");
/// ```
pub fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders build generations top to bottom, one line per generation.
///
/// ```text
/// [generation 1] RepositoryStubImpl, SmsClient
///                ↓
/// [generation 2] Service
/// ```
pub fn render_generations(generations: &[Vec<String>]) -> String {
    let mut out = String::new();
    let width = generations.len().to_string().len();

    for (index, members) in generations.iter().enumerate() {
        if index > 0 {
            // "[generation " is 12 characters wide
            out.push_str(&" ".repeat(12 + width + 2));
            out.push_str("↓\n");
        }
        out.push_str(&format!(
            "[generation {:>width$}] {}\n",
            index + 1,
            render_list(members),
            width = width,
        ));
    }

    out
}

/// Drops module paths from a fully qualified type name.
///
/// Every path segment is shortened, including those inside generics,
/// tuples, slices, references and `dyn` bounds: a new segment starts after
/// any of `< > , ( ) [ ] & ;` or a space.
///
/// ```
/// use wirebox_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::clients::SmsClient"), "SmsClient");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::store::Repository>"),
///     "Arc<dyn Repository>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&segment);
                out.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    out.push_str(&segment);
    out
}

/// Picks up to `limit` candidates that look like `requested`.
///
/// Used to attach "did you mean?" hints to unresolved parameters. Candidates
/// are compared both as given and with their module paths dropped.
pub fn suggest_similar(requested: &str, candidates: &[&str], limit: usize) -> Vec<String> {
    let wanted = requested.to_lowercase();
    let wanted_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = candidates
        .iter()
        .filter(|candidate| **candidate != requested)
        .filter_map(|&candidate| {
            let full = candidate.to_lowercase();
            let short = shorten_type_name(candidate).to_lowercase();

            if full.contains(&wanted) || wanted.contains(&full) {
                return Some((candidate, 100));
            }
            let short_match = short.contains(&wanted_short) || wanted_short.contains(&short);
            if !short.is_empty() && short_match {
                return Some((candidate, 80));
            }

            let prefix = short
                .chars()
                .zip(wanted_short.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (prefix >= 3).then_some((candidate, prefix * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(limit)
        .map(|(candidate, _)| candidate.to_string())
        .collect()
}
