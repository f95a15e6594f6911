//! Name normalisation shared by relation extraction and node resolution.

/// Prefix applied to unqualified dependency names.
pub const SPEC_PREFIX: &str = "spec_";

/// Normalise a free-form name into an identifier slug.
///
/// Lower-cases, maps hyphens, spaces, dots and slashes to underscores, drops every other
/// character outside `[a-z0-9_]`, collapses runs of underscores and trims them from both ends.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_underscore = true;

    for ch in input.trim().chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => Some(ch),
            '_' | '-' | ' ' | '.' | '/' | '\t' => Some('_'),
            _ => None,
        };
        match mapped {
            Some('_') => {
                if !last_underscore {
                    out.push('_');
                    last_underscore = true;
                }
            }
            Some(c) => {
                out.push(c);
                last_underscore = false;
            }
            None => {}
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Candidate target id for a name found in a Dependencies/Consumers table.
///
/// Names without subsystem qualification (no underscore after slugging) are assumed to
/// name spec documents and receive the `spec_` prefix.
#[must_use]
pub fn table_target_id(name: &str) -> Option<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return None;
    }
    if slug.contains('_') {
        Some(slug)
    } else {
        Some(format!("{SPEC_PREFIX}{slug}"))
    }
}

/// Slug of the last path segment with its extension and `#fragment` removed.
///
/// `templates/feature-spec.md` -> `feature_spec`, `prd.md#feat_ref_auth` -> `prd`.
#[must_use]
pub fn basename_slug(path_or_id: &str) -> String {
    let without_fragment = path_or_id.split('#').next().unwrap_or_default();
    let last = without_fragment
        .rsplit('/')
        .next()
        .unwrap_or(without_fragment);
    let stem = last.strip_suffix(".md").unwrap_or(last);
    slugify(stem)
}
