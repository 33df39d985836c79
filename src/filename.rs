use std::collections::HashSet;

pub const EXTENSION: &str = ".pdf";

/// Names longer than this are cut before the extension or any suffix is added.
pub const MAX_NAME_CHARS: usize = 100;

const UNSAFE_CHARS: &[char] = &[
    '/', '\\', '|', '?', '%', '*', ':', ';', '`', '$', '{', '}', '"', '<', '>', '\n', '\r',
];

/// Turn a user-supplied selection name into a safe `.pdf` filename.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .take(MAX_NAME_CHARS)
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if !out.to_lowercase().ends_with(EXTENSION) {
        out.push_str(EXTENSION);
    }
    out
}

/// add_suffix("file.pdf", 42) => "file 42.pdf"
fn add_suffix(filename: &str, suffix: u32) -> String {
    match filename.strip_suffix(EXTENSION) {
        Some(base) => format!("{} {}{}", base, suffix, EXTENSION),
        // Differently-cased extension such as ".PDF"
        None => format!("{}{}", filename, suffix),
    }
}

/// Output filenames already handed out within one job.
#[derive(Debug, Default)]
pub struct NameSet {
    taken: HashSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitise `name` and return a filename no earlier call has returned.
    pub fn assign(&mut self, name: &str) -> String {
        let sanitized = sanitize(name);
        let unique = if self.taken.contains(&sanitized) {
            (2..)
                .map(|n| add_suffix(&sanitized, n))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or(sanitized)
        } else {
            sanitized
        };
        self.taken.insert(unique.clone());
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_extension() {
        assert_eq!(sanitize("Chapter 1"), "Chapter 1.pdf");
        assert_eq!(sanitize("report.pdf"), "report.pdf");
        assert_eq!(sanitize("REPORT.PDF"), "REPORT.PDF");
    }

    #[test]
    fn test_replaces_unsafe_chars() {
        let name = "a/b\\c|d?e%f*g:h;i`j$k{l}m\"n<o>p\nq\rr";
        let out = sanitize(name);
        assert_eq!(out, "a_b_c_d_e_f_g_h_i_j_k_l_m_n_o_p_q_r.pdf");
        assert_eq!(out.chars().count(), name.chars().count() + EXTENSION.len());
    }

    #[test]
    fn test_keeps_quotes_and_spaces() {
        assert_eq!(sanitize("it's a test"), "it's a test.pdf");
    }

    #[test]
    fn test_truncates_before_extension() {
        let long = "x".repeat(150);
        let out = sanitize(&long);
        assert_eq!(out, format!("{}.pdf", "x".repeat(100)));
    }

    #[test]
    fn test_truncates_multibyte_by_char() {
        let long = "é".repeat(120);
        let out = sanitize(&long);
        assert_eq!(out.chars().count(), 104);
    }

    #[test]
    fn test_collisions_get_numbered() {
        let mut names = NameSet::new();
        assert_eq!(names.assign("Part"), "Part.pdf");
        assert_eq!(names.assign("Part"), "Part 2.pdf");
        assert_eq!(names.assign("Part.pdf"), "Part 3.pdf");
        assert_eq!(names.assign("Part"), "Part 4.pdf");
        assert_eq!(names.taken.len(), 4);
    }

    #[test]
    fn test_collision_skips_explicit_suffix() {
        let mut names = NameSet::new();
        assert_eq!(names.assign("a"), "a.pdf");
        assert_eq!(names.assign("a 2"), "a 2.pdf");
        assert_eq!(names.assign("a"), "a 3.pdf");
    }

    #[test]
    fn test_collision_after_sanitizing() {
        let mut names = NameSet::new();
        assert_eq!(names.assign("a/b"), "a_b.pdf");
        assert_eq!(names.assign("a:b"), "a_b 2.pdf");
    }

    #[test]
    fn test_collision_with_uppercase_extension() {
        let mut names = NameSet::new();
        assert_eq!(names.assign("X.PDF"), "X.PDF");
        assert_eq!(names.assign("X.PDF"), "X.PDF2");
    }
}
