use crate::error::JobError;

/// Ceiling on the summed page count of all selections in one job.
pub const MAX_OUTPUT_PAGES: usize = 5000;

/// A named set of pages to extract into one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    /// Strictly ascending, 1-based.
    pub pages: Vec<u32>,
}

impl Selection {
    /// Parse a pages line like "4,1,2" against the document's page count.
    ///
    /// Pages come back sorted; input order is not preserved.
    pub fn parse(name: &str, pages_line: &str, total_pages: u32) -> Result<Self, JobError> {
        let mut tokens: Vec<&str> = pages_line.split(',').collect();
        // "1,2," is [1, 2]; an empty line still yields one empty token to reject
        while tokens.len() > 1 && tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }

        let mut pages = Vec::new();
        for token in tokens {
            let page = parse_page(token, pages_line, total_pages)?;
            pages.push(page);
        }

        pages.sort_unstable();
        if let Some(w) = pages.windows(2).find(|w| w[0] == w[1]) {
            return Err(JobError::DuplicatePage {
                page: w[0],
                line: pages_line.to_string(),
            });
        }

        Ok(Selection {
            name: name.to_string(),
            pages,
        })
    }
}

fn parse_page(token: &str, line: &str, total_pages: u32) -> Result<u32, JobError> {
    // Parse wide so that "-3" or "0" is reported as out of range, not as garbage
    let value: i64 = token
        .trim()
        .parse()
        .map_err(|_| JobError::InvalidPageToken {
            token: token.to_string(),
            line: line.to_string(),
        })?;

    if value < 1 || value > i64::from(total_pages) {
        return Err(JobError::PageOutOfRange {
            page: value,
            line: line.to_string(),
            total: total_pages,
        });
    }

    Ok(value as u32)
}

/// Parse a job specification: one name line followed by one pages line per selection.
///
/// Fails if the selections would produce more than `max_output_pages` pages in total.
pub fn parse_selections(
    spec: &str,
    total_pages: u32,
    max_output_pages: usize,
) -> Result<Vec<Selection>, JobError> {
    let normalized = spec.replace("\r\n", "\n");
    let mut lines: Vec<&str> = normalized.split('\n').collect();

    // A trailing newline ends the last line rather than opening a new one
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() || lines.len() % 2 != 0 {
        return Err(JobError::MalformedSpec { lines: lines.len() });
    }

    let selections = lines
        .chunks_exact(2)
        .map(|pair| Selection::parse(pair[0], pair[1], total_pages))
        .collect::<Result<Vec<_>, _>>()?;

    let total: usize = selections.iter().map(|s| s.pages.len()).sum();
    if total > max_output_pages {
        return Err(JobError::OutputLimitExceeded {
            total,
            limit: max_output_pages,
        });
    }

    Ok(selections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_selections() {
        let sels = parse_selections("A\n1,2\nB\n3\n", 3, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(
            sels,
            vec![
                Selection {
                    name: "A".to_string(),
                    pages: vec![1, 2]
                },
                Selection {
                    name: "B".to_string(),
                    pages: vec![3]
                },
            ]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let sels = parse_selections("Intro\r\n1\r\nRest\r\n2,3\r\n", 3, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(sels.len(), 2);
        assert_eq!(sels[0].name, "Intro");
        assert_eq!(sels[1].pages, vec![2, 3]);
    }

    #[test]
    fn test_selection_count_is_half_line_count() {
        let spec = (1..=10)
            .map(|i| format!("part {}\n{}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let sels = parse_selections(&spec, 10, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(sels.len(), 10);
    }

    #[test]
    fn test_pages_are_sorted() {
        let sels = parse_selections("x\n9,3,5,1", 10, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(sels[0].pages, vec![1, 3, 5, 9]);
    }

    #[test]
    fn test_odd_line_count() {
        let err = parse_selections("A\n1,2\nB", 3, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(err, JobError::MalformedSpec { lines: 3 }));
    }

    #[test]
    fn test_empty_spec() {
        assert!(matches!(
            parse_selections("", 3, MAX_OUTPUT_PAGES).unwrap_err(),
            JobError::MalformedSpec { lines: 0 }
        ));
        assert!(matches!(
            parse_selections("\n\n", 3, MAX_OUTPUT_PAGES).unwrap_err(),
            JobError::MalformedSpec { .. }
        ));
    }

    #[test]
    fn test_invalid_token() {
        let err = parse_selections("A\n1,two,3", 5, MAX_OUTPUT_PAGES).unwrap_err();
        match err {
            JobError::InvalidPageToken { token, line } => {
                assert_eq!(token, "two");
                assert_eq!(line, "1,two,3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_pages_line() {
        let err = parse_selections("A\n", 5, MAX_OUTPUT_PAGES).unwrap_err();
        // "A\n" is a single line once the trailing newline is dropped
        assert!(matches!(err, JobError::MalformedSpec { lines: 1 }));

        let err = parse_selections("A\n\nB\n1", 5, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(err, JobError::InvalidPageToken { .. }));
    }

    #[test]
    fn test_page_out_of_range() {
        let err = parse_selections("A\n5", 3, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(
            err,
            JobError::PageOutOfRange {
                page: 5,
                total: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_and_negative_pages() {
        assert!(matches!(
            parse_selections("A\n0", 3, MAX_OUTPUT_PAGES).unwrap_err(),
            JobError::PageOutOfRange { page: 0, .. }
        ));
        assert!(matches!(
            parse_selections("A\n-2", 3, MAX_OUTPUT_PAGES).unwrap_err(),
            JobError::PageOutOfRange { page: -2, .. }
        ));
    }

    #[test]
    fn test_duplicate_page() {
        let err = parse_selections("A\n2,1,2", 3, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(err, JobError::DuplicatePage { page: 2, .. }));
    }

    #[test]
    fn test_output_limit() {
        let all: Vec<String> = (1..=2500).map(|p| p.to_string()).collect();
        let line = all.join(",");
        let ok = format!("a\n{line}\nb\n{line}");
        assert_eq!(parse_selections(&ok, 2500, MAX_OUTPUT_PAGES).unwrap().len(), 2);

        let too_many = format!("a\n{line}\nb\n{line}\nc\n1");
        let err = parse_selections(&too_many, 2500, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(
            err,
            JobError::OutputLimitExceeded {
                total: 5001,
                limit: MAX_OUTPUT_PAGES
            }
        ));
    }

    #[test]
    fn test_trailing_comma() {
        let sels = parse_selections("A\n1,2,\nB\n3,,", 3, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(sels[0].pages, vec![1, 2]);
        assert_eq!(sels[1].pages, vec![3]);

        let err = parse_selections("A\n1,,2", 3, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(err, JobError::InvalidPageToken { ref token, .. } if token.is_empty()));

        let err = parse_selections("A\n,", 3, MAX_OUTPUT_PAGES).unwrap_err();
        assert!(matches!(err, JobError::InvalidPageToken { ref token, .. } if token.is_empty()));
    }

    #[test]
    fn test_whitespace_around_tokens() {
        let sels = parse_selections("A\n 1, 2 ", 3, MAX_OUTPUT_PAGES).unwrap();
        assert_eq!(sels[0].pages, vec![1, 2]);
    }
}
