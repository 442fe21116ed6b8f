//! Assembling the rewritten file
//!
//! Fixed logical lines are written back one statement at a time. A statement
//! on a single row is re-emitted from its fixed logical text with the masked
//! string literals put back; statements spanning several rows keep their
//! physical rows (after physical fixes) untouched.

use crate::parser::{mute_string, LogicalLine};

/// Put masked string literals back into fixed logical text.
///
/// Each literal is searched in masked form from where the previous one ended.
/// Returns `None` when a literal can no longer be found, e.g. because a fix
/// rewrote it.
#[must_use]
pub fn restore_strings(text: &str, originals: &[String]) -> Option<String> {
    let mut restored = text.to_string();
    let mut from = 0;
    for original in originals {
        let masked = mute_string(original);
        let found = from + restored.get(from..)?.find(&masked)?;
        restored.replace_range(found..found + masked.len(), original);
        from = found + original.len();
    }
    Some(restored)
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Append a standalone comment line preceded by its blank lines
pub fn write_comment(output: &mut String, blank_lines: usize, comment: &str) {
    push_blank_lines(output, blank_lines);
    output.push_str(comment);
    output.push('\n');
}

/// Apply a corrected blank-line count to a statement and the standalone
/// comments buffered in front of it; returns the statement's own count.
///
/// No group of blank lines may exceed `target`. When the widest group sits
/// in front of a comment, that group is set to `target` and the statement
/// keeps at most its own count.
pub fn fit_blank_lines(comments: &mut [(usize, String)], own: usize, target: usize) -> usize {
    let widest = comments
        .iter()
        .enumerate()
        .max_by_key(|(_, (blank_lines, _))| *blank_lines)
        .map(|(index, (blank_lines, _))| (index, *blank_lines));
    for (blank_lines, _) in comments.iter_mut() {
        *blank_lines = (*blank_lines).min(target);
    }
    match widest {
        Some((index, blank_lines)) if blank_lines > own => {
            comments[index].0 = target;
            own.min(target)
        }
        _ => target,
    }
}

/// Append one statement preceded by `blank_lines` empty lines
pub fn write_logical(
    output: &mut String,
    logical: &LogicalLine,
    text: &str,
    blank_lines: usize,
    fixed_lines: &[String],
) {
    push_blank_lines(output, blank_lines);
    let rows = logical.first_row.saturating_sub(1)..logical.last_row.min(fixed_lines.len());
    if logical.is_single_row() {
        let row = fixed_lines.get(rows.start).map_or("", String::as_str);
        if let Some(restored) = restore_strings(text, &logical.masked_strings) {
            output.push_str(leading_whitespace(row));
            output.push_str(&restored);
            if let Some(comment) = &logical.comment {
                output.push_str(comment.trim_end());
            }
            output.push('\n');
            return;
        }
    }
    for line in fixed_lines.get(rows).unwrap_or_default() {
        output.push_str(line);
    }
}

fn push_blank_lines(output: &mut String, count: usize) {
    for _ in 0..count {
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_restore_strings_in_order() {
        let restored = restore_strings("f('xxx', 'x')", &strings(&["'a,b'", "'c'"]));
        assert_eq!(restored.as_deref(), Some("f('a,b', 'c')"));
    }

    #[test]
    fn test_restore_same_mask_twice() {
        let restored = restore_strings("x = 'xx' + 'xx'", &strings(&["'ab'", "'cd'"]));
        assert_eq!(restored.as_deref(), Some("x = 'ab' + 'cd'"));
    }

    #[test]
    fn test_restore_fails_when_literal_is_gone() {
        assert!(restore_strings("x = 1", &strings(&["'ab'"])).is_none());
    }

    #[test]
    fn test_write_single_row_with_comment() {
        let logical = LogicalLine {
            text: "x=1".to_string(),
            comment: Some("  # note  ".to_string()),
            first_row: 1,
            last_row: 1,
            ..LogicalLine::default()
        };
        let mut output = String::new();
        write_logical(&mut output, &logical, "x = 1", 2, &strings(&["    x=1  # note\n"]));
        assert_eq!(output, "\n\n    x = 1  # note\n");
    }

    #[test]
    fn test_write_multi_row_keeps_physical_lines() {
        let logical = LogicalLine {
            text: "y = [1, 2]".to_string(),
            first_row: 2,
            last_row: 3,
            ..LogicalLine::default()
        };
        let lines = strings(&["pass\n", "y = [1,\n", "     2]\n"]);
        let mut output = String::new();
        write_logical(&mut output, &logical, "y = [1, 2]", 0, &lines);
        assert_eq!(output, "y = [1,\n     2]\n");
    }

    #[test]
    fn test_fit_blank_lines_before_comment() {
        let mut comments = vec![(3, "# c".to_string())];
        assert_eq!(fit_blank_lines(&mut comments, 0, 2), 0);
        assert_eq!(comments[0].0, 2);

        let mut comments = vec![(1, "# c".to_string())];
        assert_eq!(fit_blank_lines(&mut comments, 0, 2), 0);
        assert_eq!(comments[0].0, 2);
    }

    #[test]
    fn test_fit_blank_lines_after_comment() {
        let mut comments = vec![(0, "# c".to_string())];
        assert_eq!(fit_blank_lines(&mut comments, 0, 2), 2);
        assert_eq!(comments[0].0, 0);

        let mut comments = vec![(3, "# a".to_string()), (0, "# b".to_string())];
        assert_eq!(fit_blank_lines(&mut comments, 4, 2), 2);
        assert_eq!(comments[0].0, 2);
        assert_eq!(fit_blank_lines(&mut [], 3, 0), 0);
    }

    #[test]
    fn test_write_comment() {
        let mut output = String::new();
        write_comment(&mut output, 1, "# hello");
        assert_eq!(output, "\n# hello\n");
    }
}
