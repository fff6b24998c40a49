use memocat_core::{HighlightStyle, Highlighter, MemoKind, StyledSpan};

fn shell() -> Highlighter {
    Highlighter::for_kind(MemoKind::Shell).unwrap()
}

fn single_style(line: &str) -> Option<HighlightStyle> {
    let spans = shell().highlight_line(line);
    match spans.as_slice() {
        [] => None,
        [span] => {
            assert_eq!(span.start, 0);
            assert_eq!(span.end, line.len());
            Some(span.style)
        }
        other => panic!("expected at most one span for {line:?}, got {other:?}"),
    }
}

#[test]
fn plain_memos_have_no_highlighter() {
    assert!(Highlighter::for_kind(MemoKind::Plain).is_none());
}

#[test]
fn command_lines_span_the_whole_line() {
    assert_eq!(
        shell().highlight_line("$ ls -la /var/log"),
        vec![StyledSpan {
            start: 0,
            end: "$ ls -la /var/log".len(),
            style: HighlightStyle::Command,
        }]
    );
}

#[test]
fn marker_lines_map_to_their_styles() {
    assert_eq!(single_style("* Deploy checklist"), Some(HighlightStyle::Header));
    assert_eq!(single_style("- restart nginx"), Some(HighlightStyle::Subheader));
    assert_eq!(single_style("! do not run as root"), Some(HighlightStyle::Exclame));
    assert_eq!(single_style("? why does this hang"), Some(HighlightStyle::Question));
    assert_eq!(single_style("> total 48"), Some(HighlightStyle::Output));
    assert_eq!(single_style("# temporary workaround"), Some(HighlightStyle::Comment));
    assert_eq!(single_style("--verbose"), Some(HighlightStyle::CommandOption));
}

#[test]
fn leading_whitespace_is_included_in_the_span() {
    assert_eq!(single_style("   $ uptime"), Some(HighlightStyle::Command));
    assert_eq!(single_style("\t* Indented header"), Some(HighlightStyle::Header));
}

#[test]
fn markers_need_trailing_whitespace() {
    // `-item` is neither a subheader (`- item`) nor an option (`--item`).
    assert_eq!(single_style("-item"), None);
    assert_eq!(single_style("*bold*"), None);
    assert_eq!(single_style("$PATH"), None);
}

#[test]
fn comment_marker_needs_no_trailing_whitespace() {
    assert_eq!(single_style("#!/bin/sh"), Some(HighlightStyle::Comment));
}

#[test]
fn separator_wins_over_option_and_subheader() {
    // `--- cut here` matches the option rule too; the separator rule is
    // declared later and overrides it byte for byte.
    assert_eq!(single_style("---"), Some(HighlightStyle::Separator));
    assert_eq!(single_style("----------"), Some(HighlightStyle::Separator));
    assert_eq!(single_style("--- cut here ---"), Some(HighlightStyle::Separator));
}

#[test]
fn two_dashes_stay_an_option() {
    assert_eq!(single_style("--dry-run"), Some(HighlightStyle::CommandOption));
    assert_eq!(single_style("-- note"), Some(HighlightStyle::CommandOption));
}

#[test]
fn unmarked_lines_have_no_spans() {
    assert!(shell().highlight_line("just prose").is_empty());
    assert!(shell().highlight_line("").is_empty());
    assert!(shell().highlight_line("   ").is_empty());
}

#[test]
fn highlight_walks_the_document_line_by_line() {
    let text = "* Backup\n$ tar czf backup.tgz /etc\nplain trailer";
    let lines = shell().highlight(text);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0][0].style, HighlightStyle::Header);
    assert_eq!(lines[1][0].style, HighlightStyle::Command);
    assert!(lines[2].is_empty());
}

#[test]
fn spans_never_overlap() {
    for line in ["--- a ---", "  $ echo -- done", "# --opt", "> - output dash"] {
        let spans = shell().highlight_line(line);
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap in {line:?}: {spans:?}");
        }
        for span in &spans {
            assert!(span.start < span.end);
            assert!(span.end <= line.len());
        }
    }
}

#[test]
fn style_specs_carry_render_hints() {
    assert_eq!(HighlightStyle::Command.spec().color, "darkblue");
    assert!(HighlightStyle::Header.spec().bold);
    assert!(HighlightStyle::Comment.spec().italic);
    assert!(!HighlightStyle::Output.spec().bold);
}
