use regex::Regex;
use std::sync::OnceLock;

fn job_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // sandbox paths like /piston/jobs/<uuid>/main.cpp or /box/main.cpp
    RE.get_or_init(|| {
        Regex::new(r"(?:/piston)?/jobs/[0-9a-fA-F-]+/|/box/(?:submission/)?").unwrap()
    })
}

fn line_echo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // gcc/clang source echo: "   12 |   return x" and its "      |" gutter
    RE.get_or_init(|| Regex::new(r"^\s*\d*\s*\|").unwrap())
}

fn caret_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\s^~]*\^[\s^~]*$").unwrap())
}

/// Cleans diagnostic/output text coming back from the execution service so
/// it reads like a plain compiler or interpreter produced it: no sandbox
/// paths, no runner name, no compiler chatter the editor user cannot act
/// on.
pub fn clean(raw: &str) -> String {
    let decoded = decode_entities(raw);

    let mut lines: Vec<String> = Vec::new();
    for line in decoded.lines() {
        let line = job_path_re().replace_all(line, "").into_owned();
        if should_drop(&line) {
            continue;
        }
        lines.push(line.trim_end().to_string());
    }

    collapse_blank_runs(&mut lines);
    lines.join("\n").trim_end().to_string()
}

/// Lighter pass for program stdout: entity decoding and blank-run
/// collapsing only. The line-dropping rules are reserved for diagnostics;
/// a program that legitimately prints "  4 | x" must come through intact.
pub fn clean_output(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let mut lines: Vec<String> = decoded.lines().map(|l| l.trim_end().to_string()).collect();
    collapse_blank_runs(&mut lines);
    lines.join("\n").trim_end().to_string()
}

fn should_drop(line: &str) -> bool {
    let trimmed = line.trim_start();
    let lowered = trimmed.to_ascii_lowercase();

    // runner references that survive path stripping
    if lowered.contains("piston") {
        return true;
    }
    // compiler notes and template-instantiation chatter
    if trimmed.starts_with("note:") || lowered.contains(": note:") {
        return true;
    }
    if lowered.contains("in instantiation of")
        || lowered.contains("required from")
        || lowered.contains("template argument deduction")
    {
        return true;
    }
    // source echo and caret pointers
    if line_echo_re().is_match(line) || caret_re().is_match(line) {
        return true;
    }
    false
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn collapse_blank_runs(lines: &mut Vec<String>) {
    lines.dedup_by(|current, previous| {
        current.trim().is_empty() && previous.trim().is_empty()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_decode() {
        assert_eq!(
            clean("expected &#39;;&#39; before &lt;eof&gt; &amp;&amp; more"),
            "expected ';' before <eof> && more"
        );
    }

    #[test]
    fn sandbox_paths_are_stripped() {
        let raw = "/piston/jobs/3f2a9c1e-aaaa-bbbb-cccc-0123456789ab/main.cpp:5:1: error: expected ';'";
        assert_eq!(clean(raw), "main.cpp:5:1: error: expected ';'");

        let raw = "/box/Main.java:3: error: cannot find symbol";
        assert_eq!(clean(raw), "Main.java:3: error: cannot find symbol");
    }

    #[test]
    fn runner_references_are_dropped() {
        let raw = "main.py:1: error\nran with piston v3\n";
        assert_eq!(clean(raw), "main.py:1: error");
    }

    #[test]
    fn notes_and_template_noise_are_dropped() {
        let raw = "main.cpp:5:3: error: no matching function\n\
                   main.cpp:2:6: note: candidate function not viable\n\
                   main.cpp: In instantiation of 'void f(T) [with T = int]':\n\
                   required from here\n";
        assert_eq!(clean(raw), "main.cpp:5:3: error: no matching function");
    }

    #[test]
    fn source_echo_and_carets_are_dropped() {
        let raw = "main.cpp:4:14: error: expected ';' after expression\n\
                   \x20   4 |     int x = 1\n\
                   \x20     |              ^\n\
                   \x20     |              ;\n";
        assert_eq!(clean(raw), "main.cpp:4:14: error: expected ';' after expression");
    }

    #[test]
    fn blank_runs_collapse() {
        let raw = "first\n\n\n\nsecond\n\n";
        assert_eq!(clean(raw), "first\n\nsecond");
    }

    #[test]
    fn plain_output_passes_through() {
        assert_eq!(clean("Hello, World!\n"), "Hello, World!");
        assert_eq!(clean("line 1\nline 2"), "line 1\nline 2");
    }

    #[test]
    fn stdout_pass_keeps_pipe_shaped_lines() {
        assert_eq!(
            clean_output("| a | b |\n| 1 | 2 |\n"),
            "| a | b |\n| 1 | 2 |"
        );
        assert_eq!(clean_output("5 &lt; 7\n"), "5 < 7");
    }
}
