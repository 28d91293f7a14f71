//! Textual and LaTeX presentation of search results.

use std::fmt::Write;

use chromix::{Candidate, Metric, ResultSet, Rgb};

/// The width of the horizontal rules around the table.
const RULE_WIDTH: usize = 85;

/// A swatch of the given color in LaTeX.
macro_rules! swatch {
    ($color:expr) => {
        format_args!(r"\colorbox{{{}}}{{\rule{{0pt}}{{1.5em}}\rule{{1.5em}}{{0pt}}}}", $color)
    };
}

/// The lines printed before the search starts.
pub fn header(hex: &str, bangs: usize, beam: usize, step: u8, metric: Metric) -> String {
    let metric = metric.name().to_uppercase();
    format!(
        "Target: {hex}\n\
         Config: n={bangs}, beam={beam}, step={step}\n\
         Metric: {metric} distance\n"
    )
}

/// The best candidate of each depth as a plain text table.
pub fn table(results: &ResultSet) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    _ = writeln!(out, "{rule}");
    _ = writeln!(out, "{:<3} | {:<8} | {:<22} | Expression", "k", "Diff", "Simulated RGB");
    _ = writeln!(out, "{rule}");
    for (depth, candidate) in results.iter() {
        _ = writeln!(
            out,
            "{depth:<3} | {:<8.2} | {:<22} | {}",
            candidate.gap,
            rgb(candidate),
            candidate.expr,
        );
    }
    _ = writeln!(out, "{rule}");
    out
}

/// A standalone LaTeX document comparing each candidate with the target.
pub fn latex(target: Rgb, results: &ResultSet, metric: Metric) -> String {
    let hex = target.to_hex().trim_start_matches('#').to_uppercase();
    let metric = metric.name().to_uppercase();

    let mut rows = String::new();
    for (depth, candidate) in results.iter() {
        let expr = &candidate.expr;
        _ = write!(
            rows,
            "\n    {depth} & {:.2} & \\small\\texttt{{{}}} &\n    {}%\n    {} &\n    \\small\\texttt{{{expr}}} \\\\",
            candidate.gap,
            rgb(candidate),
            swatch!("Target"),
            swatch!(expr),
        );
    }

    let mut doc = String::new();
    _ = writeln!(doc, r"\documentclass{{article}}");
    _ = writeln!(doc, r"\usepackage[dvipsnames]{{xcolor}}");
    _ = writeln!(doc, r"\usepackage[margin=1in]{{geometry}}");
    _ = writeln!(doc, r"\definecolor{{Target}}{{HTML}}{{{hex}}}");
    _ = writeln!(doc, r"\begin{{document}}");
    _ = writeln!(doc, r"\section*{{Color Matcher: \#{hex}}}");
    _ = writeln!(doc, r"\textbf{{Metric:}} {metric}");
    _ = writeln!(doc, r"\renewcommand{{\arraystretch}}{{2}}");
    _ = writeln!(doc, r"\begin{{tabular}}{{c l l l l}}");
    _ = writeln!(
        doc,
        r"    \textbf{{k}} & \textbf{{Diff}} & \textbf{{Simulated RGB}} & \textbf{{Vis}} & \textbf{{Code}} \\ \hline{rows}"
    );
    _ = writeln!(doc, r"\end{{tabular}}");
    _ = writeln!(doc, r"\end{{document}}");
    doc
}

/// The simulated color on the 0-255 scale.
fn rgb(candidate: &Candidate) -> String {
    let [r, g, b] = candidate.rgb_bytes();
    format!("({r:.1}, {g:.1}, {b:.1})")
}

#[cfg(test)]
mod tests {
    use chromix::{Cmyk, Palette, SearchConfig};

    use super::*;

    fn results(target: &str, max_bangs: usize) -> (Rgb, ResultSet) {
        let palette: Palette = [("red", Cmyk::new(0.0, 1.0, 1.0, 0.0)), ("white", Cmyk::WHITE)]
            .into_iter()
            .collect();
        let config = SearchConfig { max_bangs, step_size: 50, ..SearchConfig::default() };
        chromix::solve(target, &palette, &config).unwrap()
    }

    #[test]
    fn test_header() {
        assert_eq!(
            header("#3450a0", 2, 1000, 5, Metric::Lab),
            "Target: #3450a0\nConfig: n=2, beam=1000, step=5\nMetric: LAB distance\n"
        );
    }

    #[test]
    fn test_table() {
        let (_, results) = results("#FFFFFF", 0);
        let rule = "-".repeat(85);
        let expected = format!(
            "{rule}\n\
             k   | Diff     | Simulated RGB          | Expression\n\
             {rule}\n\
             0   | 0.00     | (255.0, 255.0, 255.0)  | white\n\
             {rule}\n"
        );
        assert_eq!(table(&results), expected);
    }

    #[test]
    fn test_table_rows_per_depth() {
        let (_, results) = results("#FF8080", 1);
        let table = table(&results);
        assert_eq!(table.lines().count(), 6);
        // `white` is closer than `red`, so its mix comes first and wins the tie.
        assert!(table.contains("1   | 0.71     | (255.0, 127.5, 127.5)  | white!50!red"));
    }

    #[test]
    fn test_latex() {
        let (target, results) = results("#ff8080", 1);
        let doc = latex(target, &results, Metric::Rgb);
        assert!(doc.starts_with("\\documentclass{article}\n"));
        assert!(doc.contains(r"\definecolor{Target}{HTML}{FF8080}"));
        assert!(doc.contains(r"\section*{Color Matcher: \#FF8080}"));
        assert!(doc.contains(r"\textbf{Metric:} RGB"));
        assert!(doc.contains(r"\colorbox{white!50!red}{\rule{0pt}{1.5em}\rule{1.5em}{0pt}}"));
        assert!(doc.contains(r"\small\texttt{white!50!red} \\"));
        assert!(doc.contains(r"1 & 0.71 & \small\texttt{(255.0, 127.5, 127.5)} &"));
        assert_eq!(doc.matches(r"\colorbox{Target}").count(), 2);
        assert!(doc.ends_with("\\end{document}\n"));
    }
}
