use crate::report::chart::format_mean;
use crate::report::*;

/// Escapes text for HTML content and attribute values.
pub fn escape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            c => res.push(c),
        }
    }
    res
}

const STYLE: &str = r#"        body { font-family: sans-serif; margin: 20px; }
        h1 { text-align: center; }
        .main-wrapper { display: flex; flex-wrap: wrap; justify-content: space-around; gap: 20px; }
        .section { width: 45%; min-width: 400px; box-sizing: border-box; padding: 10px; border: 1px solid #eee; border-radius: 8px; }
        .chart { width: 100%; margin-bottom: 20px; }
        table { border-collapse: collapse; width: 100%; font-size: 0.9em; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f2f2f2; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        h2 { text-align: center; }
        .download-links { text-align: center; margin-top: 10px; margin-bottom: 20px; }
        .download-links a { margin: 0 10px; text-decoration: none; color: #007bff; }
        .download-links a:hover { text-decoration: underline; }
"#;

pub fn section_heading(classification: Classification) -> &'static str {
    match classification {
        Classification::Core => "Core Courses (Ranked by Preference)",
        Classification::Elective => "Elective Courses (Rated 1-5)",
    }
}

/// One block of the page: chart, download links and table of a classification.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub classification: Classification,
    pub svg: String,
    pub summaries: &'a [CourseSummary],
    /// None when the data files are not written.
    pub data_file: Option<&'a str>,
    pub chart_file: &'a str,
}

/// The ranked courses of one classification as a table: Rank, Course, mean.
pub fn summary_table(classification: Classification, summaries: &[CourseSummary]) -> String {
    let mut res = String::new();
    res.push_str("<table class=\"summary\">\n  <thead>\n    <tr>\n");
    for h in ["Rank", "Course", classification.mean_label()] {
        res.push_str(&format!("      <th>{}</th>\n", h));
    }
    res.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for s in summaries {
        res.push_str("    <tr>\n");
        res.push_str(&format!("      <td>{}</td>\n", s.rank));
        res.push_str(&format!("      <td>{}</td>\n", escape(&s.course)));
        res.push_str(&format!("      <td>{}</td>\n", format_mean(s.mean)));
        res.push_str("    </tr>\n");
    }
    res.push_str("  </tbody>\n</table>");
    res
}

/// A standalone page around a chart.
pub fn chart_document(title: &str, svg: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <title>{title}</title>\n</head>\n<body>\n{svg}\n</body>\n</html>\n",
        title = escape(title),
        svg = svg
    )
}

fn render_section(section: &Section) -> String {
    let mut links: Vec<String> = Vec::new();
    if let Some(data_file) = section.data_file {
        links.push(format!(
            "<a href=\"{}\" download>Download Data (CSV)</a>",
            escape(data_file)
        ));
    }
    links.push(format!(
        "<a href=\"{}\" download>Download Chart (HTML)</a>",
        escape(section.chart_file)
    ));
    format!(
        r#"        <div class="section">
            <h2>{heading}</h2>
            <div class="chart">
{svg}
            </div>
            <div class="download-links">
                {links}
            </div>
{table}
        </div>
"#,
        heading = escape(section_heading(section.classification)),
        svg = section.svg,
        links = links.join(" |\n                "),
        table = summary_table(section.classification, section.summaries)
    )
}

/// The composite page with both charts and both tables.
pub fn render_index(title: &str, sections: &[Section]) -> String {
    let mut body = String::new();
    for section in sections {
        body.push_str(&render_section(section));
    }
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{page_title}</title>
    <style>
{style}    </style>
</head>
<body>
    <h1>{title}</h1>

    <div class="main-wrapper">
{body}    </div>
</body>
</html>
"#,
        page_title = escape(title),
        style = STYLE,
        title = escape(title),
        body = body
    )
}
