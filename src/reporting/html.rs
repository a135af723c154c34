//! # HTML Reporting Module / HTML 报告模块
//!
//! The default `ResultWriter`: renders a merged artifact into a detailed
//! log page and, for the combined variant, a statistics report page. Pages
//! are assembled as plain strings with an embedded style sheet.
//!
//! 默认的 `ResultWriter`：将合并后的产物渲染为详细的日志页面，
//! 以及（组合变体下的）统计报告页面。页面以纯字符串拼装，
//! 并内嵌样式表。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::infra::t;
use crate::reporting::model::{ReportOptions, ResultStore, ResultTree, ResultWriter};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Renders reports by loading the artifact back through a `ResultStore`.
pub struct HtmlResultWriter<S: ResultStore> {
    store: S,
}

impl<S: ResultStore> HtmlResultWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ResultStore> ResultWriter for HtmlResultWriter<S> {
    fn write_report(
        &self,
        artifact: &Path,
        outputdir: &Path,
        options: &ReportOptions,
    ) -> Result<()> {
        let tree = self.store.load(artifact)?;

        let log_path = outputdir.join(&options.log_name);
        fs::write(&log_path, render_log(&tree))
            .with_context(|| format!("cannot write {}", log_path.display()))?;

        if let Some(report_name) = &options.report_name {
            let report_path = outputdir.join(report_name);
            fs::write(&report_path, render_report(&tree, options.suite_stat_level))
                .with_context(|| format!("cannot write {}", report_path.display()))?;
        }
        Ok(())
    }
}

fn page_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
        escape(title),
        HTML_STYLE
    )
}

fn page_foot() -> String {
    format!(
        "<footer>{}</footer></body></html>",
        t!(
            "html_report.generated_at",
            time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    )
}

fn summary_block(tree: &ResultTree) -> String {
    let total = tree.test_count();
    let passed = tree.passed_count();
    let failed = tree.failed_count();
    format!(
        "<div class='summary-container'>\
         <div class='summary-item'><span class='count'>{}</span><span class='label'>{}</span></div>\
         <div class='summary-item'><span class='count passed-text'>{}</span><span class='label'>{}</span></div>\
         <div class='summary-item'><span class='count failed-text'>{}</span><span class='label'>{}</span></div>\
         </div>",
        total,
        t!("html_report.summary_total"),
        passed,
        t!("html_report.summary_passed"),
        failed,
        t!("html_report.summary_failed"),
    )
}

/// The detailed log page: the full tree as nested disclosure sections with
/// one table of test cases per suite.
fn render_log(tree: &ResultTree) -> String {
    let mut html = page_head(&t!("html_report.log_title", name = tree.name));
    html.push_str(&format!("<h1>{}</h1>", escape(&tree.name)));
    html.push_str(&summary_block(tree));
    for suite in &tree.suites {
        render_suite(&mut html, suite);
    }
    if !tree.tests.is_empty() {
        html.push_str(&tests_table(tree));
    }
    html.push_str(&page_foot());
    html
}

fn render_suite(html: &mut String, suite: &ResultTree) {
    html.push_str(&format!(
        "<details open><summary>{} ({}/{})</summary>",
        escape(&suite.name),
        suite.passed_count(),
        suite.test_count()
    ));
    for child in &suite.suites {
        render_suite(html, child);
    }
    if !suite.tests.is_empty() {
        html.push_str(&tests_table(suite));
    }
    html.push_str("</details>");
}

fn tests_table(suite: &ResultTree) -> String {
    let mut table = format!(
        "<table><tr><th>{}</th><th>{}</th><th>{}</th></tr>",
        t!("html_report.column_test"),
        t!("html_report.column_status"),
        t!("html_report.column_message"),
    );
    for test in &suite.tests {
        let (class, label) = if test.passed {
            ("status-pass", t!("html_report.status_pass"))
        } else {
            ("status-fail", t!("html_report.status_fail"))
        };
        table.push_str(&format!(
            "<tr><td>{}</td><td class='{}'>{}</td><td class='message'>{}</td></tr>",
            escape(&test.name),
            class,
            label,
            escape(test.message.as_deref().unwrap_or_default()),
        ));
    }
    table.push_str("</table>");
    table
}

/// The statistics report page: aggregate counts per suite down to the
/// configured depth. Depth only changes what is shown, never what was
/// merged.
fn render_report(tree: &ResultTree, suite_stat_level: usize) -> String {
    let mut html = page_head(&t!("html_report.report_title", name = tree.name));
    html.push_str(&format!("<h1>{}</h1>", escape(&tree.name)));
    html.push_str(&summary_block(tree));
    html.push_str(&format!(
        "<h2>{}</h2><table><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>",
        t!("html_report.statistics_header"),
        t!("html_report.column_suite"),
        t!("html_report.summary_total"),
        t!("html_report.summary_passed"),
        t!("html_report.summary_failed"),
    ));
    for suite in &tree.suites {
        statistics_rows(&mut html, suite, &tree.name, 1, suite_stat_level);
    }
    html.push_str("</table>");
    html.push_str(&page_foot());
    html
}

fn statistics_rows(
    html: &mut String,
    suite: &ResultTree,
    prefix: &str,
    depth: usize,
    max_depth: usize,
) {
    if depth > max_depth {
        return;
    }
    let qualified = format!("{}.{}", prefix, suite.name);
    html.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td class='passed-text'>{}</td><td class='failed-text'>{}</td></tr>",
        escape(&qualified),
        suite.test_count(),
        suite.passed_count(),
        suite.failed_count(),
    ));
    for child in &suite.suites {
        statistics_rows(html, child, &qualified, depth + 1, max_depth);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
