//! # Result Model Module / 结果模型模块
//!
//! The artifact seams of the runner: a nested result tree, a store that
//! loads and saves trees as Robot-style `output.xml` files, and the writer
//! interface behind which reports are rendered. The aggregation strategies
//! only ever talk to the `ResultStore`/`ResultWriter` traits; the XML wire
//! format lives entirely in `XmlResultStore`.
//!
//! 运行器的产物接缝：嵌套的结果树、以 Robot 风格 `output.xml` 文件
//! 加载和保存树的存储，以及渲染报告的写入器接口。聚合策略只与
//! `ResultStore`/`ResultWriter` trait 交互；XML 线格式完全由
//! `XmlResultStore` 承载。

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::models::RunnerError;

/// One executed test case inside a result artifact.
/// 结果产物中的一个已执行测试用例。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLeaf {
    pub name: String,
    pub passed: bool,
    /// Failure message carried in the status element, if any.
    /// 状态元素中携带的失败消息（如果有）。
    pub message: Option<String>,
}

/// An ordered, nested aggregation of results rooted at a name.
///
/// Children are either sub-trees (one per merged artifact or
/// sub-aggregation) or test leaves. A tree is built once per aggregation
/// strategy and discarded after it has been saved and rendered.
///
/// 以名称为根的有序嵌套结果聚合。
/// 子节点要么是子树（每个合并的产物或子聚合一个），要么是测试叶。
/// 每个聚合策略构建一次树，保存并渲染后即丢弃。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTree {
    pub name: String,
    pub suites: Vec<ResultTree>,
    pub tests: Vec<TestLeaf>,
}

impl ResultTree {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suites: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Appends a sub-tree as the last child.
    pub fn push_suite(&mut self, suite: ResultTree) {
        self.suites.push(suite);
    }

    /// Total number of test leaves in the tree.
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(ResultTree::test_count).sum::<usize>()
    }

    /// Number of failed test leaves in the tree.
    pub fn failed_count(&self) -> usize {
        self.tests.iter().filter(|t| !t.passed).count()
            + self.suites.iter().map(ResultTree::failed_count).sum::<usize>()
    }

    pub fn passed_count(&self) -> usize {
        self.test_count() - self.failed_count()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty() && self.tests.is_empty()
    }
}

/// Loads artifacts into result trees and saves trees back to disk.
/// 将产物加载为结果树，并将树保存回磁盘。
pub trait ResultStore: Send + Sync {
    fn load(&self, path: &Path) -> Result<ResultTree>;
    fn save(&self, tree: &ResultTree, path: &Path) -> Result<()>;
}

/// Report rendering options. `report_name: None` selects the log-only
/// variant; the statistics depth affects rendering, never merge semantics.
/// 报告渲染选项。`report_name: None` 选择仅日志的变体；
/// 统计深度只影响渲染，不影响合并语义。
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub log_name: String,
    pub report_name: Option<String>,
    pub suite_stat_level: usize,
}

impl ReportOptions {
    /// Combined log + report output with the default file names.
    pub fn combined(suite_stat_level: usize) -> Self {
        Self {
            log_name: "log.html".to_string(),
            report_name: Some("report.html".to_string()),
            suite_stat_level,
        }
    }

    /// Log-only output under the given file name.
    pub fn log_only(log_name: impl Into<String>, suite_stat_level: usize) -> Self {
        Self {
            log_name: log_name.into(),
            report_name: None,
            suite_stat_level,
        }
    }
}

/// Renders a final merged artifact into human-readable output.
/// 将最终合并的产物渲染为人类可读的输出。
pub trait ResultWriter: Send + Sync {
    fn write_report(&self, artifact: &Path, outputdir: &Path, options: &ReportOptions)
    -> Result<()>;
}

/// The default store: Robot Framework-style `output.xml` files read and
/// written with `quick-xml` events.
///
/// Loading is tolerant: only `<suite>`, `<test>` and the test's direct
/// `<status>` child are interpreted; keywords, messages, statistics and
/// any unknown elements are skipped, so artifacts written by the real
/// runner and artifacts written by this store both load.
///
/// 默认存储：使用 `quick-xml` 事件读写 Robot Framework 风格的
/// `output.xml` 文件。加载是宽容的：仅解释 `<suite>`、`<test>` 及测试
/// 的直接 `<status>` 子元素；关键字、消息、统计信息和未知元素都会被
/// 跳过，因此真实运行器写出的产物和本存储写出的产物都可以加载。
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlResultStore;

enum Frame {
    Suite(ResultTree),
    Test(TestLeaf),
    Other,
}

impl ResultStore for XmlResultStore {
    fn load(&self, path: &Path) -> Result<ResultTree> {
        let mut reader = Reader::from_file(path).map_err(|e| RunnerError::Artifact {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        reader.trim_text(true);

        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<ResultTree> = None;
        let mut in_test_status = false;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                RunnerError::Artifact {
                    path: path.to_path_buf(),
                    message: format!("malformed XML: {}", e),
                }
            })?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"suite" => {
                        let name = attribute(&e, "name")?.unwrap_or_default();
                        stack.push(Frame::Suite(ResultTree::named(name)));
                    }
                    b"test" => {
                        let name = attribute(&e, "name")?.unwrap_or_default();
                        stack.push(Frame::Test(TestLeaf {
                            name,
                            passed: false,
                            message: None,
                        }));
                    }
                    b"status" => {
                        // Only the status element directly under a test is
                        // meaningful; keyword statuses sit under an Other
                        // frame and fall through.
                        if let Some(Frame::Test(leaf)) = stack.last_mut() {
                            leaf.passed = attribute(&e, "status")?.as_deref() == Some("PASS");
                            in_test_status = true;
                        } else {
                            stack.push(Frame::Other);
                        }
                    }
                    _ => stack.push(Frame::Other),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"status" => {
                        if let Some(Frame::Test(leaf)) = stack.last_mut() {
                            leaf.passed = attribute(&e, "status")?.as_deref() == Some("PASS");
                        }
                    }
                    b"suite" => {
                        let done = ResultTree::named(attribute(&e, "name")?.unwrap_or_default());
                        match stack.last_mut() {
                            Some(Frame::Suite(parent)) => parent.push_suite(done),
                            _ => {
                                if root.is_none() {
                                    root = Some(done);
                                }
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if in_test_status {
                        if let Some(Frame::Test(leaf)) = stack.last_mut() {
                            let text = e.unescape().unwrap_or_default().into_owned();
                            if !text.is_empty() {
                                leaf.message = Some(text);
                            }
                        }
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"suite" => {
                        if let Some(Frame::Suite(done)) = stack.pop() {
                            match stack.last_mut() {
                                Some(Frame::Suite(parent)) => parent.push_suite(done),
                                _ => {
                                    if root.is_none() {
                                        root = Some(done);
                                    }
                                }
                            }
                        }
                    }
                    b"test" => {
                        if let Some(Frame::Test(leaf)) = stack.pop() {
                            if let Some(Frame::Suite(parent)) = stack.last_mut() {
                                parent.tests.push(leaf);
                            }
                        }
                    }
                    b"status" => {
                        if in_test_status {
                            in_test_status = false;
                        } else {
                            stack.pop();
                        }
                    }
                    _ => {
                        stack.pop();
                    }
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        root.ok_or_else(|| {
            RunnerError::Artifact {
                path: path.to_path_buf(),
                message: "no <suite> element found".to_string(),
            }
            .into()
        })
    }

    fn save(&self, tree: &ResultTree, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("cannot create artifact {}", path.display()))?;
        let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut robot = BytesStart::new("robot");
        robot.push_attribute(("generator", generator_string().as_str()));
        writer.write_event(Event::Start(robot))?;
        write_suite(&mut writer, tree)?;
        writer.write_event(Event::End(BytesEnd::new("robot")))?;
        Ok(())
    }
}

fn generator_string() -> String {
    format!("suite-runner {}", env!("CARGO_PKG_VERSION"))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attr = element
        .try_get_attribute(name)
        .map_err(|e| anyhow::anyhow!("bad attribute '{}': {}", name, e))?;
    match attr {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn write_suite<W: Write>(writer: &mut Writer<W>, suite: &ResultTree) -> Result<()> {
    let mut start = BytesStart::new("suite");
    start.push_attribute(("name", suite.name.as_str()));
    writer.write_event(Event::Start(start))?;

    for child in &suite.suites {
        write_suite(writer, child)?;
    }
    for test in &suite.tests {
        let mut test_start = BytesStart::new("test");
        test_start.push_attribute(("name", test.name.as_str()));
        writer.write_event(Event::Start(test_start))?;

        let mut status = BytesStart::new("status");
        status.push_attribute(("status", if test.passed { "PASS" } else { "FAIL" }));
        match &test.message {
            Some(message) => {
                writer.write_event(Event::Start(status))?;
                writer.write_event(Event::Text(BytesText::new(message)))?;
                writer.write_event(Event::End(BytesEnd::new("status")))?;
            }
            None => writer.write_event(Event::Empty(status))?,
        }
        writer.write_event(Event::End(BytesEnd::new("test")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("suite")))?;
    Ok(())
}
