use crate::Result;
use crate::error::StagehandError;
use crate::runner::types::{SuiteStats, TestCaseResult};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Writer, escape};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JUnit XML report of a finished suite run.
pub struct JunitReport<'report> {
    name: &'report str,
    stats: &'report SuiteStats,
    results: &'report [TestCaseResult],
}

impl<'report> JunitReport<'report> {
    pub fn new(name: &'report str, stats: &'report SuiteStats, results: &'report [TestCaseResult]) -> Self {
        Self { name, stats, results }
    }

    /// Write `<dir>/<name>.xml`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(StagehandError::IoError)?;
        }

        let xml = self.to_xml()?;
        let path = dir.join(format!("{}.xml", self.name));
        fs::write(&path, xml).map_err(StagehandError::IoError)?;
        Ok(path)
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.serialize_suite(&mut writer)?;
        writer.write_indent()?;
        Ok(writer.into_inner())
    }

    fn serialize_suite(&self, writer: &mut Writer<impl Write>) -> Result<()> {
        let mut suite_tag = BytesStart::new("testsuite");
        suite_tag.extend_attributes([
            ("name", self.name),
            ("tests", self.stats.attempted.to_string().as_str()),
            ("errors", self.stats.errored.to_string().as_str()),
            ("failures", self.stats.failed.to_string().as_str()),
            ("skip", self.stats.skipped.to_string().as_str()),
            ("pending", self.stats.pending.to_string().as_str()),
        ]);
        writer.write_event(Event::Start(suite_tag))?;

        for result in self.results {
            serialize_case(result, writer)?;
        }

        serialize_end_event("testsuite", writer)
    }
}

fn serialize_case(result: &TestCaseResult, writer: &mut Writer<impl Write>) -> Result<()> {
    let classname = match result.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
        _ => ".".to_string(),
    };
    let name = result
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut case_tag = BytesStart::new("testcase");
    case_tag.extend_attributes([("classname", classname.as_str()), ("name", name.as_str())]);
    case_tag.push_attribute(("time", format!("{:.3}", result.runtime.as_secs_f64()).as_str()));

    let has_children = result.status.is_failure() || result.stdout.is_some() || result.stderr.is_some();
    if !has_children {
        writer.write_event(Event::Empty(case_tag))?;
        return Ok(());
    }
    writer.write_event(Event::Start(case_tag))?;

    if result.status.is_failure() {
        let mut failure_tag = BytesStart::new("failure");
        failure_tag.push_attribute(("type", result.status.as_str()));
        match &result.exception {
            Some(exception) => {
                let rendered = exception.to_string();
                let message = escape_markup(&rendered);
                failure_tag.push_attribute(Attribute::from((b"message".as_slice(), message.as_bytes())));
                writer.write_event(Event::Start(failure_tag))?;
                serialize_text_event(&exception.backtrace.join("\n"), writer)?;
                serialize_end_event("failure", writer)?;
            }
            None => writer.write_event(Event::Empty(failure_tag))?,
        }
    }

    if let Some(stdout) = &result.stdout {
        serialize_captured("system-out", stdout, writer)?;
    }
    if let Some(stderr) = &result.stderr {
        serialize_captured("system-err", stderr, writer)?;
    }

    serialize_end_event("testcase", writer)
}

fn serialize_captured(tag: &str, text: &str, writer: &mut Writer<impl Write>) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    serialize_text_event(text, writer)?;
    serialize_end_event(tag, writer)
}

fn serialize_text_event(content: &str, writer: &mut Writer<impl Write>) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(escape_markup(content))))?;
    Ok(())
}

fn serialize_end_event(title: &str, writer: &mut Writer<impl Write>) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(title)))?;
    Ok(())
}

/// Escape markup characters, then replace control characters other than
/// LF and CR with decimal character references.
fn escape_markup(text: &str) -> Cow<'_, str> {
    let escaped = escape::escape(text);
    if !escaped.chars().any(is_replaced_control) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        if is_replaced_control(c) {
            out.push_str(&format!("&#{};", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// 0x00-0x09, 0x0B, 0x0C, 0x0E-0x1F
fn is_replaced_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{09}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}
