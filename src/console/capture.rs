use crate::console::types::{ConsoleEvent, EventCategory};
use std::io::{self, Write};

/// 按顺序记录的控制台事件
///
/// 套件用它对结构化字段做断言，而不是在原始输出里搜索子串。
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ConsoleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析并记录一行输出
    pub fn record(&mut self, line: &str) -> &ConsoleEvent {
        self.push(ConsoleEvent::parse(line))
    }

    pub fn push(&mut self, event: ConsoleEvent) -> &ConsoleEvent {
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// 逐行记录一段文本
    pub fn record_all(&mut self, text: &str) {
        for line in text.lines() {
            self.record(line);
        }
    }

    pub fn events(&self) -> &[ConsoleEvent] {
        &self.events
    }

    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &ConsoleEvent> {
        self.events.iter().filter(move |e| e.category == category)
    }

    pub fn first_matching<P>(&self, category: EventCategory, predicate: P) -> Option<&ConsoleEvent>
    where
        P: Fn(&str) -> bool,
    {
        self.by_category(category).find(|e| predicate(&e.payload))
    }

    pub fn count(&self, category: EventCategory) -> usize {
        self.by_category(category).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(EventCategory::Fail) > 0
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 套件侧的输出工具：打印带标记的行并同时记录事件
pub struct SuiteConsole<W: Write> {
    writer: W,
    log: EventLog,
}

impl<W: Write> SuiteConsole<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            log: EventLog::new(),
        }
    }

    pub fn emit(&mut self, category: EventCategory, message: impl Into<String>) -> io::Result<()> {
        let event = ConsoleEvent::new(category, message);
        writeln!(self.writer, "{}", event)?;
        self.writer.flush()?;
        self.log.push(event);
        Ok(())
    }

    pub fn ok(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(EventCategory::Ok, message)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(EventCategory::Fail, message)
    }

    pub fn warn(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(EventCategory::Warn, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.emit(EventCategory::Info, message)
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// 套件进程的退出码：记录过失败事件则为 1
    pub fn exit_code(&self) -> i32 {
        if self.log.has_failures() { 1 } else { 0 }
    }

    pub fn into_inner(self) -> (W, EventLog) {
        (self.writer, self.log)
    }
}
