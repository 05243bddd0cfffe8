use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// 控制台事件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Ok,
    Fail,
    Warn,
    Info,
    /// 没有标记的普通输出
    Console,
}

impl EventCategory {
    /// 行首标记，例如 "[OK]"
    pub fn marker(self) -> Option<&'static str> {
        match self {
            EventCategory::Ok => Some("[OK]"),
            EventCategory::Fail => Some("[FAIL]"),
            EventCategory::Warn => Some("[WARN]"),
            EventCategory::Info => Some("[INFO]"),
            EventCategory::Console => None,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "OK" => Some(EventCategory::Ok),
            "FAIL" => Some(EventCategory::Fail),
            "WARN" => Some(EventCategory::Warn),
            "INFO" => Some(EventCategory::Info),
            _ => None,
        }
    }
}

/// 一条结构化的控制台事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEvent {
    pub category: EventCategory,
    pub payload: String,
}

impl ConsoleEvent {
    pub fn new(category: EventCategory, payload: impl Into<String>) -> Self {
        Self {
            category,
            payload: payload.into(),
        }
    }

    /// 解析一行输出
    ///
    /// `[TAG] payload` 形式的行解析为对应类别，其余行为 `Console`。
    pub fn parse(line: &str) -> Self {
        static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = TAG_REGEX
            .get_or_init(|| Regex::new(r"^\s*\[(OK|FAIL|WARN|INFO)\]\s?(.*)$").unwrap());

        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(caps) = re.captures(line)
            && let Some(category) = EventCategory::from_tag(&caps[1])
        {
            return Self::new(category, &caps[2]);
        }

        Self::new(EventCategory::Console, line)
    }
}

impl fmt::Display for ConsoleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category.marker() {
            Some(marker) => write!(f, "{} {}", marker, self.payload),
            None => f.write_str(&self.payload),
        }
    }
}
