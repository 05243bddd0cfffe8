//! 套件侧的结构化控制台事件
//!
//! 测试脚本以 `[OK]`、`[FAIL]`、`[WARN]`、`[INFO]` 标记输出结果。
//! 这里把这些行解析为带类别和内容的事件，供断言使用。

pub mod capture;
pub mod types;

pub use capture::{EventLog, SuiteConsole};
pub use types::{ConsoleEvent, EventCategory};
