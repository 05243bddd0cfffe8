use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// 报告输出目标
///
/// 启动时创建一次并交给 reporter，运行期间不再修改。
/// 每写一行都会 flush，保证与子进程的输出按时间顺序交错。
pub struct OutputSink {
    writer: Box<dyn Write + Send>,
    color: bool,
}

impl OutputSink {
    pub fn new(writer: impl Write + Send + 'static, color: bool) -> Self {
        Self {
            writer: Box::new(writer),
            color,
        }
    }

    /// 标准输出
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }

    /// 写入共享内存缓冲区，便于检查报告内容
    pub fn buffer(color: bool) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone(), color), buffer)
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.writer, "{}", text.as_ref())?;
        self.writer.flush()
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }
}

/// 可克隆的内存写入器
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
