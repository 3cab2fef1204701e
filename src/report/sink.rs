//! Output sinks for rendered reports
//!
//! A sink is written to in order and closed once. `close` consumes the
//! boxed sink so it cannot be used afterwards.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;
use std::rc::Rc;

use crate::error::{ReportError, Result};

pub trait ReportSink {
    fn write(&mut self, text: &str) -> Result<()>;

    fn close(self: Box<Self>) -> Result<()>;
}

/// Sink over any `Write` implementation
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl WriterSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl WriterSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BufferState {
    contents: String,
    closes: usize,
}

/// In-memory sink; the paired [`BufferHandle`] reads what was written
#[derive(Debug)]
pub struct BufferSink {
    state: Rc<RefCell<BufferState>>,
}

#[derive(Debug, Clone)]
pub struct BufferHandle {
    state: Rc<RefCell<BufferState>>,
}

impl BufferSink {
    pub fn new() -> (Self, BufferHandle) {
        let state = Rc::new(RefCell::new(BufferState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            BufferHandle { state },
        )
    }
}

impl BufferHandle {
    pub fn contents(&self) -> String {
        self.state.borrow().contents.clone()
    }

    /// Number of times the sink was closed
    pub fn closes(&self) -> usize {
        self.state.borrow().closes
    }
}

impl ReportSink for BufferSink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.state.borrow_mut().contents.push_str(text);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.state.borrow_mut().closes += 1;
        Ok(())
    }
}
