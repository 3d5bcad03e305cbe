/**
 * Output sinks a logger handle can write to.
 */
use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::error::SetupError;

#[derive(Clone)]
pub enum Output {
    Stdout,
    Stderr,
    /// A file opened for appending.
    File { path: PathBuf, file: Arc<File> },
    /// Any other writer, shared with the caller.
    Writer(SharedWriter),
}

impl Output {
    /**
     * Opens (creating if needed) a log file for appending.
     *
     * @param path The file to open.
     * @return The file output, or the reason it could not be opened.
     */
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let path = path.as_ref().to_path_buf();
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Ok(Output::File {
                path,
                file: Arc::new(file),
            }),
            Err(source) => Err(SetupError::OpenLogFile { path, source }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Output::Stdout => io::stdout().is_terminal(),
            Output::Stderr => io::stderr().is_terminal(),
            Output::File { .. } | Output::Writer(_) => false,
        }
    }

    pub(crate) fn writer(&self) -> Box<dyn Write + Send> {
        match self {
            Output::Stdout => Box::new(io::stdout()),
            Output::Stderr => Box::new(io::stderr()),
            Output::File { file, .. } => Box::new(FileWriter(Arc::clone(file))),
            Output::Writer(writer) => Box::new(writer.clone()),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::Stderr
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Output::Stdout, Output::Stdout) | (Output::Stderr, Output::Stderr) => true,
            (Output::File { path: a, .. }, Output::File { path: b, .. }) => a == b,
            (Output::Writer(a), Output::Writer(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("Stdout"),
            Output::Stderr => f.write_str("Stderr"),
            Output::File { path, .. } => f.debug_tuple("File").field(path).finish(),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

struct FileWriter(Arc<File>);

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

/**
 * A writer that can be handed to a logger and kept by the caller.
 */
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<dyn Write + Send>>);

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        SharedWriter(Arc::new(Mutex::new(writer)))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "writer lock poisoned"))?
            .flush()
    }
}

/**
 * In-memory sink, mostly useful to capture output in tests.
 */
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => String::new(),
        }
    }

    pub fn output(&self) -> Output {
        Output::Writer(SharedWriter::new(self.clone()))
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
