//! An engine run as an external program, one process per page.

use super::TextRecognizer;
use crate::error::{Error, Result};
use crate::model::{DetectionLine, Quad};
use crossbeam_channel::RecvTimeoutError;
use serde::Deserialize;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_POLL: Duration = Duration::from_millis(10);

/// Runs `<program> [args…] [angle flag] <image>` and parses its stdout.
///
/// The program must print the engine's page result as JSON: an array of
/// `[quad, [text, confidence]]` (or `[quad, text]`) entries, or `null` when
/// the page holds no text.
#[derive(Debug, Clone)]
pub struct ProcessRecognizer {
    program: PathBuf,
    args: Vec<OsString>,
    angle_flag: Option<OsString>,
    timeout: Option<Duration>,
}

impl ProcessRecognizer {
    /// Create a recognizer running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            angle_flag: Some(OsString::from("--cls")),
            timeout: None,
        }
    }

    /// Append one fixed argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append fixed arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Flag passed when angle classification is requested (`--cls` by
    /// default); `None` never passes one.
    pub fn with_angle_flag(mut self, flag: Option<&str>) -> Self {
        self.angle_flag = flag.map(OsString::from);
        self
    }

    /// Kill the engine if a page takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program that will be run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one page, excluding the program.
    pub fn command_args(&self, image: &Path, classify_angle: bool) -> Vec<OsString> {
        let mut args = self.args.clone();
        if classify_angle {
            if let Some(flag) = &self.angle_flag {
                args.push(flag.clone());
            }
        }
        args.push(image.as_os_str().to_os_string());
        args
    }

    fn run(&self, image: &Path, classify_angle: bool) -> Result<(std::process::ExitStatus, Vec<u8>, Vec<u8>)> {
        let args = self.command_args(image, classify_angle);
        log::debug!("running {} {:?}", self.program.display(), args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Engine(format!("failed to start {}: {}", self.program.display(), e)))?;

        // Both pipes are drained on their own threads so a chatty engine
        // cannot block on a full pipe while we wait.
        let (tx, rx) = crossbeam_channel::bounded::<(Stream, Vec<u8>)>(2);
        spawn_reader(child.stdout.take(), Stream::Out, tx.clone());
        spawn_reader(child.stderr.take(), Stream::Err, tx);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        loop {
            let received = match deadline {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok((Stream::Out, bytes)) => stdout = bytes,
                Ok((Stream::Err, bytes)) => stderr = bytes,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(&mut child)),
            }
        }

        // The engine may close its pipes and keep running.
        let status = match deadline {
            Some(deadline) => loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                let now = Instant::now();
                if now >= deadline {
                    return Err(self.timed_out(&mut child));
                }
                thread::sleep(WAIT_POLL.min(deadline - now));
            },
            None => child.wait()?,
        };
        Ok((status, stdout, stderr))
    }

    fn timed_out(&self, child: &mut Child) -> Error {
        kill(child);
        let timeout = self.timeout.unwrap_or_default();
        log::error!(
            "{} did not finish within {:?}",
            self.program.display(),
            timeout
        );
        Error::EngineTimeout(timeout)
    }
}

impl TextRecognizer for ProcessRecognizer {
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>> {
        let (status, stdout, stderr) = self.run(image, classify_angle)?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(Error::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(stdout)
            .map_err(|e| Error::Engine(format!("engine output is not UTF-8: {}", e)))?;
        let lines = parse_engine_output(&stdout)?;
        log::debug!("{} line(s) detected in {}", lines.len(), image.display());
        Ok(lines)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn spawn_reader<R>(pipe: Option<R>, stream: Stream, tx: crossbeam_channel::Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    let Some(mut pipe) = pipe else {
        return;
    };
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            log::warn!("reading engine {:?} failed: {}", stream, e);
        }
        let _ = tx.send((stream, buf));
    });
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::warn!("could not kill engine process: {}", e);
    }
    let _ = child.wait();
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Scored(String, f64),
    Bare(String),
}

#[derive(Deserialize)]
struct RawLine(Quad, RawText);

/// Parse the engine's JSON page result into detection lines.
///
/// # Example
///
/// ```
/// use wordocr::engine::parse_engine_output;
///
/// let lines = parse_engine_output(r#"[[[[0,0],[10,0],[10,5],[0,5]], ["ok", 0.98]]]"#).unwrap();
/// assert_eq!(lines[0].text, "ok");
/// assert_eq!(lines[0].confidence, Some(0.98));
///
/// assert!(parse_engine_output("null").unwrap().is_empty());
/// ```
pub fn parse_engine_output(output: &str) -> Result<Vec<DetectionLine>> {
    let raw: Option<Vec<RawLine>> = serde_json::from_str(output.trim())
        .map_err(|e| Error::Engine(format!("unparsable engine output: {}", e)))?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|RawLine(quad, text)| match text {
            RawText::Scored(text, confidence) => {
                DetectionLine::new(quad, text).with_confidence(confidence)
            }
            RawText::Bare(text) => DetectionLine::new(quad, text),
        })
        .collect())
}
