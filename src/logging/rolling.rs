//! Daily rotating log file with size cap, gzip archives and retention.
//!
//! Active file: `<dir>/<prefix>-<DD-MM-YYYY>.log`. When the date changes, or
//! when the next write would push the file past `max_size`, the active file is
//! swapped for a new one (`<prefix>-<date>.<n>.log` for size rotations within
//! a day). The finished file is then gzip-archived to `<file>.gz`, and files of
//! the same prefix older than `max_age` are deleted. Archiving and pruning run
//! on a housekeeping thread after the file lock is released, so concurrent
//! writers only ever wait for the swap.

use chrono::{Local, NaiveDate};
use flate2::Compression;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use tracing_subscriber::fmt::MakeWriter;

/// Date pattern used in file names.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Source of the current local date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Compresses a finished file; [`archive`] unless replaced.
pub type Archiver = Arc<dyn Fn(&Path) -> io::Result<PathBuf> + Send + Sync>;

/// Rotation settings.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub dir: PathBuf,
    pub prefix: String,
    /// Rotate before a write would exceed this many bytes.
    pub max_size: u64,
    /// Delete rotated files older than this.
    pub max_age: Duration,
    /// Gzip files once they are rotated away from.
    pub compress: bool,
}

impl RotationPolicy {
    /// Daily files capped at 40 MiB, kept for 14 days, gzip-archived.
    pub fn daily(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            max_size: 40 * 1024 * 1024,
            max_age: Duration::from_secs(14 * 24 * 60 * 60),
            compress: true,
        }
    }

    fn file_name(&self, date: NaiveDate, index: u32) -> PathBuf {
        let date = date.format(DATE_FORMAT);
        let name = if index == 0 {
            format!("{}-{}.log", self.prefix, date)
        } else {
            format!("{}-{}.{}.log", self.prefix, date, index)
        };
        self.dir.join(name)
    }
}

struct Active {
    date: NaiveDate,
    index: u32,
    path: PathBuf,
    file: File,
    written: u64,
}

/// Thread-safe rotating file, usable as a `tracing_subscriber` writer.
pub struct RollingFile {
    policy: RotationPolicy,
    clock: Clock,
    archiver: Archiver,
    active: Mutex<Active>,
    housekeeping: Mutex<Vec<JoinHandle<()>>>,
}

impl RollingFile {
    /// Opens (or appends to) today's file, creating the directory if needed.
    pub fn new(policy: RotationPolicy) -> io::Result<Self> {
        Self::with_clock(policy, Arc::new(|| Local::now().date_naive()))
    }

    /// Same as [`RollingFile::new`] with an injectable date source.
    pub fn with_clock(policy: RotationPolicy, clock: Clock) -> io::Result<Self> {
        fs::create_dir_all(&policy.dir)?;

        let date = clock();
        let active = open_from(&policy, date, 0)?;

        Ok(Self {
            policy,
            clock,
            archiver: Arc::new(archive),
            active: Mutex::new(active),
            housekeeping: Mutex::new(Vec::new()),
        })
    }

    /// Replaces the step that compresses finished files.
    #[cfg(test)]
    fn with_archiver(mut self, archiver: Archiver) -> Self {
        self.archiver = archiver;
        self
    }

    /// Path of the file currently written to.
    pub fn current_path(&self) -> PathBuf {
        self.active.lock().path.clone()
    }

    /// Blocks until every archive and prune started so far has finished.
    pub fn wait_housekeeping(&self) {
        let pending = std::mem::take(&mut *self.housekeeping.lock());
        for handle in pending {
            let _ = handle.join();
        }
    }

    fn write_buf(&self, buf: &[u8]) -> io::Result<usize> {
        let mut active = self.active.lock();
        let today = (self.clock)();

        let finished = if today != active.date {
            Some(swap(&self.policy, &mut active, today, 0)?)
        } else if active.written > 0
            && active.written + buf.len() as u64 > self.policy.max_size
        {
            let next = active.index + 1;
            Some(swap(&self.policy, &mut active, today, next)?)
        } else {
            None
        };

        active.file.write_all(buf)?;
        active.written += buf.len() as u64;
        drop(active);

        if let Some(finished) = finished {
            self.housekeep(finished);
        }

        Ok(buf.len())
    }

    fn housekeep(&self, finished: PathBuf) {
        let policy = self.policy.clone();
        let archiver = self.archiver.clone();

        // The subscriber owns this writer; failures are reported out of band.
        let spawned = thread::Builder::new()
            .name("log-housekeeping".to_string())
            .spawn(move || {
                if policy.compress
                    && let Err(err) = archiver(&finished)
                {
                    eprintln!("failed to archive {}: {err}", finished.display());
                }

                if let Err(err) = prune(&policy) {
                    eprintln!("failed to prune {}: {err}", policy.dir.display());
                }
            });

        match spawned {
            Ok(handle) => {
                let mut pending = self.housekeeping.lock();
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(err) => eprintln!("failed to start log housekeeping: {err}"),
        }
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        self.wait_housekeeping();
    }
}

/// Opens the next file and swaps it in, returning the path of the old one.
fn swap(
    policy: &RotationPolicy,
    active: &mut Active,
    date: NaiveDate,
    index: u32,
) -> io::Result<PathBuf> {
    active.file.flush()?;

    let mut next = open_from(policy, date, index)?;
    std::mem::swap(active, &mut next);
    Ok(next.path)
}

fn open(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn open_at(policy: &RotationPolicy, date: NaiveDate, index: u32) -> io::Result<Active> {
    let path = policy.file_name(date, index);
    let file = open(&path)?;
    let written = file.metadata()?.len();

    Ok(Active {
        date,
        index,
        path,
        file,
        written,
    })
}

/// Opens the first file at or after `index` that has room left and has not
/// been archived yet.
fn open_from(policy: &RotationPolicy, date: NaiveDate, mut index: u32) -> io::Result<Active> {
    loop {
        let path = policy.file_name(date, index);
        let archived = gz_path(&path).exists();
        let full = fs::metadata(&path)
            .map(|m| m.len() >= policy.max_size)
            .unwrap_or(false);

        if !archived && !full {
            return open_at(policy, date, index);
        }
        index += 1;
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compresses `path` to `<path>.gz` and removes the original.
pub fn archive(path: &Path) -> io::Result<PathBuf> {
    let target = gz_path(path);

    let mut input = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    fs::remove_file(path)?;
    Ok(target)
}

/// Deletes files of this prefix last modified more than `max_age` ago.
pub fn prune(policy: &RotationPolicy) -> io::Result<()> {
    let Some(cutoff) = SystemTime::now().checked_sub(policy.max_age) else {
        return Ok(());
    };
    let prefix = format!("{}-", policy.prefix);

    for entry in fs::read_dir(&policy.dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) || !(name.ends_with(".log") || name.ends_with(".log.gz")) {
            continue;
        }

        // Another housekeeping run may have removed it already.
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        if modified < cutoff {
            match fs::remove_file(entry.path()) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Writer handed out per event; locks the shared file on each write.
pub struct RollingWriter<'a>(&'a RollingFile);

impl Write for RollingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_buf(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.active.lock().file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::sync::mpsc;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn fixed_clock(day: u32) -> (Arc<Mutex<NaiveDate>>, Clock) {
        let today = Arc::new(Mutex::new(date(day)));
        let handle = today.clone();
        (today, Arc::new(move || *handle.lock()))
    }

    fn policy(dir: &Path) -> RotationPolicy {
        RotationPolicy::daily(dir, "learnify-backend")
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_file_name_pattern() {
        let policy = policy(Path::new("logs"));

        assert_eq!(
            policy.file_name(date(19), 0),
            PathBuf::from("logs/learnify-backend-19-10-2026.log")
        );
        assert_eq!(
            policy.file_name(date(19), 2),
            PathBuf::from("logs/learnify-backend-19-10-2026.2.log")
        );
    }

    #[test]
    fn test_writes_to_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let (_, clock) = fixed_clock(19);
        let file = RollingFile::with_clock(policy(dir.path()), clock).unwrap();

        file.make_writer().write_all(b"first line\n").unwrap();

        let path = dir.path().join("learnify-backend-19-10-2026.log");
        assert_eq!(file.current_path(), path);
        assert_eq!(fs::read_to_string(path).unwrap(), "first line\n");
    }

    #[test]
    fn test_rotates_and_archives_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let (today, clock) = fixed_clock(19);
        let file = RollingFile::with_clock(policy(dir.path()), clock).unwrap();

        file.make_writer().write_all(b"monday\n").unwrap();
        *today.lock() = date(20);
        file.make_writer().write_all(b"tuesday\n").unwrap();
        file.wait_housekeeping();

        let old = dir.path().join("learnify-backend-19-10-2026.log");
        assert!(!old.exists());
        assert_eq!(gunzip(&gz_path(&old)), "monday\n");

        let new = dir.path().join("learnify-backend-20-10-2026.log");
        assert_eq!(fs::read_to_string(new).unwrap(), "tuesday\n");
    }

    #[test]
    fn test_rotates_on_size_within_day() {
        let dir = tempfile::tempdir().unwrap();
        let (_, clock) = fixed_clock(19);
        let mut policy = policy(dir.path());
        policy.max_size = 16;
        let file = RollingFile::with_clock(policy, clock).unwrap();

        file.make_writer().write_all(b"0123456789\n").unwrap();
        file.make_writer().write_all(b"abcdefghij\n").unwrap();
        file.wait_housekeeping();

        let first = dir.path().join("learnify-backend-19-10-2026.log");
        assert_eq!(gunzip(&gz_path(&first)), "0123456789\n");

        let second = dir.path().join("learnify-backend-19-10-2026.1.log");
        assert_eq!(file.current_path(), second);
        assert_eq!(fs::read_to_string(second).unwrap(), "abcdefghij\n");
    }

    #[test]
    fn test_write_during_archive_does_not_wait() {
        let dir = tempfile::tempdir().unwrap();
        let (today, clock) = fixed_clock(19);

        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let release_rx = Mutex::new(release_rx);
        let archiver: Archiver = Arc::new(move |path: &Path| {
            started_tx.lock().send(()).ok();
            release_rx.lock().recv().ok();
            archive(path)
        });

        let file = Arc::new(
            RollingFile::with_clock(policy(dir.path()), clock)
                .unwrap()
                .with_archiver(archiver),
        );

        file.make_writer().write_all(b"monday\n").unwrap();
        *today.lock() = date(20);
        file.make_writer().write_all(b"tuesday\n").unwrap();
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("archive never started");

        // The archive is now parked until released.
        let (done_tx, done_rx) = mpsc::channel();
        let writer = file.clone();
        std::thread::spawn(move || {
            writer.make_writer().write_all(b"still tuesday\n").unwrap();
            done_tx.send(()).unwrap();
        });
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("write waited for the archive");

        let old = dir.path().join("learnify-backend-19-10-2026.log");
        assert!(!gz_path(&old).exists());

        release_tx.send(()).unwrap();
        file.wait_housekeeping();

        assert_eq!(gunzip(&gz_path(&old)), "monday\n");
        let new = dir.path().join("learnify-backend-20-10-2026.log");
        assert_eq!(
            fs::read_to_string(new).unwrap(),
            "tuesday\nstill tuesday\n"
        );
    }

    #[test]
    fn test_oversized_write_goes_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let (_, clock) = fixed_clock(19);
        let mut policy = policy(dir.path());
        policy.max_size = 4;
        let file = RollingFile::with_clock(policy, clock).unwrap();

        file.make_writer().write_all(b"longer than the cap\n").unwrap();

        let first = dir.path().join("learnify-backend-19-10-2026.log");
        assert_eq!(file.current_path(), first);
        assert_eq!(
            fs::read_to_string(first).unwrap(),
            "longer than the cap\n"
        );
    }

    #[test]
    fn test_restart_skips_archived_files() {
        let dir = tempfile::tempdir().unwrap();
        let policy = policy(dir.path());
        let first = policy.file_name(date(19), 0);
        fs::write(&first, "before restart\n").unwrap();
        archive(&first).unwrap();

        let (_, clock) = fixed_clock(19);
        let file = RollingFile::with_clock(policy, clock).unwrap();

        assert_eq!(
            file.current_path(),
            dir.path().join("learnify-backend-19-10-2026.1.log")
        );
    }

    #[test]
    fn test_prune_removes_only_stale_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut policy = policy(dir.path());

        let ours = dir.path().join("learnify-backend-01-10-2026.log.gz");
        let foreign = dir.path().join("other-01-10-2026.log");
        fs::write(&ours, "x").unwrap();
        fs::write(&foreign, "x").unwrap();

        policy.max_age = Duration::from_secs(3600);
        prune(&policy).unwrap();
        assert!(ours.exists());

        std::thread::sleep(Duration::from_millis(20));
        policy.max_age = Duration::from_millis(1);
        prune(&policy).unwrap();
        assert!(!ours.exists());
        assert!(foreign.exists());
    }
}
