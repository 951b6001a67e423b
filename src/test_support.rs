//! Recording mocks shared by the unit tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::{
    ByteRange, Fd, FileTable, FileType, Flusher, FsSyncHook, FsyncOp, Job, MountTable,
    OpenFlags, PageMapping, QuotaSync, QuotaType, SyncError, SyncFile, Volume, WorkQueue,
    WritebackReason,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Quota { volume: String, wait: bool },
    Writeback { volume: String },
    SyncInodes { volume: String },
    FsSync { volume: String, wait: bool },
    Flush { volume: String, wait: bool },
    WakeFlushers,
    LaptopCompletion,
    FdataWait(ByteRange),
    FdataWrite(ByteRange),
    Fsync { range: ByteRange, datasync: bool },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    pub(crate) fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().iter().filter(|e| pred(e)).count()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

pub(crate) fn io_err(code: i32) -> SyncError {
    SyncError::Io {
        operation: "mock",
        path: PathBuf::new(),
        source: io::Error::from_raw_os_error(code),
    }
}

pub(crate) struct MockVolume {
    pub(crate) name: String,
    pub(crate) read_only: bool,
    pub(crate) backing: bool,
    pub(crate) quota: bool,
    pub(crate) fs_hook: bool,
    pub(crate) fail_quota: bool,
    pub(crate) fail_async_flush: bool,
    pub(crate) fail_wait_flush: bool,
    lock: RwLock<()>,
    log: Log,
}

impl MockVolume {
    pub(crate) fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_owned(),
            read_only: false,
            backing: true,
            quota: true,
            fs_hook: true,
            fail_quota: false,
            fail_async_flush: false,
            fail_wait_flush: false,
            lock: RwLock::new(()),
            log: log.clone(),
        }
    }
}

impl QuotaSync for MockVolume {
    fn quota_sync(&self, quota_type: QuotaType, wait: bool) -> Result<(), SyncError> {
        assert_eq!(quota_type, QuotaType::All);
        self.log.push(Event::Quota {
            volume: self.name.clone(),
            wait,
        });
        if self.fail_quota {
            return Err(io_err(libc::EDQUOT));
        }
        Ok(())
    }
}

impl FsSyncHook for MockVolume {
    fn sync_fs(&self, wait: bool) -> Result<(), SyncError> {
        self.log.push(Event::FsSync {
            volume: self.name.clone(),
            wait,
        });
        Ok(())
    }
}

impl Volume for MockVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn has_backing_store(&self) -> bool {
        self.backing
    }

    fn umount_lock(&self) -> &RwLock<()> {
        &self.lock
    }

    fn writeback_inodes(&self, reason: WritebackReason) {
        assert_eq!(reason, WritebackReason::Sync);
        self.log.push(Event::Writeback {
            volume: self.name.clone(),
        });
    }

    fn sync_inodes(&self) {
        self.log.push(Event::SyncInodes {
            volume: self.name.clone(),
        });
    }

    fn quota(&self) -> Option<&dyn QuotaSync> {
        self.quota.then_some(self as &dyn QuotaSync)
    }

    fn fs_sync(&self) -> Option<&dyn FsSyncHook> {
        self.fs_hook.then_some(self as &dyn FsSyncHook)
    }

    fn flush_blockdev(&self, wait: bool) -> Result<(), SyncError> {
        self.log.push(Event::Flush {
            volume: self.name.clone(),
            wait,
        });
        match wait {
            false if self.fail_async_flush => Err(io_err(libc::EIO)),
            true if self.fail_wait_flush => Err(io_err(libc::ENOSPC)),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockMounts(pub(crate) Vec<Arc<MockVolume>>);

impl MountTable for MockMounts {
    fn for_each_volume(&self, f: &mut dyn FnMut(&dyn Volume)) {
        for volume in &self.0 {
            let _guard = volume.umount_lock().read();
            f(volume.as_ref());
        }
    }
}

pub(crate) struct MockFile {
    pub(crate) path: PathBuf,
    pub(crate) file_type: FileType,
    pub(crate) flags: OpenFlags,
    pub(crate) inode_sync: bool,
    pub(crate) has_fsync: bool,
    pub(crate) has_mapping: bool,
    pub(crate) fail_wait: bool,
    pub(crate) fail_write: bool,
    pub(crate) volume: Arc<MockVolume>,
    log: Log,
}

impl MockFile {
    pub(crate) fn new(path: &str, volume: Arc<MockVolume>, log: &Log) -> Self {
        Self {
            path: PathBuf::from(path),
            file_type: FileType::File,
            flags: OpenFlags::BUFFERED,
            inode_sync: false,
            has_fsync: true,
            has_mapping: true,
            fail_wait: false,
            fail_write: false,
            volume,
            log: log.clone(),
        }
    }
}

impl FsyncOp for MockFile {
    fn fsync_range(&self, range: ByteRange, datasync: bool) -> Result<(), SyncError> {
        self.log.push(Event::Fsync { range, datasync });
        Ok(())
    }
}

impl PageMapping for MockFile {
    fn fdatawait_range(&self, range: ByteRange) -> Result<(), SyncError> {
        self.log.push(Event::FdataWait(range));
        if self.fail_wait {
            return Err(io_err(libc::EIO));
        }
        Ok(())
    }

    fn fdatawrite_range(&self, range: ByteRange) -> Result<(), SyncError> {
        self.log.push(Event::FdataWrite(range));
        if self.fail_write {
            return Err(io_err(libc::ENOSPC));
        }
        Ok(())
    }
}

impl SyncFile for MockFile {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn open_flags(&self) -> OpenFlags {
        self.flags
    }

    fn inode_is_sync(&self) -> bool {
        self.inode_sync
    }

    fn volume(&self) -> Arc<dyn Volume> {
        self.volume.clone()
    }

    fn fsync_op(&self) -> Option<&dyn FsyncOp> {
        self.has_fsync.then_some(self as &dyn FsyncOp)
    }

    fn mapping(&self) -> Option<&dyn PageMapping> {
        self.has_mapping.then_some(self as &dyn PageMapping)
    }
}

#[derive(Default)]
pub(crate) struct MockFiles(pub(crate) Vec<(Fd, Arc<MockFile>)>);

impl FileTable for MockFiles {
    fn get(&self, fd: Fd) -> Option<Arc<dyn SyncFile>> {
        self.0
            .iter()
            .find(|(f, _)| *f == fd)
            .map(|(_, file)| file.clone() as Arc<dyn SyncFile>)
    }
}

pub(crate) struct MockFlusher(pub(crate) Log);

impl Flusher for MockFlusher {
    fn wake_flushers(&self, reason: WritebackReason) {
        assert_eq!(reason, WritebackReason::Sync);
        self.0.push(Event::WakeFlushers);
    }

    fn laptop_sync_completion(&self) {
        self.0.push(Event::LaptopCompletion);
    }
}

/// Runs jobs inline, or refuses them.
#[derive(Default)]
pub(crate) struct InlineQueue {
    pub(crate) refuse: AtomicBool,
}

impl WorkQueue for InlineQueue {
    fn schedule(&self, job: Job) -> io::Result<()> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::OutOfMemory));
        }
        job();
        Ok(())
    }
}

/// Formatted `tracing` output captured on the current thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Run `f` with a subscriber that writes into this buffer.
    pub(crate) fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
