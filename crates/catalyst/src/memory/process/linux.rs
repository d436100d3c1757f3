//! procfs backend, used for targets running under Wine/Proton.
//!
//! Memory goes through `/proc/<pid>/mem`, modules come from
//! `/proc/<pid>/maps`.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;

use tracing::{debug, warn};

use super::{OsError, OsResult, ProcessInfo, matches_process_name};
use crate::error::{Error, Result};

pub(super) struct RawProcess {
    pid: u32,
    mem: File,
    writable: bool,
}

/// Last path component, accepting both `/` and `\` separators
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn read_process_info(pid: u32) -> Option<ProcessInfo> {
    let comm = fs::read_to_string(format!("/proc/{}/comm", pid)).ok()?;
    let exe = fs::read_link(format!("/proc/{}/exe", pid))
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
    let name = exe.unwrap_or_else(|| comm.trim().to_string());

    let image = fs::read(format!("/proc/{}/cmdline", pid))
        .ok()
        .and_then(|raw| {
            let argv0 = raw.split(|b| *b == 0).next()?;
            let argv0 = String::from_utf8_lossy(argv0);
            let image = file_name(argv0.trim()).to_string();
            (!image.is_empty()).then_some(image)
        })
        .filter(|image| *image != name);

    Some(ProcessInfo { pid, name, image })
}

pub(super) fn processes() -> Result<Vec<ProcessInfo>> {
    let mut processes = Vec::new();
    for entry in fs::read_dir("/proc")? {
        let Ok(entry) = entry else { continue };
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };
        // Processes can exit while we scan
        if let Some(info) = read_process_info(pid) {
            processes.push(info);
        }
    }
    processes.sort_by_key(|p| p.pid);
    Ok(processes)
}

pub(super) fn open(pid: u32) -> Result<RawProcess> {
    let path = format!("/proc/{}/mem", pid);
    let map_open_error = |e: std::io::Error| match e.kind() {
        ErrorKind::NotFound => Error::ProcessNotFound(format!("PID {}", pid)),
        ErrorKind::PermissionDenied => {
            Error::AccessDenied(format!("cannot open {}: {}", path, e))
        }
        _ => Error::Io(e),
    };

    match File::options().read(true).write(true).open(&path) {
        Ok(mem) => Ok(RawProcess {
            pid,
            mem,
            writable: true,
        }),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            warn!("{} is not writable ({}), opening read-only", path, e);
            let mem = File::open(&path).map_err(map_open_error)?;
            Ok(RawProcess {
                pid,
                mem,
                writable: false,
            })
        }
        Err(e) => Err(map_open_error(e)),
    }
}

fn classify(e: std::io::Error) -> OsError {
    match e.kind() {
        ErrorKind::PermissionDenied => OsError::AccessDenied(e.to_string()),
        _ => OsError::Fault(e.to_string()),
    }
}

impl RawProcess {
    pub(super) fn read(&self, address: u64, buffer: &mut [u8]) -> OsResult<usize> {
        self.mem.read_at(buffer, address).map_err(classify)
    }

    pub(super) fn write(&self, address: u64, bytes: &[u8]) -> OsResult<usize> {
        if !self.writable {
            return Err(OsError::AccessDenied(format!(
                "/proc/{}/mem was opened read-only",
                self.pid
            )));
        }
        self.mem.write_at(bytes, address).map_err(classify)
    }

    /// Lowest mapped address of the file named `module_name`
    pub(super) fn module_base(&self, module_name: &str) -> Result<Option<u64>> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid))?;
        Ok(parse_module_base(&maps, module_name))
    }

    pub(super) fn is_alive(&self) -> bool {
        let Ok(stat) = fs::read_to_string(format!("/proc/{}/stat", self.pid)) else {
            return false;
        };
        // "pid (comm) S ..." where comm may itself contain ')'
        let state = stat
            .rfind(')')
            .and_then(|i| stat[i + 1..].trim_start().chars().next());
        !matches!(state, None | Some('Z') | Some('X'))
    }

    pub(super) fn close(self) {
        debug!("Closing /proc/{}/mem", self.pid);
        drop(self.mem);
    }
}

fn parse_module_base(maps: &str, module_name: &str) -> Option<u64> {
    maps.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let range = fields.next()?;
            // perms, offset, dev, inode
            let path: Vec<&str> = fields.skip(4).collect();
            if path.is_empty() {
                return None;
            }
            let path = path.join(" ");
            if !matches_process_name(file_name(&path), module_name) {
                return None;
            }
            let start = range.split('-').next()?;
            u64::from_str_radix(start, 16).ok()
        })
        .min()
}
