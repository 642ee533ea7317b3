use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use wait_timeout::ChildExt;

use crate::core::{OsMarkers, Platform};

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommandRunOptions {
    pub env: Vec<(String, String)>,
}

impl CommandRunOptions {
    /// Pins the locale so tool output is stable across hosts.
    pub fn c_locale() -> Self {
        Self {
            env: vec![
                ("LC_ALL".to_string(), "C".to_string()),
                ("LANG".to_string(), "C".to_string()),
            ],
        }
    }
}

pub fn run_command_with_options(
    cmd: &str,
    args: &[&str],
    timeout: Duration,
    options: &CommandRunOptions,
) -> Result<CommandOutput> {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    for (k, v) in &options.env {
        command.env(k, v);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start process: {cmd}"))?;

    // Drain both pipes while waiting so a chatty tool cannot fill the pipe
    // buffer and stall until the timeout.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = match child
        .wait_timeout(timeout)
        .with_context(|| format!("failed to wait for process: {cmd}"))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("timed out after {timeout:?}: {cmd}"));
        }
    };

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();

    Ok(CommandOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

fn spawn_reader(mut pipe: impl Read + Send + 'static) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: std::thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Detects the host platform once per run. Never fails; unrecognized hosts
/// map to `OsFamily::Unknown`.
pub fn detect() -> Platform {
    let platform = Platform::from_markers(&read_markers());
    tracing::debug!(platform = %platform, "detected platform");
    platform
}

pub fn read_markers() -> OsMarkers {
    let kernel = kernel_name().or_else(|| Some(std::env::consts::OS.to_string()));
    let is_linux = kernel
        .as_deref()
        .is_some_and(|k| k.trim().eq_ignore_ascii_case("linux"));

    let (os_release, lsb_release) = if is_linux {
        (
            std::fs::read_to_string("/etc/os-release")
                .or_else(|_| std::fs::read_to_string("/usr/lib/os-release"))
                .ok(),
            std::fs::read_to_string("/etc/lsb-release").ok(),
        )
    } else {
        (None, None)
    };

    OsMarkers {
        kernel,
        os_release,
        lsb_release,
    }
}

#[cfg(unix)]
fn kernel_name() -> Option<String> {
    use std::ffi::CStr;

    unsafe {
        let mut uts: libc::utsname = std::mem::zeroed();
        if libc::uname(&mut uts) != 0 {
            return None;
        }
        let name = CStr::from_ptr(uts.sysname.as_ptr())
            .to_string_lossy()
            .to_string();
        if name.trim().is_empty() {
            return None;
        }
        Some(name)
    }
}

#[cfg(not(unix))]
fn kernel_name() -> Option<String> {
    std::env::var("OS").ok().filter(|s| !s.trim().is_empty())
}

#[cfg(unix)]
pub fn hostname() -> Option<String> {
    let mut buf = vec![0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..end]).trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
pub fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn invoking_user_home_dir() -> Option<PathBuf> {
    let uid = std::env::var("SUDO_UID").ok()?.parse::<u32>().ok()?;
    home_dir_for_uid(uid)
}

/// Home directory of the user the report belongs to: the invoking user under
/// `sudo`, otherwise `$HOME` (`%USERPROFILE%` on Windows).
pub fn effective_home_dir() -> Result<PathBuf> {
    if let Some(home_dir) = invoking_user_home_dir() {
        return Ok(home_dir);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME is not set"))
}

#[cfg(unix)]
fn home_dir_for_uid(uid: u32) -> Option<PathBuf> {
    use std::ffi::CStr;

    unsafe {
        let bufsize = libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX);
        let bufsize = if bufsize <= 0 {
            16 * 1024
        } else {
            bufsize as usize
        };
        let mut buf = vec![0u8; bufsize];
        let mut pwd: libc::passwd = std::mem::zeroed();
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let rc = libc::getpwuid_r(
            uid as libc::uid_t,
            &mut pwd,
            buf.as_mut_ptr() as *mut libc::c_char,
            buf.len(),
            &mut result,
        );
        if rc != 0 || result.is_null() {
            return None;
        }
        if pwd.pw_dir.is_null() {
            return None;
        }

        let dir = CStr::from_ptr(pwd.pw_dir).to_string_lossy().to_string();
        if dir.trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(dir))
    }
}

#[cfg(not(unix))]
fn home_dir_for_uid(_uid: u32) -> Option<PathBuf> {
    None
}
