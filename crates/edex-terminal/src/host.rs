/// Source of the host description used by `uname` and the help footer.
pub trait HostInfo: Send + Sync {
    fn os_name(&self) -> &str;
    fn os_version(&self) -> &str;
    fn device(&self) -> &str;
    fn arch(&self) -> &str;
}

/// Compose the `uname` line: OS, version, device, architecture.
pub fn describe(host: &dyn HostInfo) -> String {
    format!(
        "{} {} {} {}",
        host.os_name(),
        host.os_version(),
        host.device(),
        host.arch()
    )
}

const UNKNOWN: &str = "unknown";

/// Host details read once from `uname(2)` at construction.
pub struct SystemHostInfo {
    os_name: String,
    os_version: String,
    device: String,
    arch: String,
}

impl SystemHostInfo {
    pub fn collect() -> Self {
        let arch = std::env::consts::ARCH.to_string();
        match nix::sys::utsname::uname() {
            Ok(uts) => Self {
                os_name: lossy(uts.sysname()),
                os_version: lossy(uts.release()),
                device: lossy(uts.nodename()),
                arch,
            },
            Err(e) => {
                tracing::warn!("uname failed, host info unavailable: {}", e);
                Self {
                    os_name: std::env::consts::OS.to_string(),
                    os_version: UNKNOWN.to_string(),
                    device: UNKNOWN.to_string(),
                    arch,
                }
            }
        }
    }
}

fn lossy(s: &std::ffi::OsStr) -> String {
    let s = s.to_string_lossy();
    if s.is_empty() {
        UNKNOWN.to_string()
    } else {
        s.to_string()
    }
}

impl HostInfo for SystemHostInfo {
    fn os_name(&self) -> &str { &self.os_name }
    fn os_version(&self) -> &str { &self.os_version }
    fn device(&self) -> &str { &self.device }
    fn arch(&self) -> &str { &self.arch }
}

/// Fixed host description, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticHostInfo {
    pub os_name: String,
    pub os_version: String,
    pub device: String,
    pub arch: String,
}

impl HostInfo for StaticHostInfo {
    fn os_name(&self) -> &str { &self.os_name }
    fn os_version(&self) -> &str { &self.os_version }
    fn device(&self) -> &str { &self.device }
    fn arch(&self) -> &str { &self.arch }
}
