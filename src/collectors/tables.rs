//! Probe tables: which sources each section tries on each platform, in
//! order. Supporting a new platform means adding its rows here.

use crate::collectors::Probe;
use crate::core::{OsFamily, SectionId};

const fn cmd(program: &'static str, args: &'static [&'static str]) -> Probe {
    Probe::Command { program, args }
}

const UNAME: Probe = cmd("uname", &["-a"]);
const UPTIME: Probe = cmd("uptime", &[]);
const DF: Probe = cmd("df", &["-h"]);
const IFCONFIG: Probe = cmd("ifconfig", &["-a"]);
const MOUNT: Probe = cmd("mount", &[]);
const DOCKER_CHAIN: &[Probe] = &[
    cmd("docker", &["ps", "-a"]),
    cmd("podman", &["ps", "-a"]),
    Probe::Message("Docker is not installed or the daemon is not running"),
];

const LINUX_OVERVIEW: &[Probe] = &[
    Probe::Group(&[UNAME, Probe::File("/etc/os-release"), UPTIME]),
    cmd("hostnamectl", &[]),
];
const LINUX_CPU: &[Probe] = &[cmd("lscpu", &[]), Probe::File("/proc/cpuinfo")];
const LINUX_MEMORY: &[Probe] = &[cmd("free", &["-h"]), Probe::File("/proc/meminfo")];
const LINUX_NETWORK: &[Probe] = &[
    cmd("ip", &["addr", "show"]),
    IFCONFIG,
    Probe::File("/proc/net/dev"),
];
const LINUX_PROCESSES: &[Probe] = &[cmd("ps", &["aux", "--sort=-%cpu"]), cmd("ps", &["aux"])];
const LINUX_MOUNTS: &[Probe] = &[
    cmd("findmnt", &["--real"]),
    MOUNT,
    Probe::File("/proc/mounts"),
];
const LINUX_AUDIO: &[Probe] = &[
    cmd("pactl", &["info"]),
    cmd("aplay", &["-l"]),
    Probe::File("/proc/asound/cards"),
    Probe::Message("No audio subsystem detected"),
];
const LINUX_AUDIO_SERVICES: &[Probe] = &[
    cmd(
        "systemctl",
        &[
            "--user",
            "list-units",
            "--type=service",
            "--all",
            "--no-pager",
            "pipewire*",
            "pulseaudio*",
            "wireplumber*",
        ],
    ),
    cmd("pgrep", &["-a", "pipewire|pulseaudio|wireplumber"]),
    Probe::Message("No audio services running"),
];
const LINUX_TEMPERATURE: &[Probe] = &[
    cmd("sensors", &[]),
    Probe::Glob("/sys/class/thermal/thermal_zone*/temp"),
    Probe::Message("No temperature sensors found"),
];

const MACOS_OVERVIEW: &[Probe] = &[Probe::Group(&[cmd("sw_vers", &[]), UNAME, UPTIME])];
const MACOS_CPU: &[Probe] = &[
    Probe::Group(&[
        cmd("sysctl", &["-n", "machdep.cpu.brand_string"]),
        cmd("sysctl", &["hw.physicalcpu", "hw.logicalcpu"]),
    ]),
    cmd("system_profiler", &["SPHardwareDataType"]),
];
const MACOS_MEMORY: &[Probe] = &[Probe::Group(&[
    cmd("sysctl", &["hw.memsize"]),
    cmd("vm_stat", &[]),
])];
const MACOS_PROCESSES: &[Probe] = &[cmd("ps", &["aux", "-r"]), cmd("ps", &["aux"])];
const MACOS_AUDIO: &[Probe] = &[
    cmd("system_profiler", &["SPAudioDataType"]),
    Probe::Message("No audio devices reported"),
];
const MACOS_AUDIO_SERVICES: &[Probe] = &[
    cmd("launchctl", &["list", "com.apple.audio.coreaudiod"]),
    cmd("pgrep", &["-l", "coreaudiod"]),
    Probe::Message("coreaudiod is not running"),
];
const MACOS_TEMPERATURE: &[Probe] = &[
    cmd("osx-cpu-temp", &[]),
    cmd("istats", &["cpu", "temp"]),
    Probe::Message("Temperature requires osx-cpu-temp or iStats"),
];

const FREEBSD_OVERVIEW: &[Probe] = &[Probe::Group(&[
    UNAME,
    cmd("freebsd-version", &[]),
    UPTIME,
])];
const FREEBSD_CPU: &[Probe] = &[cmd("sysctl", &["hw.model", "hw.ncpu"])];
const FREEBSD_MEMORY: &[Probe] = &[Probe::Group(&[
    cmd("sysctl", &["hw.physmem", "hw.usermem"]),
    cmd("swapinfo", &["-h"]),
])];
const FREEBSD_PROCESSES: &[Probe] = &[cmd("ps", &["aux"])];
const FREEBSD_AUDIO: &[Probe] = &[
    Probe::File("/dev/sndstat"),
    Probe::Message("No audio devices reported"),
];
const FREEBSD_AUDIO_SERVICES: &[Probe] = &[
    cmd("pgrep", &["-l", "pulseaudio|pipewire|sndiod|virtual_oss"]),
    Probe::Message("No audio services running"),
];
const FREEBSD_TEMPERATURE: &[Probe] = &[
    cmd("sysctl", &["hw.acpi.thermal"]),
    Probe::Message("No temperature sensors found"),
];

const WINDOWS_OVERVIEW: &[Probe] = &[cmd("systeminfo", &[]), cmd("cmd", &["/C", "ver"])];
const WINDOWS_CPU: &[Probe] = &[
    cmd(
        "wmic",
        &["cpu", "get", "Name,NumberOfCores,NumberOfLogicalProcessors", "/format:list"],
    ),
    cmd(
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            "Get-CimInstance Win32_Processor | Format-List Name,NumberOfCores,NumberOfLogicalProcessors",
        ],
    ),
];
const WINDOWS_MEMORY: &[Probe] = &[
    cmd(
        "wmic",
        &["OS", "get", "FreePhysicalMemory,TotalVisibleMemorySize", "/value"],
    ),
    cmd(
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            "Get-CimInstance Win32_OperatingSystem | Format-List TotalVisibleMemorySize,FreePhysicalMemory",
        ],
    ),
];
const WINDOWS_DISK: &[Probe] = &[
    cmd("wmic", &["logicaldisk", "get", "Caption,FreeSpace,Size"]),
    cmd(
        "powershell",
        &["-NoProfile", "-Command", "Get-PSDrive -PSProvider FileSystem"],
    ),
];
const WINDOWS_NETWORK: &[Probe] = &[cmd("ipconfig", &["/all"])];
const WINDOWS_PROCESSES: &[Probe] = &[cmd("tasklist", &[])];
const WINDOWS_MOUNTS: &[Probe] = &[cmd("mountvol", &[])];
const WINDOWS_AUDIO: &[Probe] = &[
    cmd("wmic", &["sounddev", "get", "Name,Status"]),
    cmd(
        "powershell",
        &["-NoProfile", "-Command", "Get-CimInstance Win32_SoundDevice | Format-List Name,Status"],
    ),
    Probe::Message("No audio devices reported"),
];
const WINDOWS_AUDIO_SERVICES: &[Probe] = &[
    cmd("sc", &["query", "Audiosrv"]),
    Probe::Message("Audiosrv state unavailable"),
];
const WINDOWS_TEMPERATURE: &[Probe] = &[
    cmd(
        "wmic",
        &[
            "/namespace:\\\\root\\wmi",
            "PATH",
            "MSAcpi_ThermalZoneTemperature",
            "get",
            "CurrentTemperature",
        ],
    ),
    Probe::Message("Temperature sensors are not exposed (try running as Administrator)"),
];

/// Fallback chain for `section` on `family`; `None` means the section
/// cannot be collected there.
pub fn chain(section: SectionId, family: OsFamily) -> Option<&'static [Probe]> {
    use OsFamily::*;
    use SectionId::*;

    let chain: &'static [Probe] = match (section, family) {
        (_, Unknown) => return None,

        (SystemOverview, Linux) => LINUX_OVERVIEW,
        (SystemOverview, MacOs) => MACOS_OVERVIEW,
        (SystemOverview, FreeBsd) => FREEBSD_OVERVIEW,
        (SystemOverview, Windows) => WINDOWS_OVERVIEW,

        (Cpu, Linux) => LINUX_CPU,
        (Cpu, MacOs) => MACOS_CPU,
        (Cpu, FreeBsd) => FREEBSD_CPU,
        (Cpu, Windows) => WINDOWS_CPU,

        (Memory, Linux) => LINUX_MEMORY,
        (Memory, MacOs) => MACOS_MEMORY,
        (Memory, FreeBsd) => FREEBSD_MEMORY,
        (Memory, Windows) => WINDOWS_MEMORY,

        (Disk, Linux | MacOs | FreeBsd) => &[DF],
        (Disk, Windows) => WINDOWS_DISK,

        (Network, Linux) => LINUX_NETWORK,
        (Network, MacOs | FreeBsd) => &[IFCONFIG],
        (Network, Windows) => WINDOWS_NETWORK,

        (Processes, Linux) => LINUX_PROCESSES,
        (Processes, MacOs) => MACOS_PROCESSES,
        (Processes, FreeBsd) => FREEBSD_PROCESSES,
        (Processes, Windows) => WINDOWS_PROCESSES,

        (Containers, _) => DOCKER_CHAIN,

        (Mounts, Linux) => LINUX_MOUNTS,
        (Mounts, MacOs | FreeBsd) => &[MOUNT],
        (Mounts, Windows) => WINDOWS_MOUNTS,

        (Audio, Linux) => LINUX_AUDIO,
        (Audio, MacOs) => MACOS_AUDIO,
        (Audio, FreeBsd) => FREEBSD_AUDIO,
        (Audio, Windows) => WINDOWS_AUDIO,

        (AudioServices, Linux) => LINUX_AUDIO_SERVICES,
        (AudioServices, MacOs) => MACOS_AUDIO_SERVICES,
        (AudioServices, FreeBsd) => FREEBSD_AUDIO_SERVICES,
        (AudioServices, Windows) => WINDOWS_AUDIO_SERVICES,

        (Temperature, Linux) => LINUX_TEMPERATURE,
        (Temperature, MacOs) => MACOS_TEMPERATURE,
        (Temperature, FreeBsd) => FREEBSD_TEMPERATURE,
        (Temperature, Windows) => WINDOWS_TEMPERATURE,
    };
    Some(chain)
}

pub fn max_lines(section: SectionId) -> Option<usize> {
    match section {
        SectionId::Processes => Some(30),
        SectionId::Mounts => Some(80),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [OsFamily; 4] = [
        OsFamily::Linux,
        OsFamily::MacOs,
        OsFamily::FreeBsd,
        OsFamily::Windows,
    ];

    #[test]
    fn every_section_has_a_chain_on_every_known_platform() {
        for section in SectionId::ALL {
            for family in KNOWN {
                let chain = chain(section, family)
                    .unwrap_or_else(|| panic!("missing chain for {section} on {family}"));
                assert!(!chain.is_empty(), "{section} on {family}");
            }
        }
    }

    #[test]
    fn unknown_platform_has_no_chains() {
        assert!(
            SectionId::ALL
                .iter()
                .all(|s| chain(*s, OsFamily::Unknown).is_none())
        );
    }

    #[test]
    fn messages_only_appear_last() {
        for section in SectionId::ALL {
            for family in KNOWN {
                let chain = chain(section, family).unwrap_or_default();
                for probe in chain.iter().rev().skip(1) {
                    assert!(
                        !matches!(probe, Probe::Message(_)),
                        "{section} on {family}: message before the end"
                    );
                }
            }
        }
    }
}
