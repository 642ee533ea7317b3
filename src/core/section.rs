use std::fmt;

use crate::core::ReportConfig;

/// Report sections in their fixed output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionId {
    SystemOverview,
    Cpu,
    Memory,
    Disk,
    Network,
    Processes,
    Containers,
    Mounts,
    Audio,
    AudioServices,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Docker,
    Audio,
    Temperature,
}

impl SectionId {
    pub const ALL: [SectionId; 11] = [
        SectionId::SystemOverview,
        SectionId::Cpu,
        SectionId::Memory,
        SectionId::Disk,
        SectionId::Network,
        SectionId::Processes,
        SectionId::Containers,
        SectionId::Mounts,
        SectionId::Audio,
        SectionId::AudioServices,
        SectionId::Temperature,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SectionId::SystemOverview => "System Overview",
            SectionId::Cpu => "CPU",
            SectionId::Memory => "Memory",
            SectionId::Disk => "Disk",
            SectionId::Network => "Network",
            SectionId::Processes => "Processes",
            SectionId::Containers => "Docker Containers",
            SectionId::Mounts => "Mounts",
            SectionId::Audio => "Audio",
            SectionId::AudioServices => "Audio Services",
            SectionId::Temperature => "Temperature",
        }
    }

    pub const fn toggle(self) -> Option<Toggle> {
        match self {
            SectionId::Containers => Some(Toggle::Docker),
            SectionId::Audio | SectionId::AudioServices => Some(Toggle::Audio),
            SectionId::Temperature => Some(Toggle::Temperature),
            _ => None,
        }
    }

    pub fn enabled(self, config: &ReportConfig) -> bool {
        match self.toggle() {
            None => true,
            Some(Toggle::Docker) => config.include_docker,
            Some(Toggle::Audio) => config.include_audio,
            Some(Toggle::Temperature) => config.include_temperature,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
