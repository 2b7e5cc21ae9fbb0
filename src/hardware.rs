//! Host detection for the `detect` command

use std::fmt;

use crate::error::{Error, Result};

const CPUINFO_PATH: &str = "/proc/cpuinfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    RaspberryPi,
    BeagleBone,
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::RaspberryPi => write!(f, "Raspberry Pi"),
            Host::BeagleBone => write!(f, "BeagleBone Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostInfo {
    pub host: Host,
    pub revision: u32,
}

/// Detect the board this process runs on
pub fn detect() -> Result<HostInfo> {
    let cpuinfo = std::fs::read_to_string(CPUINFO_PATH)?;
    parse_cpuinfo(&cpuinfo)
}

/// Identify the board from `/proc/cpuinfo` contents
pub fn parse_cpuinfo(cpuinfo: &str) -> Result<HostInfo> {
    let field = |name: &str| {
        cpuinfo.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == name).then(|| value.trim())
        })
    };

    let hardware = field("Hardware")
        .ok_or_else(|| Error::UnsupportedHost("no Hardware entry in cpuinfo".to_string()))?;

    let host = if ["BCM2708", "BCM2709", "BCM2710", "BCM2835"]
        .iter()
        .any(|chip| hardware.contains(chip))
    {
        Host::RaspberryPi
    } else if hardware.contains("AM33XX") {
        Host::BeagleBone
    } else {
        return Err(Error::UnsupportedHost(hardware.to_string()));
    };

    let revision = match field("Revision") {
        Some(rev) => u32::from_str_radix(rev, 16)
            .map_err(|_| Error::UnsupportedHost(format!("unreadable revision {:?}", rev)))?,
        None => 0,
    };

    Ok(HostInfo { host, revision })
}
