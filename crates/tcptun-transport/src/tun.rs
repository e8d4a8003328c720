use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// The clone device every tunnel interface is allocated through.
const CLONE_DEVICE: &str = "/dev/net/tun";

/// `_IOW('T', 202, int)`
const TUNSETIFF: libc::c_ulong = 0x400454ca;

const SIOCSIFMTU: libc::c_ulong = 0x8922;

/// Largest unit the tunnel can frame (16-bit length prefix).
const MAX_UNIT_SIZE: u32 = u16::MAX as u32;

/// Ethernet header prepended to every TAP unit.
const ETHERNET_HEADER_SIZE: u32 = 14;

/// Interface request carrying flags (`struct ifreq` with `ifr_flags`).
#[repr(C)]
struct IfReqFlags {
    name: [libc::c_char; libc::IFNAMSIZ],
    flags: libc::c_short,
    _pad: [u8; 22],
}

/// Interface request carrying an MTU (`struct ifreq` with `ifr_mtu`).
#[repr(C)]
struct IfReqMtu {
    name: [libc::c_char; libc::IFNAMSIZ],
    mtu: libc::c_int,
    _pad: [u8; 20],
}

/// Whether the device carries IP packets or Ethernet frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    /// Layer 3: raw IP packets.
    #[default]
    Tun,
    /// Layer 2: Ethernet frames.
    Tap,
}

impl DeviceMode {
    fn flags(self) -> libc::c_short {
        let mode = match self {
            DeviceMode::Tun => libc::IFF_TUN,
            DeviceMode::Tap => libc::IFF_TAP,
        };
        (mode | libc::IFF_NO_PI) as libc::c_short
    }

    /// Largest MTU for which every unit still fits the length prefix.
    pub fn max_mtu(self) -> u32 {
        match self {
            DeviceMode::Tun => MAX_UNIT_SIZE,
            DeviceMode::Tap => MAX_UNIT_SIZE - ETHERNET_HEADER_SIZE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceMode::Tun => "tun",
            DeviceMode::Tap => "tap",
        }
    }
}

/// A Linux TUN/TAP device opened without packet information headers.
///
/// One `read` returns exactly one packet (or frame); one `write` injects exactly
/// one. Closing the handle destroys a non-persistent interface.
pub struct TunDevice {
    file: File,
    name: String,
    mode: DeviceMode,
}

impl TunDevice {
    /// Allocate a new interface or attach to an existing one named `name`.
    ///
    /// An empty `name` lets the kernel pick one (`tun0`, `tap0`, ...); the name
    /// actually assigned is available through [`TunDevice::name`].
    pub fn open(name: &str, mode: DeviceMode) -> Result<Self> {
        let mut req = IfReqFlags {
            name: [0; libc::IFNAMSIZ],
            flags: mode.flags(),
            _pad: [0; 22],
        };
        copy_name(name, &mut req.name)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(CLONE_DEVICE)
            .map_err(|source| TransportError::DeviceOpen {
                name: name.to_string(),
                source,
            })?;

        // SAFETY: `file` is an open descriptor for the clone device and `req` is a
        // properly sized, initialized `struct ifreq` that outlives the call.
        let rc = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                TUNSETIFF as _,
                (&mut req as *mut IfReqFlags).cast::<libc::c_void>(),
            )
        };
        if rc < 0 {
            return Err(TransportError::DeviceOpen {
                name: name.to_string(),
                source: std::io::Error::last_os_error(),
            });
        }

        let name = read_name(&req.name);
        info!(interface = %name, mode = mode.as_str(), "attached to tunnel device");

        Ok(Self { file, name, mode })
    }

    /// Kernel-assigned interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    /// Set the interface MTU.
    ///
    /// Rejects values for which a single unit could exceed the 16-bit frame
    /// length, so the invariant holds before any traffic flows.
    pub fn set_mtu(&self, mtu: u32) -> Result<()> {
        let max = self.mode.max_mtu();
        if mtu == 0 || mtu > max {
            return Err(TransportError::MtuOutOfRange { mtu, max });
        }

        let config_err = |source| TransportError::DeviceConfig {
            name: self.name.clone(),
            source,
        };

        // SAFETY: plain socket(2) call; ownership of the returned descriptor is
        // transferred to `OwnedFd` below when it is valid.
        let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if raw < 0 {
            return Err(config_err(std::io::Error::last_os_error()));
        }
        // SAFETY: `raw` is a freshly created descriptor not owned elsewhere.
        let control = unsafe { OwnedFd::from_raw_fd(raw) };

        let mut req = IfReqMtu {
            name: [0; libc::IFNAMSIZ],
            mtu: mtu as libc::c_int,
            _pad: [0; 20],
        };
        copy_name(&self.name, &mut req.name)?;

        // SAFETY: `control` is a valid socket and `req` a valid `struct ifreq`.
        let rc = unsafe {
            libc::ioctl(
                control.as_raw_fd(),
                SIOCSIFMTU as _,
                (&mut req as *mut IfReqMtu).cast::<libc::c_void>(),
            )
        };
        if rc < 0 {
            return Err(config_err(std::io::Error::last_os_error()));
        }

        debug!(interface = %self.name, mtu, "set device mtu");
        Ok(())
    }
}

impl Read for TunDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for TunDevice {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl AsFd for TunDevice {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for TunDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for TunDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunDevice")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

fn copy_name(name: &str, dst: &mut [libc::c_char; libc::IFNAMSIZ]) -> Result<()> {
    // One byte is reserved for the trailing NUL.
    let max = libc::IFNAMSIZ - 1;
    if name.len() > max {
        return Err(TransportError::InterfaceNameTooLong {
            name: name.to_string(),
            len: name.len(),
            max,
        });
    }
    for (slot, byte) in dst.iter_mut().zip(name.bytes()) {
        *slot = byte as libc::c_char;
    }
    Ok(())
}

fn read_name(src: &[libc::c_char; libc::IFNAMSIZ]) -> String {
    let bytes: Vec<u8> = src
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip_through_ifreq_field() {
        let mut field = [0 as libc::c_char; libc::IFNAMSIZ];
        copy_name("tun7", &mut field).unwrap();
        assert_eq!(read_name(&field), "tun7");
    }

    #[test]
    fn name_longer_than_ifnamsiz_rejected() {
        let mut field = [0 as libc::c_char; libc::IFNAMSIZ];
        let err = copy_name("a-very-long-interface", &mut field).unwrap_err();
        assert!(matches!(
            err,
            TransportError::InterfaceNameTooLong { len: 21, max: 15, .. }
        ));
    }

    #[test]
    fn name_at_limit_accepted() {
        let mut field = [0 as libc::c_char; libc::IFNAMSIZ];
        copy_name("fifteen-chars-x", &mut field).unwrap();
        assert_eq!(read_name(&field), "fifteen-chars-x");
    }

    #[test]
    fn mode_flags_never_carry_packet_info() {
        for mode in [DeviceMode::Tun, DeviceMode::Tap] {
            assert_ne!(mode.flags() & libc::IFF_NO_PI as libc::c_short, 0);
        }
        assert_ne!(DeviceMode::Tun.flags(), DeviceMode::Tap.flags());
    }

    #[test]
    fn tap_mtu_leaves_room_for_ethernet_header() {
        assert_eq!(DeviceMode::Tun.max_mtu(), 65535);
        assert_eq!(DeviceMode::Tap.max_mtu(), 65521);
    }

    #[test]
    fn ifreq_layouts_match_kernel_size() {
        assert_eq!(std::mem::size_of::<IfReqFlags>(), 40);
        assert_eq!(std::mem::size_of::<IfReqMtu>(), 40);
    }
}
