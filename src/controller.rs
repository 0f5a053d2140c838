use std::{
    ffi::CString,
    fmt,
    os::unix::ffi::OsStrExt,
    path::Path,
};

use bstr::ByteSlice;
use itertools::Itertools;
use libc::c_int;
use nix::errno::Errno;

use crate::{
    errors::{Error, Result},
    ffi::{self, gpio_handle_t, gpio_pin_t, PinFlags, GPIO_INVALID_HANDLE},
    fixed_str::FixedStr,
};

#[cfg(not(test))]
use crate::ffi as sys;
#[cfg(test)]
use crate::sim as sys;

/// Logic level of a pin.
///
/// The discriminants match `GPIO_VALUE_LOW` and `GPIO_VALUE_HIGH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Low = 0,
    High = 1,
}

impl Value {
    pub const fn new(is_high: bool) -> Self {
        if is_high {
            Self::High
        } else {
            Self::Low
        }
    }

    pub const fn is_high(&self) -> bool {
        matches!(self, Value::High)
    }

    pub(crate) const fn as_raw(self) -> c_int {
        match self {
            Value::Low => ffi::GPIO_VALUE_LOW,
            Value::High => ffi::GPIO_VALUE_HIGH,
        }
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(is_high: bool) -> Self {
        Self::new(is_high)
    }
}

impl std::ops::Not for Value {
    type Output = Value;

    fn not(self) -> Value {
        match self {
            Value::Low => Value::High,
            Value::High => Value::Low,
        }
    }
}

/// Snapshot of one pin's configuration.
///
/// Snapshots are fetched fresh on every call; nothing is cached between
/// calls, and a snapshot does not track later changes to the pin.
#[derive(Debug, Clone)]
pub struct PinConfig {
    pin: gpio_pin_t,
    name: FixedStr<{ ffi::GPIO_MAX_NAME_SIZE }>,
    caps: PinFlags,
    flags: PinFlags,
}

impl PinConfig {
    pub(crate) fn from_raw(raw: &ffi::gpio_config) -> Result<Self> {
        Ok(Self {
            pin: raw.g_pin,
            name: FixedStr::from_byte_array(raw.g_name)?,
            caps: raw.g_caps,
            flags: raw.g_flags,
        })
    }

    /// Identifier of the pin, unique and stable within its controller.
    pub const fn pin(&self) -> u32 {
        self.pin
    }

    /// Human-readable pin label. May be empty.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Modes the hardware is capable of.
    pub const fn caps(&self) -> PinFlags {
        self.caps
    }

    /// Modes currently configured on the pin. Always within [`caps`].
    ///
    /// [`caps`]: PinConfig::caps
    pub const fn flags(&self) -> PinFlags {
        self.flags
    }

    /// True when every bit of `flags` is within this pin's capabilities.
    pub fn supports(&self, flags: PinFlags) -> bool {
        self.caps.contains(flags)
    }
}

impl fmt::Display for PinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caps = flag_names(self.caps);
        let flags = flag_names(self.flags);
        write!(
            f,
            "pin {:>2} ({}) caps=[{caps}] flags=[{flags}]",
            self.pin,
            self.name.as_str()
        )
    }
}

fn flag_names(flags: PinFlags) -> String {
    flags
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .join(",")
}

/// One open connection to a GPIO controller device (`/dev/gpiocN`).
///
/// A controller maps to one `gpio(4)` device instance; its pins are
/// addressed by the numbers reported by [`pins`]. All operations are
/// direct, blocking calls into the native library. The handle is released
/// by [`close`] or on drop.
///
/// Nothing here serializes concurrent use of one handle; callers that
/// share a controller across threads wrap it themselves.
///
/// [`pins`]: Controller::pins
/// [`close`]: Controller::close
#[derive(Debug)]
pub struct Controller {
    handle: gpio_handle_t,
    device: String,
}

impl Controller {
    /// Open GPIO controller `unit`, i.e. `/dev/gpioc<unit>`.
    pub fn open(unit: u32) -> Result<Self> {
        let device = format!("/dev/gpioc{unit}");
        let handle = unsafe { sys::gpio_open(unit) };
        if handle == GPIO_INVALID_HANDLE {
            return Err(Error::Open {
                device,
                source: Errno::last(),
            });
        }
        Ok(Self { handle, device })
    }

    /// Open a GPIO controller by device path.
    pub fn open_device<P: AsRef<Path>>(device: P) -> Result<Self> {
        let device = device.as_ref();
        let path = CString::new(device.as_os_str().as_bytes()).map_err(|_| Error::Open {
            device: device.display().to_string(),
            source: Errno::EINVAL,
        })?;
        let handle = unsafe { sys::gpio_open_device(path.as_ptr()) };
        if handle == GPIO_INVALID_HANDLE {
            return Err(Error::Open {
                device: device.display().to_string(),
                source: Errno::last(),
            });
        }
        Ok(Self {
            handle,
            device: device.display().to_string(),
        })
    }

    /// Path of the underlying device.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Release the underlying device.
    ///
    /// Closing an already-closed handle is a no-op. Dropping the controller
    /// closes it as well; operations after `close` fail with the
    /// per-operation error.
    pub fn close(&mut self) {
        if self.handle != GPIO_INVALID_HANDLE {
            unsafe { sys::gpio_close(self.handle) };
            self.handle = GPIO_INVALID_HANDLE;
        }
    }

    /// Every pin known to the controller, in the controller's own order.
    ///
    /// A controller without pins yields an empty list, not an error.
    pub fn pins(&self) -> Result<Vec<PinConfig>> {
        let mut configs: *mut ffi::gpio_config = std::ptr::null_mut();
        let count = unsafe { sys::gpio_pin_list(self.handle, &mut configs) };
        if count < 0 {
            return Err(Error::Enumeration {
                source: Errno::last(),
            });
        }
        if count == 0 || configs.is_null() {
            if !configs.is_null() {
                unsafe { libc::free(configs.cast()) };
            }
            return Ok(Vec::new());
        }
        let pins: Result<Vec<_>> = unsafe { std::slice::from_raw_parts(configs, count as usize) }
            .iter()
            .map(PinConfig::from_raw)
            .collect();
        // The array is malloc'd by the native library and owned by us.
        unsafe { libc::free(configs.cast()) };
        pins
    }

    /// Current capabilities and flags of `pin`.
    pub fn pin_config(&self, pin: u32) -> Result<PinConfig> {
        let mut config = ffi::gpio_config::zeroed();
        config.g_pin = pin;
        let ret = unsafe { sys::gpio_pin_config(self.handle, &mut config) };
        if ret != 0 {
            return Err(Error::Config {
                pin,
                op: "query",
                source: Errno::last(),
            });
        }
        PinConfig::from_raw(&config)
    }

    /// Apply `flags` to `pin`.
    ///
    /// The controller rejects combinations outside the pin's capability
    /// mask. The caller is responsible for a coherent combination: one
    /// direction bit, one drive bit.
    pub fn set_pin_flags(&self, pin: u32, flags: PinFlags) -> Result<()> {
        let mut config = ffi::gpio_config::zeroed();
        config.g_pin = pin;
        config.g_flags = flags;
        let ret = unsafe { sys::gpio_pin_set_flags(self.handle, &mut config) };
        if ret != 0 {
            return Err(Error::Config {
                pin,
                op: "flags",
                source: Errno::last(),
            });
        }
        Ok(())
    }

    /// Rename `pin`.
    pub fn set_pin_name(&self, pin: u32, name: &str) -> Result<()> {
        let name = CString::new(name).map_err(|_| Error::Config {
            pin,
            op: "name",
            source: Errno::EINVAL,
        })?;
        let ret = unsafe { sys::gpio_pin_set_name(self.handle, pin, name.as_ptr()) };
        if ret != 0 {
            return Err(Error::Config {
                pin,
                op: "name",
                source: Errno::last(),
            });
        }
        Ok(())
    }

    /// Read the current logic level of `pin`.
    ///
    /// The native call reports failure through `GPIO_VALUE_INVALID`; that,
    /// or any other reading outside low/high, surfaces as [`Error::Read`].
    pub fn value(&self, pin: u32) -> Result<Value> {
        match unsafe { sys::gpio_pin_get(self.handle, pin) } {
            ffi::GPIO_VALUE_LOW => Ok(Value::Low),
            ffi::GPIO_VALUE_HIGH => Ok(Value::High),
            _ => Err(Error::Read {
                pin,
                source: Errno::last(),
            }),
        }
    }

    /// Drive `pin` to `value`.
    pub fn set_value(&self, pin: u32, value: Value) -> Result<()> {
        let ret = unsafe { sys::gpio_pin_set(self.handle, pin, value.as_raw()) };
        if ret != 0 {
            return Err(Error::Set {
                pin,
                source: Errno::last(),
            });
        }
        Ok(())
    }

    /// Flip the current logic level of `pin`.
    pub fn toggle(&self, pin: u32) -> Result<()> {
        let ret = unsafe { sys::gpio_pin_toggle(self.handle, pin) };
        if ret != 0 {
            return Err(Error::Set {
                pin,
                source: Errno::last(),
            });
        }
        Ok(())
    }

    fn pin_mode(
        &self,
        pin: u32,
        op: &'static str,
        f: unsafe extern "C" fn(gpio_handle_t, gpio_pin_t) -> c_int,
    ) -> Result<()> {
        let ret = unsafe { f(self.handle, pin) };
        if ret != 0 {
            return Err(Error::Config {
                pin,
                op,
                source: Errno::last(),
            });
        }
        Ok(())
    }

    /// Force `pin` low.
    pub fn set_low(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "low", sys::gpio_pin_low)
    }

    /// Force `pin` high.
    pub fn set_high(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "high", sys::gpio_pin_high)
    }

    /// Configure `pin` as an input.
    pub fn set_input(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "input", sys::gpio_pin_input)
    }

    /// Configure `pin` as an output.
    pub fn set_output(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "output", sys::gpio_pin_output)
    }

    /// Drive `pin` open-drain: it can pull low or float, never drive high.
    pub fn set_open_drain(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "open-drain", sys::gpio_pin_opendrain)
    }

    /// Drive `pin` push-pull: both levels actively driven.
    pub fn set_push_pull(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "push-pull", sys::gpio_pin_pushpull)
    }

    /// Put `pin` in a high-impedance state.
    pub fn set_tristate(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "tristate", sys::gpio_pin_tristate)
    }

    /// Enable the weak pull-up resistor on `pin`.
    pub fn set_pull_up(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "pull-up", sys::gpio_pin_pullup)
    }

    /// Enable the weak pull-down resistor on `pin`.
    pub fn set_pull_down(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "pull-down", sys::gpio_pin_pulldown)
    }

    /// Invert the read path of `pin`.
    pub fn set_invert_input(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "invert-input", sys::gpio_pin_invin)
    }

    /// Invert the write path of `pin`.
    pub fn set_invert_output(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "invert-output", sys::gpio_pin_invout)
    }

    /// Enable hardware pulsate (blink) mode on `pin`, where supported.
    pub fn set_pulsate(&self, pin: u32) -> Result<()> {
        self.pin_mode(pin, "pulsate", sys::gpio_pin_pulsate)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterate over all GPIO controller devices currently present.
pub fn controllers() -> Result<ControllerIterator> {
    let readdir = std::fs::read_dir("/dev").map_err(|e| Error::Open {
        device: "/dev".to_string(),
        source: errno_of(&e),
    })?;
    Ok(ControllerIterator { readdir })
}

/// Iterator over `/dev/gpiocN` controllers.
#[derive(Debug)]
pub struct ControllerIterator {
    readdir: std::fs::ReadDir,
}

impl Iterator for ControllerIterator {
    type Item = Result<Controller>;

    fn next(&mut self) -> Option<Result<Controller>> {
        for entry in &mut self.readdir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    return Some(Err(Error::Open {
                        device: "/dev".to_string(),
                        source: errno_of(&e),
                    }));
                }
            };
            let path = entry.path();
            let Some(file) = path.file_name() else {
                continue;
            };
            // gpioc0, gpioc1, ...
            let name = file.as_bytes();
            if !name.starts_with_str("gpioc") {
                continue;
            }
            let unit = &name["gpioc".len()..];
            if unit.is_empty() || !unit.iter().all(|b| b.is_ascii_digit()) {
                continue;
            }
            return Some(Controller::open_device(&path));
        }

        None
    }
}

fn errno_of(e: &std::io::Error) -> Errno {
    e.raw_os_error()
        .map(Errno::from_raw)
        .unwrap_or(Errno::UnknownErrno)
}
