//! In-process stand-in for `libgpio`, used by the unit tests.
//!
//! Mirrors the function surface of [`crate::ffi`] over a thread-local table
//! of simulated controllers, so the controller code runs unchanged against
//! it: enumeration order is preserved, flags outside the capability mask
//! are refused with `EINVAL`, unknown units report `ENOENT`, stale handles
//! report `EBADF`, and the pin list is malloc'd so the caller's `free`
//! path is exercised for real.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::CStr;

use libc::{c_char, c_int, c_uint};
use nix::errno::Errno;

use crate::ffi::{
    gpio_config, gpio_handle_t, gpio_pin_t, PinFlags, GPIO_MAX_NAME_SIZE, GPIO_VALUE_HIGH,
    GPIO_VALUE_INVALID, GPIO_VALUE_LOW,
};

#[derive(Clone)]
pub(crate) struct SimPin {
    pin: gpio_pin_t,
    name: [u8; GPIO_MAX_NAME_SIZE],
    caps: PinFlags,
    flags: PinFlags,
    value: c_int,
}

impl SimPin {
    fn to_config(&self) -> gpio_config {
        gpio_config {
            g_pin: self.pin,
            g_name: self.name,
            g_caps: self.caps,
            g_flags: self.flags,
        }
    }
}

/// Describe one simulated pin. Pins start out low.
pub(crate) fn pin(pin: gpio_pin_t, name: &str, caps: PinFlags, flags: PinFlags) -> SimPin {
    assert!(name.len() < GPIO_MAX_NAME_SIZE);
    let mut buf = [0; GPIO_MAX_NAME_SIZE];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    SimPin {
        pin,
        name: buf,
        caps,
        flags,
        value: GPIO_VALUE_LOW,
    }
}

#[derive(Default)]
struct SimUnit {
    pins: Vec<SimPin>,
    fail_enumeration: bool,
}

struct Sim {
    units: BTreeMap<u32, SimUnit>,
    open: BTreeMap<gpio_handle_t, u32>,
    next_handle: gpio_handle_t,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            units: BTreeMap::new(),
            open: BTreeMap::new(),
            next_handle: 3,
        }
    }
}

thread_local! {
    static SIM: RefCell<Sim> = RefCell::new(Sim::default());
}

/// Forget all simulated state. Tests call this first.
pub(crate) fn reset() {
    SIM.with(|s| *s.borrow_mut() = Sim::default());
}

/// Install a simulated controller unit with the given pins.
pub(crate) fn add_unit(unit: u32, pins: Vec<SimPin>) {
    SIM.with(|s| {
        s.borrow_mut().units.insert(
            unit,
            SimUnit {
                pins,
                fail_enumeration: false,
            },
        );
    });
}

/// Make pin enumeration on `unit` report failure.
pub(crate) fn fail_enumeration(unit: u32) {
    SIM.with(|s| {
        if let Some(u) = s.borrow_mut().units.get_mut(&unit) {
            u.fail_enumeration = true;
        }
    });
}

fn failed(errno: Errno) -> c_int {
    Errno::set(errno);
    -1
}

fn with_unit<T>(handle: gpio_handle_t, stale: T, f: impl FnOnce(&mut SimUnit) -> T) -> T {
    SIM.with(|s| {
        let mut sim = s.borrow_mut();
        let Some(&unit) = sim.open.get(&handle) else {
            Errno::set(Errno::EBADF);
            return stale;
        };
        let unit = sim.units.get_mut(&unit).expect("unit table out of sync");
        f(unit)
    })
}

fn set_flags(unit: &mut SimUnit, pin: gpio_pin_t, flags: PinFlags) -> c_int {
    let Some(p) = unit.pins.iter_mut().find(|p| p.pin == pin) else {
        return failed(Errno::EINVAL);
    };
    // The controller refuses anything outside the capability mask.
    if !p.caps.contains(flags) {
        return failed(Errno::EINVAL);
    }
    p.flags = flags;
    0
}

fn set_value(unit: &mut SimUnit, pin: gpio_pin_t, value: c_int) -> c_int {
    let Some(p) = unit.pins.iter_mut().find(|p| p.pin == pin) else {
        return failed(Errno::EINVAL);
    };
    p.value = value;
    0
}

pub unsafe extern "C" fn gpio_open(unit: c_uint) -> gpio_handle_t {
    SIM.with(|s| {
        let mut sim = s.borrow_mut();
        if !sim.units.contains_key(&unit) {
            return failed(Errno::ENOENT);
        }
        let handle = sim.next_handle;
        sim.next_handle += 1;
        sim.open.insert(handle, unit);
        handle
    })
}

pub unsafe extern "C" fn gpio_open_device(device: *const c_char) -> gpio_handle_t {
    let path = CStr::from_ptr(device).to_string_lossy().into_owned();
    let Some(unit) = path
        .strip_prefix("/dev/gpioc")
        .and_then(|u| u.parse().ok())
    else {
        return failed(Errno::ENOENT);
    };
    gpio_open(unit)
}

pub unsafe extern "C" fn gpio_close(handle: gpio_handle_t) {
    SIM.with(|s| {
        s.borrow_mut().open.remove(&handle);
    });
}

pub unsafe extern "C" fn gpio_pin_list(
    handle: gpio_handle_t,
    configs: *mut *mut gpio_config,
) -> c_int {
    with_unit(handle, -1, |unit| {
        if unit.fail_enumeration {
            return failed(Errno::EIO);
        }
        let n = unit.pins.len();
        // Same contract as the native library: the caller owns a malloc'd
        // array and frees it.
        let array = unsafe {
            libc::malloc(n.max(1) * std::mem::size_of::<gpio_config>()) as *mut gpio_config
        };
        if array.is_null() {
            return failed(Errno::ENOMEM);
        }
        for (i, p) in unit.pins.iter().enumerate() {
            unsafe { array.add(i).write(p.to_config()) };
        }
        unsafe { *configs = array };
        n as c_int
    })
}

pub unsafe extern "C" fn gpio_pin_config(handle: gpio_handle_t, config: *mut gpio_config) -> c_int {
    let want = (*config).g_pin;
    with_unit(handle, -1, |unit| {
        let Some(p) = unit.pins.iter().find(|p| p.pin == want) else {
            return failed(Errno::EINVAL);
        };
        unsafe { *config = p.to_config() };
        0
    })
}

pub unsafe extern "C" fn gpio_pin_set_name(
    handle: gpio_handle_t,
    pin: gpio_pin_t,
    name: *const c_char,
) -> c_int {
    let name = CStr::from_ptr(name).to_bytes().to_vec();
    with_unit(handle, -1, |unit| {
        if name.len() >= GPIO_MAX_NAME_SIZE {
            return failed(Errno::EINVAL);
        }
        let Some(p) = unit.pins.iter_mut().find(|p| p.pin == pin) else {
            return failed(Errno::EINVAL);
        };
        p.name = [0; GPIO_MAX_NAME_SIZE];
        p.name[..name.len()].copy_from_slice(&name);
        0
    })
}

pub unsafe extern "C" fn gpio_pin_set_flags(
    handle: gpio_handle_t,
    config: *mut gpio_config,
) -> c_int {
    let (pin, flags) = ((*config).g_pin, (*config).g_flags);
    with_unit(handle, -1, |unit| set_flags(unit, pin, flags))
}

pub unsafe extern "C" fn gpio_pin_get(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, GPIO_VALUE_INVALID, |unit| {
        match unit.pins.iter().find(|p| p.pin == pin) {
            Some(p) => p.value,
            None => failed(Errno::EINVAL),
        }
    })
}

pub unsafe extern "C" fn gpio_pin_set(handle: gpio_handle_t, pin: gpio_pin_t, value: c_int) -> c_int {
    with_unit(handle, -1, |unit| {
        if value != GPIO_VALUE_LOW && value != GPIO_VALUE_HIGH {
            return failed(Errno::EINVAL);
        }
        set_value(unit, pin, value)
    })
}

pub unsafe extern "C" fn gpio_pin_toggle(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| {
        let Some(p) = unit.pins.iter_mut().find(|p| p.pin == pin) else {
            return failed(Errno::EINVAL);
        };
        p.value ^= 1;
        0
    })
}

pub unsafe extern "C" fn gpio_pin_low(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_value(unit, pin, GPIO_VALUE_LOW))
}

pub unsafe extern "C" fn gpio_pin_high(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_value(unit, pin, GPIO_VALUE_HIGH))
}

pub unsafe extern "C" fn gpio_pin_input(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::INPUT))
}

pub unsafe extern "C" fn gpio_pin_output(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::OUTPUT))
}

pub unsafe extern "C" fn gpio_pin_opendrain(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::OPEN_DRAIN))
}

pub unsafe extern "C" fn gpio_pin_pushpull(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::PUSH_PULL))
}

pub unsafe extern "C" fn gpio_pin_tristate(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::TRISTATE))
}

pub unsafe extern "C" fn gpio_pin_pullup(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::PULL_UP))
}

pub unsafe extern "C" fn gpio_pin_pulldown(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::PULL_DOWN))
}

pub unsafe extern "C" fn gpio_pin_invin(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::INVERT_IN))
}

pub unsafe extern "C" fn gpio_pin_invout(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::INVERT_OUT))
}

pub unsafe extern "C" fn gpio_pin_pulsate(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int {
    with_unit(handle, -1, |unit| set_flags(unit, pin, PinFlags::PULSATE))
}
