// Copyright (c) 2024 The freebsd-gpio Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw `libgpio` interface: the `gpio_config_t` record, the `<sys/gpio.h>`
//! mode bits and the function surface of [`gpio(3)`].
//!
//! Everything in this module must stay binary-compatible with the system
//! headers. The numeric values are a fixed external contract and must not
//! be renumbered.
//!
//! [`gpio(3)`]: https://man.freebsd.org/cgi/man.cgi?query=gpio&sektion=3

use bitflags::bitflags;
use libc::{c_char, c_int, c_uint};

/// Size of the pin name buffer, terminator included (`GPIOMAXNAME`).
pub const GPIO_MAX_NAME_SIZE: usize = 64;

/// Returned by [`gpio_open`]/[`gpio_open_device`] when the controller
/// device cannot be opened.
pub const GPIO_INVALID_HANDLE: gpio_handle_t = -1;

/// Returned by [`gpio_pin_get`] when no valid logic level could be read.
pub const GPIO_VALUE_INVALID: c_int = -1;
pub const GPIO_VALUE_LOW: c_int = 0;
pub const GPIO_VALUE_HIGH: c_int = 1;

pub type gpio_handle_t = c_int;
pub type gpio_pin_t = u32;

bitflags! {
    /// Pin mode bits
    ///
    /// Maps to the kernel [`GPIO_PIN_*`] flags. The same set describes both
    /// what a pin is capable of (`caps`) and what it is currently configured
    /// to do (`flags`); a configuration is only accepted when it stays
    /// within the capability mask.
    ///
    /// [`GPIO_PIN_*`]: https://cgit.freebsd.org/src/tree/sys/sys/gpio.h
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct PinFlags: u32 {
        const INPUT = 0x0001;
        const OUTPUT = 0x0002;
        const OPEN_DRAIN = 0x0004;
        const PUSH_PULL = 0x0008;
        const TRISTATE = 0x0010;
        const PULL_UP = 0x0020;
        const PULL_DOWN = 0x0040;
        const INVERT_IN = 0x0080;
        const INVERT_OUT = 0x0100;
        const PULSATE = 0x0200;
    }
}

/// Mirror of `gpio_config_t`.
///
/// Crosses the FFI boundary by pointer; field order and sizes must match
/// `<libgpio.h>` exactly. `PinFlags` is `repr(transparent)` over `u32`, so
/// embedding it keeps the C layout.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct gpio_config {
    pub g_pin: gpio_pin_t,
    pub g_name: [u8; GPIO_MAX_NAME_SIZE],
    pub g_caps: PinFlags,
    pub g_flags: PinFlags,
}

impl gpio_config {
    pub const fn zeroed() -> Self {
        Self {
            g_pin: 0,
            g_name: [0; GPIO_MAX_NAME_SIZE],
            g_caps: PinFlags::empty(),
            g_flags: PinFlags::empty(),
        }
    }
}

impl Default for gpio_config {
    #[inline(always)]
    fn default() -> Self {
        Self::zeroed()
    }
}

// Linking against libgpio is arranged by the build script on FreeBSD
// targets; see build.rs.
extern "C" {
    pub fn gpio_open(unit: c_uint) -> gpio_handle_t;
    pub fn gpio_open_device(device: *const c_char) -> gpio_handle_t;
    pub fn gpio_close(handle: gpio_handle_t);

    pub fn gpio_pin_list(handle: gpio_handle_t, configs: *mut *mut gpio_config) -> c_int;
    pub fn gpio_pin_config(handle: gpio_handle_t, config: *mut gpio_config) -> c_int;
    pub fn gpio_pin_set_name(handle: gpio_handle_t, pin: gpio_pin_t, name: *const c_char)
        -> c_int;
    pub fn gpio_pin_set_flags(handle: gpio_handle_t, config: *mut gpio_config) -> c_int;

    pub fn gpio_pin_get(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_set(handle: gpio_handle_t, pin: gpio_pin_t, value: c_int) -> c_int;
    pub fn gpio_pin_toggle(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;

    pub fn gpio_pin_low(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_high(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_input(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_output(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_opendrain(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_pushpull(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_tristate(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_pullup(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_pulldown(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_invin(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_invout(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
    pub fn gpio_pin_pulsate(handle: gpio_handle_t, pin: gpio_pin_t) -> c_int;
}
