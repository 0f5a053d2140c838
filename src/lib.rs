// Copyright (c) 2024 The freebsd-gpio Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `freebsd-gpio` crate provides access to FreeBSD GPIO controllers
//! (`/dev/gpiocN`) through the system's [`libgpio`] library, see gpio(3)
//! and gpio(4).
//!
//! Every operation is a direct, blocking pass-through to one native call:
//! open a controller, enumerate its pins, read or change a pin's
//! configuration, and read, set or toggle its logic level. Return codes
//! are translated into typed errors carrying the OS error captured at the
//! moment of failure, and the `gpio_config_t` record is mirrored with its
//! exact C layout.
//!
//! # Examples
//!
//! List every pin of the first controller:
//!
//! ```no_run
//! # #[cfg(target_os = "freebsd")]
//! # fn list() -> freebsd_gpio::Result<()> {
//! use freebsd_gpio::Controller;
//!
//! let ctl = Controller::open(0)?;
//! for pin in ctl.pins()? {
//!     println!("{pin}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Configure a pin as an output and drive it:
//!
//! ```no_run
//! # #[cfg(target_os = "freebsd")]
//! # fn drive() -> freebsd_gpio::Result<()> {
//! use freebsd_gpio::{Controller, Value};
//!
//! let ctl = Controller::open(0)?;
//! ctl.set_output(16)?;
//! ctl.set_value(16, Value::High)?;
//! ctl.toggle(16)?;
//! # Ok(())
//! # }
//! ```
//!
//! Mode bits, logic levels and mode operations are three separate things
//! here: bits are [`PinFlags`] constants, levels are [`Value`] variants,
//! and operations are `set_*` methods on [`Controller`].
//!
//! [`libgpio`]: https://man.freebsd.org/cgi/man.cgi?query=gpio&sektion=3

mod errors;

pub mod fixed_str;

#[allow(non_camel_case_types)]
pub mod ffi;

pub mod controller;

#[cfg(test)]
pub(crate) mod sim;

pub use controller::{controllers, Controller, ControllerIterator, PinConfig, Value};
pub use errors::{Error, Result};
pub use ffi::PinFlags;
