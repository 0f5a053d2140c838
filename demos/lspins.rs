// Copyright (c) 2024 The freebsd-gpio Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! List every GPIO controller and its pins, in the spirit of gpioctl -l.

#[cfg(target_os = "freebsd")]
fn main() {
    use freebsd_gpio::controllers;

    let iter = match controllers() {
        Ok(iter) => iter,
        Err(e) => {
            eprintln!("failed to scan /dev: {e}");
            return;
        }
    };

    for ctl in iter {
        let ctl = match ctl {
            Ok(ctl) => ctl,
            Err(e) => {
                eprintln!("skipping controller: {e}");
                continue;
            }
        };
        match ctl.pins() {
            Ok(pins) => {
                println!("{}: {} pins", ctl.device(), pins.len());
                for pin in pins {
                    println!("  {pin}");
                }
            }
            Err(e) => eprintln!("{}: could not list pins: {e}", ctl.device()),
        }
    }
}

#[cfg(not(target_os = "freebsd"))]
fn main() {
    eprintln!("lspins walks /dev/gpiocN and only runs on FreeBSD");
}
