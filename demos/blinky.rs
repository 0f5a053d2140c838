// Copyright (c) 2024 The freebsd-gpio Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Toggle a pin on a period, leaving it low when done.

#[cfg(target_os = "freebsd")]
mod blink {
    use freebsd_gpio::Controller;
    use quicli::prelude::*;
    use std::path::PathBuf;
    use std::thread::sleep;
    use std::time::{Duration, Instant};
    use structopt::StructOpt;

    #[derive(Debug, StructOpt)]
    pub struct Cli {
        /// The gpioc device (e.g. /dev/gpioc0)
        device: PathBuf,
        /// The pin number on that controller
        pin: u32,
        /// Half-period in milliseconds
        period_ms: u64,
        /// Duration over which to blink in milliseconds
        duration_ms: u64,
    }

    fn do_main(args: Cli) -> freebsd_gpio::Result<()> {
        let ctl = Controller::open_device(&args.device)?;
        ctl.set_output(args.pin)?;

        let duration = Duration::from_millis(args.duration_ms);
        let start = Instant::now();
        while start.elapsed() < duration {
            ctl.toggle(args.pin)?;
            sleep(Duration::from_millis(args.period_ms));
        }

        ctl.set_low(args.pin)
    }

    pub fn run() -> CliResult {
        let args = Cli::from_args();
        do_main(args).or_else(|e| {
            error!("{:?}", e);
            Ok(())
        })
    }
}

#[cfg(target_os = "freebsd")]
fn main() -> quicli::prelude::CliResult {
    blink::run()
}

#[cfg(not(target_os = "freebsd"))]
fn main() {
    eprintln!("blinky drives /dev/gpiocN and only runs on FreeBSD");
}
