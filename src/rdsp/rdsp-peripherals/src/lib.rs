#![cfg_attr(not(any(test, feature = "host-interrupts")), no_std)]

pub mod breakpoints;

#[cfg(feature = "host-interrupts")]
pub mod host_irq;
