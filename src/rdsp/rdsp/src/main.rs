extern crate clap;
use crossbeam_channel::bounded; // Inter-thread communication
use ctrlc; // exit using cntrl-c
use env_logger;
use log::{error, info};
use std::time::Duration;

// Internal project modules
use rdsp_binaries;
use rdsp_core::config::DspConfig;
use rdsp_core::decoder::BaseTable;
use rdsp_core::interpreter::Interpreter;
use rdsp_core::memory::mods::{ExceptionUnit, InterruptController};
use rdsp_core::state::CoreState;
use rdsp_core::utils::MASK_40;
use rdsp_peripherals::breakpoints::BreakpointList;
use rdsp_peripherals::host_irq::HostInterruptLine;

/// How batches are handed to the interpreter
enum RunMode {
    Fast,
    Debug,
    Thread,
}

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "GameCube/Wii audio DSP interpreter in Rust";
    clap::App::new("Rust DSP Emulator (RDSP)")
        .version("0.1")
        .about(description)
        .arg(
            clap::Arg::with_name("cycles")
                .long("cycles")
                .takes_value(true)
                .default_value("100000")
                .help("Total number of DSP steps to run"),
        )
        .arg(
            clap::Arg::with_name("batch")
                .long("batch")
                .takes_value(true)
                .default_value("1000")
                .help("Steps handed to the interpreter per call"),
        )
        .arg(
            clap::Arg::with_name("mode")
                .long("mode")
                .takes_value(true)
                .possible_values(&["fast", "debug", "thread"])
                .default_value("fast")
                .help("Interpreter run loop"),
        )
        .arg(
            clap::Arg::with_name("precise")
                .long("precise")
                .help("OR extended-slot writes into the current register values"),
        )
        .arg(
            clap::Arg::with_name("break")
                .long("break")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Stop in front of this address (debug mode)"),
        )
        .arg(
            clap::Arg::with_name("tick-ms")
                .long("tick-ms")
                .takes_value(true)
                .help("Raise the external interrupt every N milliseconds"),
        )
        .subcommand(clap::SubCommand::with_name("idle").about("Spin on an idle loop"))
        .subcommand(
            clap::SubCommand::with_name("mac").about("Multiply-accumulate in a block loop"),
        )
        .subcommand(
            clap::SubCommand::with_name("countdown").about("Count $ac0.m down to zero"),
        )
        .subcommand(
            clap::SubCommand::with_name("image")
                .about("Run a big-endian ucode image from disk")
                .arg(clap::Arg::with_name("PATH").required(true).index(1))
                .arg(
                    clap::Arg::with_name("base")
                        .long("base")
                        .takes_value(true)
                        .default_value("0x0000")
                        .help("Load address"),
                )
                .arg(
                    clap::Arg::with_name("entry")
                        .long("entry")
                        .takes_value(true)
                        .help("Start address (defaults to the load address)"),
                ),
        )
        .get_matches()
}

/// Accepts decimal or 0x-prefixed hex
fn parse_num(text: &str) -> Result<u64, &'static str> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|_| "Invalid number")
}

fn parse_addr(text: &str) -> Result<u16, &'static str> {
    let val = parse_num(text)?;
    if val > 0xFFFF {
        return Err("Address out of range");
    }
    Ok(val as u16)
}

/// Main entry point for the DSP emulator
fn main() {
    env_logger::init();

    // Set up Ctrl-C handler with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1); // Emergency exit if channel blocked
        }
        let _send_result = signal_sender.send(()); // Send shutdown signal
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        return;
    }

    // Parse command-line arguments
    let cli_matches = get_cli_config();

    let total_cycles = match parse_num(cli_matches.value_of("cycles").unwrap_or("100000")) {
        Ok(x) => x,
        Err(e) => {
            error!("--cycles: {}", e);
            return;
        }
    };
    let batch_size = match parse_num(cli_matches.value_of("batch").unwrap_or("1000")) {
        Ok(x) if x > 0 && x <= u32::MAX as u64 => x as u32,
        _ => {
            error!("--batch must be between 1 and {}", u32::MAX);
            return;
        }
    };
    let mode = match cli_matches.value_of("mode") {
        Some("debug") => RunMode::Debug,
        Some("thread") => RunMode::Thread,
        _ => RunMode::Fast,
    };

    let mut breakpoints = BreakpointList::new();
    if let Some(addrs) = cli_matches.values_of("break") {
        for text in addrs {
            let added = parse_addr(text).and_then(|addr| breakpoints.add(addr));
            if let Err(e) = added {
                error!("--break {}: {}", text, e);
                return;
            }
        }
    }

    let config = DspConfig::default().precise(
        cli_matches.is_present("precise") || DspConfig::default().precise_write_back,
    );

    // Exceptions only, or a periodic host interrupt on top
    let mut exception_unit = ExceptionUnit;
    let mut host_line;
    let interrupts: &mut dyn InterruptController = match cli_matches.value_of("tick-ms") {
        Some(text) => match parse_num(text) {
            Ok(ms) if ms > 0 => {
                host_line = HostInterruptLine::with_ticker(Duration::from_millis(ms));
                &mut host_line
            }
            _ => {
                error!("--tick-ms: expected a positive number of milliseconds");
                return;
            }
        },
        None => &mut exception_unit,
    };

    let table = BaseTable::new();
    let mut dsp = Interpreter::new(&config, &table, &breakpoints, interrupts);

    // Load the selected ucode
    let entry = match cli_matches.subcommand() {
        ("image", Some(args)) => {
            let path = args.value_of("PATH").unwrap_or_default();
            let base = match parse_addr(args.value_of("base").unwrap_or("0")) {
                Ok(x) => x,
                Err(e) => {
                    error!("--base: {}", e);
                    return;
                }
            };
            let entry = match args.value_of("entry").map(parse_addr) {
                Some(Ok(x)) => x,
                Some(Err(e)) => {
                    error!("--entry: {}", e);
                    return;
                }
                None => base,
            };

            let bytes = match std::fs::read(path) {
                Ok(x) => x,
                Err(e) => {
                    error!("Unable to read {}: {}", path, e);
                    return;
                }
            };
            if let Err(e) = dsp.load_image_bytes(base, &bytes) {
                error!("Unable to load {}: {}", path, e);
                return;
            }
            entry
        }
        (name, _) => match rdsp_binaries::find(name) {
            Some(ucode) => {
                if let Err(e) = dsp.load_image(ucode.base, ucode.words) {
                    error!("Unable to load {}: {}", ucode.name, e);
                    return;
                }
                ucode.entry
            }
            None => {
                error!("Invalid ucode specified");
                return;
            }
        },
    };

    dsp.boot(entry);
    info!("Running {} cycles from {:04x}", total_cycles, entry);

    // Main emulation loop
    let mut remaining = total_cycles;
    while remaining > 0 {
        if !signal_receiver.is_empty() {
            info!("Stopped by user");
            break;
        }

        // Unused budget is idle time; it counts as elapsed
        let batch = remaining.min(batch_size as u64) as u32;
        match mode {
            RunMode::Fast => dsp.run_cycles(batch),
            RunMode::Debug => dsp.run_cycles_debug(batch),
            RunMode::Thread => dsp.run_cycles_thread(batch),
        };
        remaining -= batch as u64;

        if dsp.state.is_halted() {
            info!("DSP halted at {:04x}", dsp.state.pc);
            break;
        }
        if dsp.state.core_state == CoreState::Stepping {
            info!("Breakpoint hit at {:04x}", dsp.state.pc);
            break;
        }
    }

    // Final register dump
    let r = &dsp.state.r;
    println!("pc   {:04x}  steps {}", dsp.state.pc, dsp.state.step_counter);
    println!(
        "ac0  {:010x}  ac1  {:010x}",
        r.get_long_acc(0) & MASK_40 as i64,
        r.get_long_acc(1) & MASK_40 as i64
    );
    println!(
        "ax0  {:04x}:{:04x}  ax1  {:04x}:{:04x}",
        r.ax[0].h, r.ax[0].l, r.ax[1].h, r.ax[1].l
    );
    println!("prod {:010x}", r.get_long_product() & MASK_40 as i64);
    println!("ar   {:04x?}", r.ar);
    println!("ix   {:04x?}", r.ix);
    println!("wr   {:04x?}", r.wr);
    println!("st   {:04x?}", r.st);
    println!("sr   {:04x}  cr   {:04x}", r.sr, dsp.state.control_reg);
}
