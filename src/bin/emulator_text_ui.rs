use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use cursive::{CbSink, Cursive};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

use chip8_emulator::chip::{
    chip8::cursive_display::Display, chip8::Chip8Error, Chip, ChipWithCursiveDisplay,
    LoadProgramError,
};
use chip8_emulator::config::{ConfigArgs, ConfigError};
use chip8_emulator::logging;

/// Step by which Up and Down change the cycle period.
const SPEED_STEP: Duration = Duration::from_micros(100);

/// Runs a CHIP-8 program in the terminal.
///
/// Keys 1-4, q-r, a-f and z-v form the keypad, space releases all keys, Up and
/// Down change the speed and Esc quits.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Path to the program to load
    rom: PathBuf,

    /// Write logs to this file, the terminal belongs to the UI
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Errors that end the emulator.
#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not open log file: {0}")]
    Logging(#[source] std::io::Error),

    #[error(transparent)]
    InvalidProgram(#[from] LoadProgramError),

    #[error("Emulation stopped: {0}")]
    Emulation(#[from] Chip8Error),

    #[error("Emulation thread panicked")]
    Panicked,
}

/// Represents an event to be processed by the event loop. It is generic
/// over the type representing the pressed key.
enum Event<T> {
    /// Occurs when the key passed in the enum value was pressed.
    Key(T),

    /// Indicates that all keys are released. The terminal does not report
    /// key releases, so one key is assigned to release all keys.
    KeyRelease,

    /// Decreases the time budget of each cycle.
    SpeedUp,

    /// Increases the time budget of each cycle.
    SlowDown,

    /// Shut down.
    Quit,
}

/// Represents the channels available to the event loop. It is generic
/// over the type representing the pressed keys.
struct EventLoopChannels<T> {
    /// The channel to send the UI refresh messages to.
    gfx_sender: CbSink,

    /// The channel on which the Events are received.
    key_receiver: Receiver<Event<T>>,

    /// A channel to report that the thread has completed
    /// shutdown.
    shutdown_sender: Sender<()>,
}

/// The event loop. Constantly loops over (1) process event if there
/// is any. (2) Invoke cycle on the chip. (3) Update the UI. (4) Sleep
/// for what is left of the cycle period. (5) Start over.
fn event_loop<T, P>(
    chip: &mut T,
    io_channels: &EventLoopChannels<P>,
    mut cycle_period: Duration,
) -> Result<(), T::Error>
where
    T: Chip<PinAddress = P> + ChipWithCursiveDisplay,
{
    loop {
        let start = Instant::now();

        match io_channels.key_receiver.try_recv() {
            Ok(Event::Key(key)) => {
                chip.set_input_pin(key, true)?;
            }
            Ok(Event::KeyRelease) => {
                chip.reset_input_pins();
            }
            Ok(Event::Quit) | Err(TryRecvError::Disconnected) => {
                let _ = io_channels.shutdown_sender.send(());
                return Ok(());
            }
            Ok(Event::SpeedUp) => {
                if cycle_period > SPEED_STEP {
                    cycle_period -= SPEED_STEP;
                }
                debug!(?cycle_period, "speed up");
            }
            Ok(Event::SlowDown) => {
                cycle_period += SPEED_STEP;
                debug!(?cycle_period, "slow down");
            }
            Err(TryRecvError::Empty) => { /* do nothing */ }
        };

        chip.cycle()?;
        if !chip.update_ui(&io_channels.gfx_sender) {
            return Ok(());
        }

        if let Some(remaining) = cycle_period.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

/// Constructs the UI and spawns the event loop and the UI thread.
fn run(args: Args) -> Result<(), Error> {
    let config = args.config.load()?;
    if let Some(log_file) = &args.log_file {
        logging::init_file(&config.log_filter, log_file).map_err(Error::Logging)?;
    }

    let mut chip8 = config.build_chip();
    chip8.load_program(&args.rom)?;

    let mut siv = cursive::default();

    let cb_sink = siv.cb_sink().clone();
    let (key_sender, key_receiver) = bounded::<Event<u8>>(10);
    let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);
    let cycle_period = config.cycle_period();

    info!(rom = %args.rom.display(), ?cycle_period, "starting emulation");
    let emulation = thread::spawn(move || {
        let io_channels = EventLoopChannels {
            gfx_sender: cb_sink,
            key_receiver,
            shutdown_sender,
        };
        let result = event_loop(&mut chip8, &io_channels, cycle_period);
        if let Err(e) = &result {
            error!(error = %e, "emulation failed");
            let _ = io_channels
                .gfx_sender
                .send(Box::new(|s: &mut Cursive| s.quit()));
        }
        result
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Esc, move |s| {
        // Once the event loop has stopped on its own, both calls fail immediately.
        let _ = sender.send(Event::Quit);
        let _ = shutdown_receiver.recv();
        s.quit();
    });

    for (i, j) in &[
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ] {
        let sender = key_sender.clone();
        let key: u8 = *j;
        siv.add_global_callback(*i, move |_s| {
            let _ = sender.send(Event::Key(key));
        });
    }

    let sender = key_sender.clone();
    siv.add_global_callback(' ', move |_s| {
        let _ = sender.send(Event::KeyRelease);
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Up, move |_s| {
        let _ = sender.send(Event::SpeedUp);
    });

    let sender = key_sender;
    siv.add_global_callback(cursive::event::Key::Down, move |_s| {
        let _ = sender.send(Event::SlowDown);
    });

    siv.add_layer(Display::default());

    siv.run();

    match emulation.join() {
        Ok(result) => result.map_err(Error::from),
        Err(_) => Err(Error::Panicked),
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip8_emulator::chip::chip8::Chip8;
    use crossbeam_channel::unbounded;

    type UiCallback = Box<dyn FnOnce(&mut Cursive) + Send>;

    struct Harness {
        channels: EventLoopChannels<u8>,
        keys: Sender<Event<u8>>,
        ui: Receiver<UiCallback>,
        shutdown: Receiver<()>,
    }

    fn harness() -> Harness {
        let (gfx_sender, ui) = unbounded::<UiCallback>();
        let (keys, key_receiver) = unbounded();
        let (shutdown_sender, shutdown) = bounded(1);
        Harness {
            channels: EventLoopChannels {
                gfx_sender,
                key_receiver,
                shutdown_sender,
            },
            keys,
            ui,
            shutdown,
        }
    }

    fn chip_with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_program_bytes(program).unwrap();
        chip8
    }

    #[test]
    fn test_quit_signals_shutdown() {
        let harness = harness();
        let mut chip8 = chip_with_program(&[0x12, 0x00]);

        harness.keys.send(Event::Quit).unwrap();
        assert_eq!(event_loop(&mut chip8, &harness.channels, Duration::ZERO), Ok(()));
        assert!(harness.shutdown.try_recv().is_ok());
    }

    #[test]
    fn test_disconnected_keys_stop_the_loop() {
        let Harness {
            channels, keys, ..
        } = harness();
        let mut chip8 = chip_with_program(&[0x12, 0x00]);

        drop(keys);
        assert_eq!(event_loop(&mut chip8, &channels, Duration::ZERO), Ok(()));
    }

    #[test]
    fn test_key_events_drive_input_pins() {
        // 0x200: V3 = next key, 0x202: jump to 0x200
        let harness = harness();
        let mut chip8 = chip_with_program(&[0xF3, 0x0A, 0x12, 0x00]);

        harness.keys.send(Event::Key(0x5)).unwrap();
        harness.keys.send(Event::Quit).unwrap();
        event_loop(&mut chip8, &harness.channels, Duration::ZERO).unwrap();
        assert_eq!(chip8.register(3), Ok(0x5));
        assert_eq!(chip8.program_counter(), 0x202);

        // the key is still held, so the next wait returns at once
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.program_counter(), 0x202);
    }

    #[test]
    fn test_key_release_releases_all_keys() {
        // 0x200: jump to itself
        let harness = harness();
        let mut chip8 = chip_with_program(&[0x12, 0x00]);

        harness.keys.send(Event::Key(0x5)).unwrap();
        harness.keys.send(Event::Key(0xA)).unwrap();
        harness.keys.send(Event::KeyRelease).unwrap();
        harness.keys.send(Event::Quit).unwrap();
        event_loop(&mut chip8, &harness.channels, Duration::ZERO).unwrap();

        // waiting for a key with none held does not advance
        chip8.load_program_bytes(&[0xF3, 0x0A]).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.program_counter(), 0x200);
    }

    #[test]
    fn test_emulation_error_ends_the_loop() {
        let harness = harness();
        let mut chip8 = chip_with_program(&[0x51, 0x21]);

        assert_eq!(
            event_loop(&mut chip8, &harness.channels, Duration::ZERO),
            Err(Chip8Error::UnsupportedOpcode(0x5121))
        );

        let mut chip8 = chip_with_program(&[0x12, 0x00]);
        harness.keys.send(Event::Key(0x10)).unwrap();
        assert_eq!(
            event_loop(&mut chip8, &harness.channels, Duration::ZERO),
            Err(Chip8Error::InvalidKey(0x10))
        );
    }

    #[test]
    fn test_closed_ui_stops_the_loop() {
        // 0x200: clear the screen, 0x202: jump to itself
        let Harness {
            channels,
            keys: _keys,
            ui,
            ..
        } = harness();
        let mut chip8 = chip_with_program(&[0x00, 0xE0, 0x12, 0x02]);

        drop(ui);
        assert_eq!(event_loop(&mut chip8, &channels, Duration::ZERO), Ok(()));
        assert_eq!(chip8.program_counter(), 0x202);
    }

    #[test]
    fn test_redraw_is_sent_to_the_ui() {
        let harness = harness();
        let mut chip8 = chip_with_program(&[0x00, 0xE0, 0x12, 0x02]);

        harness.keys.send(Event::SpeedUp).unwrap();
        harness.keys.send(Event::SlowDown).unwrap();
        harness.keys.send(Event::Quit).unwrap();
        event_loop(&mut chip8, &harness.channels, Duration::ZERO).unwrap();

        assert_eq!(harness.ui.try_iter().count(), 1);
    }
}
