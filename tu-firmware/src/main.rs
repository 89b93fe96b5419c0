//! tu-firmware
//!
//! Output engine firmware for the Raspberry Pi Pico 2. Wires the
//! `tu-outputs` library to real pins:
//!
//! 1. `sequence_task` stages clock gates and an octave pattern through the
//!    public `Outputs` API, the way the module's apps would.
//! 2. `control_task` ticks at the control rate and calls `Outputs::update()`,
//!    which pushes all six values to the board and records output 4 into
//!    the scope history.
//! 3. `monitor_task` stands in for the display layer: it reads the history
//!    and states at a slow rate and logs them.
//!
//! Calibration points are seeded with nominal codes at boot. Loading
//! measured points from flash is not implemented in this stage.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Spi};
use embassy_time::{Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tu_outputs::outputs::{
    CalibrationData, Channel, HardwareModel, OutputConfig, OutputSink, Outputs, HISTORY_DEPTH,
    NUM_CHANNELS,
};

// ---------------------------------------------------------------------------
// Boot block
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Control loop period. 60 µs ≈ 16.7 kHz.
const CONTROL_PERIOD_US: u64 = 60;

/// Clock/pattern step period for the demo sequence.
const SEQUENCE_STEP_MS: u64 = 250;

/// Display-layer polling period.
const MONITOR_PERIOD_MS: u64 = 500;

/// Nominal DAC codes at -4 V, -2 V, 0 V, +2 V, +4 V before calibration.
const NOMINAL_CALIBRATION: [u16; 5] = [408, 1228, 2048, 2868, 3688];

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Calibration points, owned here and borrowed by the output engine.
static CALIBRATION: CalibrationData = CalibrationData::new();

/// Output engine. Written by the sequence task, committed by the control
/// task, read by the monitor task. Lock-free, so no mutex.
static OUTPUTS: StaticCell<Outputs<'static>> = StaticCell::new();

// ---------------------------------------------------------------------------
// Hardware sink
// ---------------------------------------------------------------------------

/// Five clock/gate pins and the SPI DAC behind output 4.
struct BoardSink {
    gates: [Output<'static>; 5],
    dac: Spi<'static, SPI0, spi::Blocking>,
    dac_cs: Output<'static>,
}

impl BoardSink {
    fn gate(&mut self, idx: usize, data: u8) {
        let level = if data > 0 { Level::High } else { Level::Low };
        self.gates[idx].set_level(level);
    }
}

impl OutputSink for BoardSink {
    fn set_output1(&mut self, data: u8) {
        self.gate(0, data);
    }

    fn set_output2(&mut self, data: u8) {
        self.gate(1, data);
    }

    fn set_output3(&mut self, data: u8) {
        self.gate(2, data);
    }

    fn set_output4(&mut self, data: u16) {
        self.dac_cs.set_low();
        // No status from the DAC; a failed frame is simply resent next cycle.
        let _ = self.dac.blocking_write(&data.to_be_bytes());
        self.dac_cs.set_high();
    }

    fn set_output5(&mut self, data: u8) {
        self.gate(3, data);
    }

    fn set_output6(&mut self, data: u8) {
        self.gate(4, data);
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Fixed-rate commit loop. Never blocks beyond the ticker.
#[embassy_executor::task]
async fn control_task(outputs: &'static Outputs<'static>, mut sink: BoardSink) {
    info!("Control task started ({} us period)", CONTROL_PERIOD_US);

    let mut ticker = Ticker::every(Duration::from_micros(CONTROL_PERIOD_US));
    loop {
        outputs.update(&mut sink);
        ticker.next().await;
    }
}

/// Demo sequence: square clocks on the gate outputs and an octave
/// staircase on the pitch output.
#[embassy_executor::task]
async fn sequence_task(outputs: &'static Outputs<'static>) {
    let pitch = outputs.config().pitch_channel;
    let mut step: u32 = 0;

    loop {
        for channel in Channel::ALL {
            if channel == pitch {
                continue;
            }
            // Each gate runs at half the rate of the one before it.
            let divisor = 1 << channel.index();
            let high = (step / divisor) % 2 == 0;
            outputs.set(channel, if high { u32::from(u8::MAX) } else { 0 });
            outputs.set_state(channel, u32::from(high));
        }

        let octave = (step % 5) as i32 - 2;
        outputs.set_octave(pitch, octave);
        outputs.set_state(pitch, 1);

        step = step.wrapping_add(1);
        Timer::after(Duration::from_millis(SEQUENCE_STEP_MS)).await;
    }
}

/// Slow reader standing in for the display layer.
#[embassy_executor::task]
async fn monitor_task(outputs: &'static Outputs<'static>) {
    let recorded = outputs.config().recorded_channel;
    let mut history = [0u16; HISTORY_DEPTH];

    loop {
        Timer::after(Duration::from_millis(MONITOR_PERIOD_MS)).await;

        outputs.read_history(recorded, &mut history);
        let states: [u32; NUM_CHANNELS] = core::array::from_fn(|i| outputs.state(Channel::ALL[i]));

        debug!("history {}: {}", recorded, history);
        debug!("states: {}", states);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// Hardware variant chosen at build time, resolved once here.
fn hardware_model() -> HardwareModel {
    if cfg!(feature = "mod-offset") {
        HardwareModel::ModOffset
    } else if cfg!(feature = "model-2tt") {
        HardwareModel::TwoTt
    } else {
        HardwareModel::Standard
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("tu-firmware starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // OUT1..3 → GP2, GP3, GP4   clock/gate
    // OUT5..6 → GP5, GP6        clock/gate
    // DAC_CS  → GP17
    // DAC_SCK → GP18 (SPI0)
    // DAC_TX  → GP19 (SPI0)
    // ———————————————————————————————————————————————————————————————————————

    let gates = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
        Output::new(p.PIN_6, Level::Low),
    ];

    let mut spi_config = spi::Config::default();
    spi_config.frequency = 20_000_000;
    let dac = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let dac_cs = Output::new(p.PIN_17, Level::High);

    let sink = BoardSink { gates, dac, dac_cs };

    // —— Calibration ————————————————————————————————————————————————————————

    if let Err(e) = CALIBRATION.set_points(0, NOMINAL_CALIBRATION) {
        error!("Could not seed calibration: {}", e);
    }

    let model = hardware_model();
    info!("Hardware model: {}", model);

    let outputs: &'static Outputs<'static> =
        OUTPUTS.init(Outputs::new(&CALIBRATION, OutputConfig::for_model(model)));
    let scale = outputs.compute_octave_scale();
    info!(
        "Octave scale {} codes, zero offset {}",
        scale,
        outputs.zero_offset(outputs.config().pitch_channel)
    );

    // Outputs idle at 0 V until the sequence task takes over.
    outputs.zero_all();

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(control_task(outputs, sink)).unwrap();
    spawner.spawn(sequence_task(outputs)).unwrap();
    spawner.spawn(monitor_task(outputs)).unwrap();

    info!("All tasks spawned");
}
