//! GPIO / peripheral pin assignments for the Jackbox main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Momentary push button — active LOW with internal pull-up.
/// Pressed = pin pulled to ground.
pub const BUTTON_GPIO: i32 = 4;

/// PIR motion receptor — digital output, active HIGH while motion is sensed.
/// Internal pull-up keeps the line defined while the module warms up.
pub const RECEPTOR_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Release servo (activator)
// ---------------------------------------------------------------------------

/// LEDC PWM output for the release servo (50 Hz).
pub const SERVO_PWM_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// MP3 module (DFPlayer-mini style, UART1)
// ---------------------------------------------------------------------------

/// UART TX toward the MP3 module's RX.
pub const MP3_UART_TX_GPIO: i32 = 17;
/// UART RX from the MP3 module's TX (busy/ack frames).
pub const MP3_UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// LED ring
// ---------------------------------------------------------------------------

/// Data line of the addressable LED ring (APA106 / WS2812 compatible).
pub const LED_DATA_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Fault indication
// ---------------------------------------------------------------------------

/// On-board LED used as the crash heartbeat.  The only operator-visible
/// fault channel the device has.
pub const FAULT_LED_GPIO: i32 = 2;
