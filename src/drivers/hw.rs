//! One-shot peripheral initialisation and raw output helpers.
//!
//! Configures the servo LEDC channel, the MP3 UART, the LED ring RMT
//! channel, and the fault LED GPIO using raw ESP-IDF sys calls.  Called
//! once from `main()` before the control loop starts.
//!
//! On non-espidf targets every helper is a state-free no-op so the
//! drivers above remain host-testable.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::error::Error;
use crate::error::Result;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
use log::info;

// ── Servo LEDC parameters ─────────────────────────────────────

/// 50 Hz servo frame, 14-bit duty resolution.
#[cfg(target_os = "espidf")]
const SERVO_LEDC_FREQ_HZ: u32 = 50;
#[cfg(target_os = "espidf")]
const SERVO_LEDC_RES_BITS: u32 = 14;

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_outputs() -> Result<()> {
    // SAFETY: called once from main() before the control loop; single
    // threaded at this point.
    unsafe {
        init_servo_ledc()?;
        init_mp3_uart()?;
        init_strip_rmt()?;
        init_fault_gpio()?;
    }
    info!("hw: all output peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_outputs() -> Result<()> {
    log::info!("hw(sim): output peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_servo_ledc() -> Result<()> {
    let timer_cfg = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        duty_resolution: SERVO_LEDC_RES_BITS,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        freq_hz: SERVO_LEDC_FREQ_HZ,
        clk_cfg: ledc_clk_cfg_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    if unsafe { ledc_timer_config(&timer_cfg) } != ESP_OK as i32 {
        return Err(Error::Init("servo LEDC timer config failed"));
    }

    let ch_cfg = ledc_channel_config_t {
        gpio_num: pins::SERVO_PWM_GPIO,
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    if unsafe { ledc_channel_config(&ch_cfg) } != ESP_OK as i32 {
        return Err(Error::Init("servo LEDC channel config failed"));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_mp3_uart() -> Result<()> {
    let uart_cfg = uart_config_t {
        baud_rate: 9600,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    unsafe {
        if uart_param_config(uart_port_t_UART_NUM_1, &uart_cfg) != ESP_OK as i32
            || uart_set_pin(
                uart_port_t_UART_NUM_1,
                pins::MP3_UART_TX_GPIO,
                pins::MP3_UART_RX_GPIO,
                -1,
                -1,
            ) != ESP_OK as i32
            || uart_driver_install(uart_port_t_UART_NUM_1, 256, 0, 0, core::ptr::null_mut(), 0)
                != ESP_OK as i32
        {
            return Err(Error::Init("MP3 UART init failed"));
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
static mut STRIP_RMT_CHANNEL: rmt_channel_t = rmt_channel_t_RMT_CHANNEL_0;

#[cfg(target_os = "espidf")]
unsafe fn init_strip_rmt() -> Result<()> {
    // 80 MHz / 4 = 20 MHz → 50 ns per RMT tick; WS2812/APA106 bit times
    // are expressed in these ticks below.
    let mut cfg = rmt_config_t {
        rmt_mode: rmt_mode_t_RMT_MODE_TX,
        channel: unsafe { STRIP_RMT_CHANNEL },
        gpio_num: pins::LED_DATA_GPIO,
        clk_div: 4,
        mem_block_num: 1,
        ..Default::default()
    };
    // SAFETY: tx_config is the active union member for RMT_MODE_TX.
    unsafe {
        cfg.__bindgen_anon_1.tx_config.carrier_en = false;
        cfg.__bindgen_anon_1.tx_config.idle_output_en = true;
        cfg.__bindgen_anon_1.tx_config.idle_level = rmt_idle_level_t_RMT_IDLE_LEVEL_LOW;
    }

    unsafe {
        if rmt_config(&cfg) != ESP_OK as i32
            || rmt_driver_install(STRIP_RMT_CHANNEL, 0, 0) != ESP_OK as i32
        {
            return Err(Error::Init("LED strip RMT init failed"));
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_fault_gpio() -> Result<()> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::FAULT_LED_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    if unsafe { gpio_config(&cfg) } != ESP_OK as i32 {
        return Err(Error::Init("fault LED GPIO config failed"));
    }
    Ok(())
}

// ── Servo output ──────────────────────────────────────────────

/// Set the servo pulse width in microseconds (one 20 ms frame).
#[cfg(target_os = "espidf")]
pub fn servo_set_pulse_us(pulse_us: u32) -> bool {
    let max_duty = (1u32 << SERVO_LEDC_RES_BITS) - 1;
    let duty = pulse_us * SERVO_LEDC_FREQ_HZ * max_duty / 1_000_000;
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0,
            duty,
        ) == ESP_OK as i32
            && ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0)
                == ESP_OK as i32
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn servo_set_pulse_us(_pulse_us: u32) -> bool {
    true
}

// ── MP3 UART output ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn mp3_send(frame: &[u8]) {
    unsafe {
        uart_write_bytes(
            uart_port_t_UART_NUM_1,
            frame.as_ptr().cast(),
            frame.len(),
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn mp3_send(_frame: &[u8]) {}

// ── LED strip output ──────────────────────────────────────────

/// Push one GRB frame out through RMT.  Blocking for the ~30 µs/LED
/// transmission, which is negligible at the control tick rate.
#[cfg(target_os = "espidf")]
pub fn strip_write(frame: &[(u8, u8, u8)]) {
    // 50 ns ticks: 0-bit = 7/16, 1-bit = 14/6 (high/low), per APA106.
    const T0H: u32 = 7;
    const T0L: u32 = 16;
    const T1H: u32 = 14;
    const T1L: u32 = 6;

    let mut items: heapless::Vec<rmt_item32_t, { 64 * 24 }> = heapless::Vec::new();
    for &(r, g, b) in frame {
        for byte in [g, r, b] {
            for bit in (0..8).rev() {
                let one = byte & (1 << bit) != 0;
                let mut item = rmt_item32_t::default();
                let (high, low) = if one { (T1H, T1L) } else { (T0H, T0L) };
                // SAFETY: the bitfield view is the active union member.
                unsafe {
                    item.__bindgen_anon_1.__bindgen_anon_1.set_duration0(high);
                    item.__bindgen_anon_1.__bindgen_anon_1.set_level0(1);
                    item.__bindgen_anon_1.__bindgen_anon_1.set_duration1(low);
                    item.__bindgen_anon_1.__bindgen_anon_1.set_level1(0);
                }
                if items.push(item).is_err() {
                    return; // frame larger than MAX_LEDS — config rejects this
                }
            }
        }
    }
    unsafe {
        rmt_write_items(
            STRIP_RMT_CHANNEL,
            items.as_ptr(),
            items.len() as i32,
            true,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn strip_write(_frame: &[(u8, u8, u8)]) {}

// ── Fault LED ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn fault_led_write(on: bool) {
    unsafe {
        gpio_set_level(pins::FAULT_LED_GPIO, u32::from(on));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn fault_led_write(_on: bool) {}

// ── Monotonic time ────────────────────────────────────────────

/// Milliseconds since boot, truncated to u32 (wrapping after ~49 days).
#[cfg(target_os = "espidf")]
pub fn now_ms() -> u32 {
    unsafe { (esp_timer_get_time() / 1000) as u32 }
}

#[cfg(not(target_os = "espidf"))]
pub fn now_ms() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}
