//! Text content of the 16x2 character display.
//!
//! Screens are plain values; the firmware display task turns them into
//! rows with [`Screen::layout`] and plays scrolling rows frame by frame.

use crate::types::AlarmReason;

pub const LCD_COLUMNS: usize = 16;

/// Custom glyph slots loaded into the controller's character RAM.
pub const GLYPH_OK: u8 = 0x00;
pub const GLYPH_FAIL: u8 = 0x01;

const SCROLL_LEAD_IN: usize = 3;
const SCANNING_FRAME_MS: u32 = 375;
const ALERT_FRAME_MS: u32 = 250;

pub type LcdRow = [u8; LCD_COLUMNS];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    /// Connectivity row plus the idle "Scan Card" prompt.
    Status { link: bool, session: bool },
    ConnectingToWifi,
    PortalOpen,
    InvalidBroker,
    Restarting,
    Scanning,
    ValidScan,
    InvalidScan(AlarmReason),
    ScanWindowPassed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RowContent {
    Text(LcdRow),
    Scroll {
        message: &'static str,
        frame_delay_ms: u32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenLayout {
    /// `None` leaves the top row as it is.
    pub top: Option<RowContent>,
    pub bottom: RowContent,
}

impl Screen {
    pub fn layout(self) -> ScreenLayout {
        match self {
            Self::Status { link, session } => ScreenLayout {
                top: Some(RowContent::Text(status_row(link, session))),
                bottom: text("   Scan Card    "),
            },
            Self::ConnectingToWifi => both(" Connecting to  ", "    WiFi....    "),
            Self::PortalOpen => both(" ! A.P. Mode !  ", "Set WiFi & MQTT "),
            Self::InvalidBroker => both("Enter valid MQTT", " Domain/IP Addr "),
            Self::Restarting => both("   Restarting   ", "     Device     "),
            Self::Scanning => ScreenLayout {
                top: Some(RowContent::Text(status_row(true, true))),
                bottom: RowContent::Scroll {
                    message: "Scanning and verifying sentry ID..",
                    frame_delay_ms: SCANNING_FRAME_MS,
                },
            },
            Self::ValidScan => ScreenLayout {
                top: None,
                bottom: RowContent::Scroll {
                    message: "Valid scan! Continue to next checkpoint..",
                    frame_delay_ms: SCANNING_FRAME_MS,
                },
            },
            Self::InvalidScan(reason) => ScreenLayout {
                top: Some(RowContent::Text(pad(" INVALID SCAN!  "))),
                bottom: invalid_scan_row(reason),
            },
            Self::ScanWindowPassed => both("SENTRY VERIFYING", " WINDOW PASSED! "),
        }
    }

    /// Alarm screens keep scrolling until replaced; other scrolls play once
    /// to completion.
    pub fn repeats(self) -> bool {
        matches!(self, Self::InvalidScan(_))
    }
}

fn invalid_scan_row(reason: AlarmReason) -> RowContent {
    match reason {
        AlarmReason::UnknownCard => text("  UNKNOWN ID!   "),
        AlarmReason::StolenCard => text("  STOLEN CARD!  "),
        AlarmReason::WrongCheckpoint => RowContent::Scroll {
            message: "WRONG CHECKPOINT!",
            frame_delay_ms: ALERT_FRAME_MS,
        },
        AlarmReason::WrongTime => RowContent::Scroll {
            message: "WRONG TIME OF SCAN!",
            frame_delay_ms: ALERT_FRAME_MS,
        },
        AlarmReason::NoShiftScan => text("NO ONGOING SHIFT"),
        AlarmReason::OverdueScan | AlarmReason::None => text(""),
    }
}

fn status_row(link: bool, session: bool) -> LcdRow {
    let mut row = pad("WiFi:   MQTT:   ");
    row[6] = glyph(link);
    row[14] = glyph(session);
    row
}

const fn glyph(ok: bool) -> u8 {
    if ok {
        GLYPH_OK
    } else {
        GLYPH_FAIL
    }
}

fn both(top: &str, bottom: &str) -> ScreenLayout {
    ScreenLayout {
        top: Some(RowContent::Text(pad(top))),
        bottom: text(bottom),
    }
}

fn text(row: &str) -> RowContent {
    RowContent::Text(pad(row))
}

/// Left-aligns `text` into a row, space padded and cut at the row width.
pub fn pad(text: &str) -> LcdRow {
    let mut row = [b' '; LCD_COLUMNS];
    for (slot, byte) in row.iter_mut().zip(text.bytes()) {
        *slot = byte;
    }
    row
}

/// Frames of a scrolling message: a three-space lead-in, one trailing
/// space, and the window advancing one column per frame until the tail of
/// the message has passed the left third of the display.
pub fn scroll_frames(message: &str) -> ScrollFrames<'_> {
    let padded_len = SCROLL_LEAD_IN + message.len() + 1;
    ScrollFrames {
        message: message.as_bytes(),
        position: 0,
        frame_count: padded_len.saturating_sub(LCD_COLUMNS - SCROLL_LEAD_IN),
    }
}

pub struct ScrollFrames<'a> {
    message: &'a [u8],
    position: usize,
    frame_count: usize,
}

impl Iterator for ScrollFrames<'_> {
    type Item = LcdRow;

    fn next(&mut self) -> Option<LcdRow> {
        if self.position >= self.frame_count {
            return None;
        }
        let mut row = [b' '; LCD_COLUMNS];
        for (column, slot) in row.iter_mut().enumerate() {
            let index = self.position + column;
            if index >= SCROLL_LEAD_IN {
                if let Some(byte) = self.message.get(index - SCROLL_LEAD_IN) {
                    *slot = *byte;
                }
            }
        }
        self.position += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame_count - self.position.min(self.frame_count);
        (remaining, Some(remaining))
    }
}
