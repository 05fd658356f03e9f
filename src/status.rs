use std::fmt;

use modular_bitfield::prelude::*;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// Condition bitmask reported by a get-status call.
///
/// Flags are independent; any subset may be set at once. Bits 13..=31 are
/// reserved and surface only through [`StatusReport::raw`].
#[bitfield(bytes = 4)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusFlags {
    pub paper_delivery: bool,
    pub data_retrans: bool,
    pub cold: bool,
    pub no_cartridge: bool,
    pub no_paper: bool,
    pub paper_jam: bool,
    pub door_open: bool,
    pub toner_low: bool,
    pub hardware_bad: bool,
    pub manual_feed: bool,
    pub fuser_bad: bool,
    pub laser_bad: bool,
    pub motor_bad: bool,
    #[skip]
    reserved: B19,
}

/// Structured decode of the raw status response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Condition mask exactly as the device reported it.
    pub raw: u32,
    /// Page count accompanying a data-retransmit request.
    pub retrans_pages: u32,
    pub flags: StatusFlags,
}

impl StatusReport {
    /// Pure and total over all 32-bit masks.
    pub fn decode(raw: u32, retrans_pages: u32) -> Self {
        StatusReport {
            raw,
            retrans_pages,
            flags: StatusFlags::from_bytes(raw.to_le_bytes()),
        }
    }

    /// The engine reports ready only as the absence of every condition.
    pub fn ready(&self) -> bool {
        self.raw == 0
    }

    /// Human-readable line per active condition.
    pub fn conditions(&self) -> Vec<String> {
        if self.ready() {
            return vec!["Ready (no errors)".into()];
        }
        let f = self.flags;
        let mut lines = Vec::new();
        if f.paper_delivery() {
            lines.push("Printing (paper in path)".into());
        }
        if f.data_retrans() {
            lines.push(format!(
                "Data retransmit requested (pages={})",
                self.retrans_pages
            ));
        }
        if f.cold() {
            lines.push("Warming up (fixing assembly not hot)".into());
        }
        if f.no_cartridge() {
            lines.push("No cartridge".into());
        }
        if f.no_paper() {
            lines.push("No paper".into());
        }
        if f.paper_jam() {
            lines.push("Paper jam".into());
        }
        if f.door_open() {
            lines.push("Door open".into());
        }
        if f.toner_low() {
            lines.push("Toner low".into());
        }
        if f.hardware_bad() {
            lines.push("Hardware failure".into());
        }
        if f.manual_feed() {
            lines.push("Manual feed selected".into());
        }
        if f.fuser_bad() {
            lines.push("Fixing assembly malfunction".into());
        }
        if f.laser_bad() {
            lines.push("Laser/beam detect problem".into());
        }
        if f.motor_bad() {
            lines.push("Scanning motor malfunction".into());
        }
        lines
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Printer status:")?;
        for line in self.conditions() {
            write!(f, "\n  - {line}")?;
        }
        Ok(())
    }
}

/// Paper-size codes reported by a get-paper-size call.
///
/// Codes outside the named range are valid but unnamed; decoding never
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(i32)]
pub enum PaperSize {
    #[strum(to_string = "No cassette")]
    NoCassette = 0,
    A4 = 1,
    Letter = 2,
    B5 = 3,
    Legal = 4,
    #[num_enum(catch_all)]
    #[strum(to_string = "Unknown")]
    Unknown(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_size_names_the_known_codes() {
        assert_eq!(PaperSize::from(0), PaperSize::NoCassette);
        assert_eq!(PaperSize::from(1), PaperSize::A4);
        assert_eq!(PaperSize::from(2), PaperSize::Letter);
        assert_eq!(PaperSize::from(3), PaperSize::B5);
        assert_eq!(PaperSize::from(4), PaperSize::Legal);
    }

    #[test]
    fn paper_size_is_total_over_all_codes() {
        assert_eq!(PaperSize::from(99), PaperSize::Unknown(99));
        assert_eq!(PaperSize::from(-7), PaperSize::Unknown(-7));
        assert_eq!(i32::from(PaperSize::Unknown(99)), 99);
        assert_eq!(i32::from(PaperSize::Letter), 2);
    }

    #[test]
    fn paper_size_display() {
        assert_eq!(PaperSize::NoCassette.to_string(), "No cassette");
        assert_eq!(PaperSize::Letter.to_string(), "Letter");
        assert_eq!(PaperSize::Unknown(12).to_string(), "Unknown");
    }

    #[test]
    fn zero_mask_is_ready_and_nothing_else() {
        let report = StatusReport::decode(0, 0);
        assert!(report.ready());
        assert_eq!(report.conditions(), vec!["Ready (no errors)".to_string()]);
    }

    #[test]
    fn any_set_bit_clears_ready() {
        for bit in 0..32 {
            let report = StatusReport::decode(1 << bit, 0);
            assert!(!report.ready(), "bit {bit} should clear ready");
        }
    }

    #[test]
    fn each_defined_bit_maps_to_exactly_one_flag() {
        let accessors: [(u32, fn(&StatusFlags) -> bool); 13] = [
            (1 << 0, |f| f.paper_delivery()),
            (1 << 1, |f| f.data_retrans()),
            (1 << 2, |f| f.cold()),
            (1 << 3, |f| f.no_cartridge()),
            (1 << 4, |f| f.no_paper()),
            (1 << 5, |f| f.paper_jam()),
            (1 << 6, |f| f.door_open()),
            (1 << 7, |f| f.toner_low()),
            (1 << 8, |f| f.hardware_bad()),
            (1 << 9, |f| f.manual_feed()),
            (1 << 10, |f| f.fuser_bad()),
            (1 << 11, |f| f.laser_bad()),
            (1 << 12, |f| f.motor_bad()),
        ];
        for &(mask, _) in &accessors {
            let report = StatusReport::decode(mask, 0);
            for &(other_mask, other) in &accessors {
                assert_eq!(
                    other(&report.flags),
                    mask == other_mask,
                    "mask {mask:#x} checked against {other_mask:#x}"
                );
            }
        }
    }

    #[test]
    fn flags_are_independent() {
        // no-paper and door-open together; jam stays clear
        let report = StatusReport::decode((1 << 4) | (1 << 6), 0);
        assert!(report.flags.no_paper());
        assert!(report.flags.door_open());
        assert!(!report.flags.paper_jam());
        assert_eq!(
            report.conditions(),
            vec!["No paper".to_string(), "Door open".to_string()]
        );
    }

    #[test]
    fn retransmit_count_rides_with_its_flag() {
        let report = StatusReport::decode(1 << 1, 7);
        assert_eq!(
            report.conditions(),
            vec!["Data retransmit requested (pages=7)".to_string()]
        );
    }

    #[test]
    fn reserved_bits_are_kept_in_raw_only() {
        let report = StatusReport::decode(0xFFFF_E000, 0);
        assert!(!report.ready());
        assert!(report.conditions().is_empty());
        assert_eq!(report.raw, 0xFFFF_E000);
    }

    #[test]
    fn display_lists_active_conditions() {
        let ready = StatusReport::decode(0, 0).to_string();
        assert_eq!(ready, "Printer status:\n  - Ready (no errors)");

        let jammed = StatusReport::decode(1 << 5, 0).to_string();
        assert_eq!(jammed, "Printer status:\n  - Paper jam");
    }
}
