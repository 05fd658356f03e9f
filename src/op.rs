use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::IntoStaticStr;

/// Operation codes understood by the printer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, IntoStaticStr)]
#[repr(i32)]
pub enum OpCode {
    #[strum(serialize = "set-power")]
    SetPower = 1,
    #[strum(serialize = "set-resolution")]
    SetResolution = 2,
    #[strum(serialize = "set-margins")]
    SetMargins = 3,
    #[strum(serialize = "get-status")]
    GetStatus = 4,
    #[strum(serialize = "get-paper-size")]
    GetPaperSize = 5,
}

impl OpCode {
    /// Operation name used in error and log messages.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Print resolution, limited to the two engine-defined values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Resolution {
    Dpi300 = 0,
    Dpi400 = 1,
}

impl Resolution {
    pub fn from_dpi(dpi: u32) -> Option<Self> {
        match dpi {
            300 => Some(Resolution::Dpi300),
            400 => Some(Resolution::Dpi400),
            _ => None,
        }
    }

    pub fn dpi(self) -> u32 {
        match self {
            Resolution::Dpi300 => 300,
            Resolution::Dpi400 => 400,
        }
    }
}

/// Page margins in device units. No client-side range checks: the device is
/// authoritative and rejects invalid combinations with its own failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// A typed control operation, one variant per [`OpCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    SetPower { on: bool },
    SetResolution(Resolution),
    SetMargins(Margins),
    GetStatus,
    GetPaperSize,
}

/// Fixed-layout record exchanged with the driver on every control call.
///
/// The payload area is a union in the driver's definition, sized for the
/// largest payload (margins); only the field selected by `op` is meaningful.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpOp {
    pub op: i32,
    pub un: [u32; 4],
}

impl Request {
    pub fn op_code(&self) -> OpCode {
        match self {
            Request::SetPower { .. } => OpCode::SetPower,
            Request::SetResolution(_) => OpCode::SetResolution,
            Request::SetMargins(_) => OpCode::SetMargins,
            Request::GetStatus => OpCode::GetStatus,
            Request::GetPaperSize => OpCode::GetPaperSize,
        }
    }

    /// Build the wire record for this operation. Purely structural; no
    /// validation happens here.
    pub fn encode(&self) -> NpOp {
        let mut record = NpOp {
            op: self.op_code().into(),
            un: [0; 4],
        };
        match *self {
            Request::SetPower { on } => record.un[0] = on as u32,
            Request::SetResolution(resolution) => record.un[0] = i32::from(resolution) as u32,
            Request::SetMargins(m) => record.un = [m.left, m.top, m.width, m.height],
            Request::GetStatus | Request::GetPaperSize => {}
        }
        record
    }
}

/// Extract `(flags, retransmit pages)` from a get-status response.
pub fn decode_status(response: &NpOp) -> (u32, u32) {
    (response.un[0], response.un[1])
}

/// Extract the raw paper-size code from a get-paper-size response.
pub fn decode_paper_size(response: &NpOp) -> i32 {
    response.un[0] as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_codes_match_the_driver() {
        assert_eq!(i32::from(OpCode::SetPower), 1);
        assert_eq!(i32::from(OpCode::SetResolution), 2);
        assert_eq!(i32::from(OpCode::SetMargins), 3);
        assert_eq!(i32::from(OpCode::GetStatus), 4);
        assert_eq!(i32::from(OpCode::GetPaperSize), 5);
    }

    #[test]
    fn op_names_are_stable() {
        assert_eq!(OpCode::SetPower.name(), "set-power");
        assert_eq!(OpCode::GetPaperSize.name(), "get-paper-size");
    }

    #[test]
    fn resolution_uses_engine_constants() {
        let record = Request::SetResolution(Resolution::Dpi300).encode();
        assert_eq!(record.op, 2);
        assert_eq!(record.un, [0, 0, 0, 0]);

        let record = Request::SetResolution(Resolution::Dpi400).encode();
        assert_eq!(record.op, 2);
        assert_eq!(record.un, [1, 0, 0, 0]);
    }

    #[test]
    fn resolution_from_dpi_rejects_unsupported_values() {
        assert_eq!(Resolution::from_dpi(300), Some(Resolution::Dpi300));
        assert_eq!(Resolution::from_dpi(400), Some(Resolution::Dpi400));
        assert_eq!(Resolution::from_dpi(600), None);
        assert_eq!(Resolution::from_dpi(0), None);
    }

    #[test]
    fn power_payload_is_a_boolean_flag() {
        assert_eq!(Request::SetPower { on: true }.encode().un, [1, 0, 0, 0]);
        assert_eq!(Request::SetPower { on: false }.encode().un, [0, 0, 0, 0]);
    }

    #[test]
    fn margins_fill_the_whole_payload_area() {
        let record = Request::SetMargins(Margins {
            left: 10,
            top: 20,
            width: 2400,
            height: 3300,
        })
        .encode();
        assert_eq!(record.op, 3);
        assert_eq!(record.un, [10, 20, 2400, 3300]);
    }

    #[test]
    fn queries_carry_no_payload() {
        assert_eq!(Request::GetStatus.encode().un, [0, 0, 0, 0]);
        assert_eq!(Request::GetPaperSize.encode().un, [0, 0, 0, 0]);
    }

    #[test]
    fn status_response_fields_are_extracted_in_order() {
        let response = NpOp {
            op: OpCode::GetStatus.into(),
            un: [0x0000_0014, 3, 0, 0],
        };
        assert_eq!(decode_status(&response), (0x14, 3));
    }

    #[test]
    fn paper_size_response_is_signed() {
        let response = NpOp {
            op: OpCode::GetPaperSize.into(),
            un: [u32::MAX, 0, 0, 0],
        };
        assert_eq!(decode_paper_size(&response), -1);
    }
}
