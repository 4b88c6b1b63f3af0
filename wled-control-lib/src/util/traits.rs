use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// The status a WLED device reports for a command.
///
/// A 2xx HTTP status only tells that the request arrived. Whether the JSON was
/// accepted is reported in the body, as `{"success":true}` or `{"error":N}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResponseCode {
    pub code: u32,
    pub message: &'static str,
}

impl ResponseCode {
    pub fn is_ok(&self) -> bool {
        self.code == OK.code
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }
}

// Error codes from wled00/const.h.

pub const OK: ResponseCode = ResponseCode {
    code: 0,
    message: "Ok",
};
pub const ERROR_DENIED: ResponseCode = ResponseCode {
    code: 1,
    message: "Permission denied",
};
pub const ERROR_CONCURRENCY: ResponseCode = ResponseCode {
    code: 2,
    message: "Another request is being processed",
};
pub const ERROR_NO_BUFFER: ResponseCode = ResponseCode {
    code: 3,
    message: "JSON buffer is locked",
};
pub const ERROR_NOT_IMPLEMENTED: ResponseCode = ResponseCode {
    code: 4,
    message: "Not implemented",
};
pub const ERROR_JSON: ResponseCode = ResponseCode {
    code: 9,
    message: "JSON parsing failed",
};
pub const ERROR_FILESYSTEM: ResponseCode = ResponseCode {
    code: 10,
    message: "Filesystem error",
};
pub const ERROR_OVERTEMP: ResponseCode = ResponseCode {
    code: 30,
    message: "Over temperature",
};
pub const ERROR_OVERCURRENT: ResponseCode = ResponseCode {
    code: 31,
    message: "Over current",
};
pub const ERROR_UNDERVOLT: ResponseCode = ResponseCode {
    code: 32,
    message: "Under voltage",
};
/// Anything the device reports that is not listed above.
pub const ERROR_UNKNOWN: ResponseCode = ResponseCode {
    code: u32::MAX,
    message: "Unknown error",
};

/// Extracts a [`ResponseCode`] from a device reply.
pub trait ResponseCodeTrait {
    fn response_code(&self) -> ResponseCode;

    fn map_response_code(code: u32) -> ResponseCode {
        match code {
            0 => OK,
            1 => ERROR_DENIED,
            2 => ERROR_CONCURRENCY,
            3 => ERROR_NO_BUFFER,
            4 => ERROR_NOT_IMPLEMENTED,
            9 => ERROR_JSON,
            10..=19 => ERROR_FILESYSTEM,
            30 => ERROR_OVERTEMP,
            31 => ERROR_OVERCURRENT,
            32 => ERROR_UNDERVOLT,
            _ => ERROR_UNKNOWN,
        }
    }
}

impl ResponseCodeTrait for Value {
    fn response_code(&self) -> ResponseCode {
        if let Some(code) = self.get("error") {
            return match code.as_u64() {
                Some(code) => Self::map_response_code(code as u32),
                None => ERROR_UNKNOWN,
            };
        }
        match self.get("success").and_then(Value::as_bool) {
            Some(false) => ERROR_UNKNOWN,
            _ => OK,
        }
    }
}

/// Passes a reply through, or turns a reported failure into a command error.
pub fn check_reply(reply: Value) -> Result<Value> {
    let code = reply.response_code();
    if code.is_error() {
        return Err(Error::Command(format!(
            "Device rejected command: {} ({})",
            code.message, reply
        )));
    }
    Ok(reply)
}
