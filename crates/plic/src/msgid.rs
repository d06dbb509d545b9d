// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message identifiers and signal handler ids.
//!
//! A message id is a `u64` whose top byte is the message class. Bit 63
//! marks a result; a call expects a result exactly when the top two bits
//! are `01`. Applying [`as_result`] sets bit 63, so a call moves to the
//! result state once and never back:
//!
//! ```text
//! 00xx_xxxx  call, no result     (oneway call, oneway emit)
//! 01xx_xxxx  call, needs result  (twoway call, twoway emit, connect, disconnect)
//! 1xxx_xxxx  result
//! ```
//!
//! Signal handler ids pack a connection id and a handler index into one
//! opaque `u64` with a fixed layout:
//!
//! ```text
//!  63                              24 23               0
//! +----------------------------------+------------------+
//! |        connection id (40)        | handler idx (24) |
//! +----------------------------------+------------------+
//! ```

use crate::config::{
    HANDLER_CONNECTION_BITS, HANDLER_INDEX_BITS, MSGID_CLASS_MASK, MSGID_NEEDS_RESULT_BITS,
    MSGID_PAYLOAD_MASK, MSGID_RESULT_BIT, MSGID_RESULT_CHECK_MASK,
};
use std::fmt;

/// Class byte of `id`, in place.
pub const fn mask(id: u64) -> u64 {
    id & MSGID_CLASS_MASK
}

/// `id` with the result bit set.
pub const fn as_result(id: u64) -> u64 {
    id | MSGID_RESULT_BIT
}

/// `true` for a call whose top two bits are `01`.
pub const fn needs_result(id: u64) -> bool {
    id & MSGID_RESULT_CHECK_MASK == MSGID_NEEDS_RESULT_BITS
}

/// `true` if the class byte of `id` equals `class` (given in place).
pub const fn is(id: u64, class: u64) -> bool {
    mask(id) == class
}

/// Message classes (top byte of a message id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageClass {
    None = 0x00,
    OnewayCall = 0x10,
    EmitOneway = 0x20,
    TwowayCall = 0x40,
    EmitTwoway = 0x50,
    Connect = 0x60,
    Disconnect = 0x70,
    CallResult = 0xC0,
    EmitResult = 0xD0,
    ConnectResult = 0xE0,
    DisconnectResult = 0xF0,
}

impl MessageClass {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::None),
            0x10 => Some(Self::OnewayCall),
            0x20 => Some(Self::EmitOneway),
            0x40 => Some(Self::TwowayCall),
            0x50 => Some(Self::EmitTwoway),
            0x60 => Some(Self::Connect),
            0x70 => Some(Self::Disconnect),
            0xC0 => Some(Self::CallResult),
            0xD0 => Some(Self::EmitResult),
            0xE0 => Some(Self::ConnectResult),
            0xF0 => Some(Self::DisconnectResult),
            _ => None,
        }
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Class byte shifted into message-id position.
    pub const fn bits(self) -> u64 {
        (self as u64) << 56
    }
}

/// A 64-bit message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Id of `class` carrying the low 56 bits of `low`.
    pub const fn new(class: MessageClass, low: u64) -> Self {
        Self(class.bits() | (low & MSGID_PAYLOAD_MASK))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Class, if the top byte is a known one.
    pub const fn class(self) -> Option<MessageClass> {
        MessageClass::from_byte((self.0 >> 56) as u8)
    }

    pub const fn payload(self) -> u64 {
        self.0 & MSGID_PAYLOAD_MASK
    }

    pub const fn as_result(self) -> Self {
        Self(as_result(self.0))
    }

    pub const fn needs_result(self) -> bool {
        needs_result(self.0)
    }

    pub const fn is_result(self) -> bool {
        self.0 & MSGID_RESULT_BIT != 0
    }

    /// A call that expects no result.
    pub const fn is_oneway(self) -> bool {
        mask(self.0) != 0 && self.0 & MSGID_RESULT_CHECK_MASK == 0
    }

    pub const fn is(self, class: MessageClass) -> bool {
        is(self.0, class.bits())
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            Some(class) => write!(f, "{:?}#{:#x}", class, self.payload()),
            None => write!(f, "{:#018x}", self.0),
        }
    }
}

/// Errors from packing a [`SignalHandlerId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerIdError {
    /// Handler index wider than 24 bits.
    IndexOutOfRange(u32),
    /// Connection id wider than 40 bits.
    ConnectionOutOfRange(u64),
}

impl fmt::Display for HandlerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange(index) => write!(
                f,
                "Handler index {} exceeds {} bits",
                index, HANDLER_INDEX_BITS
            ),
            Self::ConnectionOutOfRange(connection) => write!(
                f,
                "Connection id {} exceeds {} bits",
                connection, HANDLER_CONNECTION_BITS
            ),
        }
    }
}

impl std::error::Error for HandlerIdError {}

const HANDLER_INDEX_MASK: u64 = (1 << HANDLER_INDEX_BITS) - 1;
const HANDLER_CONNECTION_MASK: u64 = (1 << HANDLER_CONNECTION_BITS) - 1;

/// Opaque handle tying a signal subscription to its connection.
///
/// `0` means "no handler".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SignalHandlerId(u64);

impl SignalHandlerId {
    pub const NONE: Self = Self(0);

    pub fn pack(index: u32, connection: u64) -> Result<Self, HandlerIdError> {
        if u64::from(index) > HANDLER_INDEX_MASK {
            return Err(HandlerIdError::IndexOutOfRange(index));
        }
        if connection > HANDLER_CONNECTION_MASK {
            return Err(HandlerIdError::ConnectionOutOfRange(connection));
        }
        Ok(Self((connection << HANDLER_INDEX_BITS) | u64::from(index)))
    }

    /// `(index, connection)`.
    pub const fn unpack(self) -> (u32, u64) {
        (self.index(), self.connection())
    }

    pub const fn index(self) -> u32 {
        (self.0 & HANDLER_INDEX_MASK) as u32
    }

    pub const fn connection(self) -> u64 {
        self.0 >> HANDLER_INDEX_BITS
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}
