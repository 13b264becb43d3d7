//! 24-bit message identifiers.
//!
//! Identifiers are never authored. Each one is derived from the service id,
//! the method id and a role byte:
//!
//! ```text
//! id = service << 16 | method << 8 | role
//! role: request = 0, response = 1, event i = i + 2
//! ```
//!
//! ```
//! use codecgen::message_id::{MessageId, Role};
//!
//! let request = MessageId::derive(5, 3, Role::Request);
//! assert_eq!(request.value(), 0x050300);
//! assert_eq!(request.to_string(), "0x050300");
//! ```

use std::fmt;

/// Highest event index whose role byte still fits in eight bits.
pub const MAX_EVENT_INDEX: usize = u8::MAX as usize - 2;

/// The part a message plays within its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Request,
    Response,
    /// The event at this declaration index.
    Event(u8),
}

impl Role {
    /// The role for the `index`-th event, or `None` once the role byte would
    /// overflow.
    pub fn event(index: usize) -> Option<Role> {
        (index <= MAX_EVENT_INDEX).then(|| Role::Event(index as u8))
    }

    pub fn byte(self) -> u8 {
        match self {
            Role::Request => 0,
            Role::Response => 1,
            Role::Event(index) => index + 2,
        }
    }
}

/// A derived message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u32);

impl MessageId {
    pub fn derive(service: u8, method: u8, role: Role) -> Self {
        MessageId((service as u32) << 16 | (method as u32) << 8 | role.byte() as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_the_documented_example() {
        assert_eq!(MessageId::derive(5, 3, Role::Request).value(), 0x050300);
        assert_eq!(MessageId::derive(5, 3, Role::Response).value(), 0x050301);
        assert_eq!(
            MessageId::derive(5, 3, Role::event(0).unwrap()).value(),
            0x050302
        );
    }

    #[test]
    fn event_index_is_guarded() {
        assert_eq!(Role::event(253), Some(Role::Event(253)));
        assert_eq!(Role::event(253).unwrap().byte(), 255);
        assert_eq!(Role::event(254), None);
    }

    #[test]
    fn formats_as_six_hex_digits() {
        assert_eq!(MessageId::derive(0, 0, Role::Request).to_string(), "0x000000");
        assert_eq!(MessageId::derive(255, 16, Role::Response).to_string(), "0xff1001");
    }

    proptest! {
        #[test]
        fn derivation_is_a_pure_bit_layout(s in any::<u8>(), m in any::<u8>(), i in 0usize..=MAX_EVENT_INDEX) {
            let base = (s as u32) << 16 | (m as u32) << 8;
            prop_assert_eq!(MessageId::derive(s, m, Role::Request).value(), base);
            prop_assert_eq!(MessageId::derive(s, m, Role::Response).value(), base | 1);

            let event = MessageId::derive(s, m, Role::event(i).unwrap());
            prop_assert_eq!(event.value(), base | (i as u32 + 2));
            prop_assert_eq!((event.value() >> 16) as u8, s);
            prop_assert_eq!((event.value() >> 8) as u8, m);
            prop_assert!(event.value() < 1 << 24);
        }
    }
}
