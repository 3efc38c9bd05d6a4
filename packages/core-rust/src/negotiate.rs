//! Two-phase buffer size negotiation for text reads.
//!
//! Callers pass an optional buffer and an in/out capacity. Without a buffer
//! the call only reports the required size. With a buffer, the text is copied
//! and terminated when it fits; otherwise a terminated prefix is written, the
//! full required size is reported, and the outcome is [`Transfer::MoreData`].
//! Sizes are counted in code units and exclude the terminator.

use std::borrow::Cow;

use crate::error::Status;

/// A text code unit: `u8` for narrow (UTF-8) reads, `u16` for wide (UTF-16).
pub trait CodeUnit: Copy + 'static {
    /// The terminator written after copied text.
    const NUL: Self;

    /// Encodes `text` into this code unit.
    fn encode(text: &str) -> Cow<'_, [Self]>;
}

impl CodeUnit for u8 {
    const NUL: Self = 0;

    fn encode(text: &str) -> Cow<'_, [Self]> {
        Cow::Borrowed(text.as_bytes())
    }
}

impl CodeUnit for u16 {
    const NUL: Self = 0;

    fn encode(text: &str) -> Cow<'_, [Self]> {
        Cow::Owned(text.encode_utf16().collect())
    }
}

/// Outcome of a negotiated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// The whole value was copied and terminated, or only the size was queried.
    Complete,
    /// The buffer was too small. The capacity now holds the full required size.
    MoreData,
}

impl Transfer {
    #[must_use]
    pub fn status(self) -> Status {
        match self {
            Self::Complete => Status::Success,
            Self::MoreData => Status::MoreData,
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Writes the empty value: a terminator at `buf[0]` when there is room.
pub(crate) fn negotiate_empty<C: CodeUnit>(buf: Option<&mut [C]>, capacity: &mut usize) -> Transfer {
    if let Some(buf) = buf {
        let have = (*capacity).min(buf.len());
        if have > 0 {
            buf[0] = C::NUL;
        }
    }
    *capacity = 0;
    Transfer::Complete
}

/// Copies `source` into `buf` under the negotiation rules.
pub(crate) fn negotiate_copy<C: CodeUnit>(
    source: &[C],
    buf: Option<&mut [C]>,
    capacity: &mut usize,
) -> Transfer {
    let needed = source.len();
    let Some(buf) = buf else {
        *capacity = needed;
        return Transfer::Complete;
    };

    let have = (*capacity).min(buf.len());
    *capacity = needed;
    if needed < have {
        buf[..needed].copy_from_slice(source);
        buf[needed] = C::NUL;
        return Transfer::Complete;
    }
    if have > 0 {
        let copied = have - 1;
        buf[..copied].copy_from_slice(&source[..copied]);
        buf[copied] = C::NUL;
    }
    Transfer::MoreData
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_query_without_buffer() {
        let mut capacity = 1;
        let outcome = negotiate_copy::<u8>(&b"32"[..], None, &mut capacity);
        assert_eq!(outcome, Transfer::Complete);
        assert_eq!(capacity, 2);
    }

    #[test]
    fn fits_with_room_for_terminator() {
        let mut buf = [b'#'; 10];
        let mut capacity = 6;
        let outcome = negotiate_copy(&b"hello"[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::Complete);
        assert_eq!(capacity, 5);
        assert_eq!(&buf[..6], b"hello\0");
        assert_eq!(buf[6], b'#');
    }

    #[test]
    fn exact_length_capacity_truncates() {
        let mut buf = [b'#'; 10];
        let mut capacity = 5;
        let outcome = negotiate_copy(&b"hello"[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::MoreData);
        assert_eq!(capacity, 5);
        assert_eq!(&buf[..5], b"hell\0");
        assert_eq!(buf[5], b'#');
    }

    #[test]
    fn short_capacity_reports_full_size() {
        let mut buf = [0u8; 10];
        let mut capacity = 3;
        let outcome = negotiate_copy(&b"hello"[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::MoreData);
        assert_eq!(capacity, 5);
        assert_eq!(&buf[..3], b"he\0");
    }

    #[test]
    fn zero_capacity_leaves_buffer_untouched() {
        let mut buf = [b'x'; 4];
        let mut capacity = 0;
        let outcome = negotiate_copy(&b"hello"[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::MoreData);
        assert_eq!(capacity, 5);
        assert_eq!(buf, [b'x'; 4]);
    }

    #[test]
    fn capacity_is_clamped_to_buffer_length() {
        let mut buf = [0u8; 3];
        let mut capacity = 100;
        let outcome = negotiate_copy(&b"hello"[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::MoreData);
        assert_eq!(capacity, 5);
        assert_eq!(&buf, b"he\0");
    }

    #[test]
    fn wide_units_follow_the_same_rules() {
        let wide = u16::encode("hello").into_owned();
        let mut buf = [0u16; 10];
        let mut capacity = 5;
        let outcome = negotiate_copy(&wide[..], Some(&mut buf[..]), &mut capacity);
        assert_eq!(outcome, Transfer::MoreData);
        assert_eq!(capacity, 5);
        assert_eq!(&buf[..4], &wide[..4]);
        assert_eq!(buf[4], 0);
    }

    #[test]
    fn empty_value_writes_terminator_only_with_room() {
        let mut buf = [b'a'; 4];
        let mut capacity = 4;
        assert_eq!(negotiate_empty(Some(&mut buf[..]), &mut capacity), Transfer::Complete);
        assert_eq!(capacity, 0);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], b'a');

        let mut buf = [b'a'; 4];
        let mut capacity = 0;
        assert_eq!(negotiate_empty(Some(&mut buf[..]), &mut capacity), Transfer::Complete);
        assert_eq!(buf[0], b'a');

        let mut capacity = 9;
        assert_eq!(negotiate_empty::<u16>(None, &mut capacity), Transfer::Complete);
        assert_eq!(capacity, 0);
    }

    #[test]
    fn transfer_status() {
        assert_eq!(Transfer::Complete.status(), Status::Success);
        assert_eq!(Transfer::MoreData.status(), Status::MoreData);
        assert!(!Transfer::MoreData.is_complete());
    }
}
