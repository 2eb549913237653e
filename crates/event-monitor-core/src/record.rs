//! Fixed-capacity owned copies of CLAP events.
//!
//! A host hands the audio thread borrowed `clap_event_header` pointers that are
//! only valid for the duration of one `process()` call. [`EventRecord`] copies
//! the header plus payload bytes into inline, 8-byte aligned storage so the
//! event can cross threads by value and be decoded later.

use clap_sys::events::{
    clap_event_header, clap_event_midi, clap_event_midi2, clap_event_midi_sysex, clap_event_note,
    clap_event_note_expression, clap_event_param_gesture, clap_event_param_mod,
    clap_event_param_value, clap_event_transport, CLAP_CORE_EVENT_SPACE_ID, CLAP_EVENT_MIDI,
    CLAP_EVENT_NOTE_CHOKE, CLAP_EVENT_NOTE_END, CLAP_EVENT_NOTE_OFF, CLAP_EVENT_NOTE_ON,
    CLAP_EVENT_PARAM_VALUE,
};
use std::fmt;
use std::mem::{offset_of, size_of};
use std::ptr;
use std::slice;

use crate::decode::{EventPayload, NoteKind};

/// Size of the generic CLAP event header.
pub const HEADER_SIZE: usize = size_of::<clap_event_header>();

const fn largest(sizes: &[usize]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < sizes.len() {
        if sizes[i] > max {
            max = sizes[i];
        }
        i += 1;
    }
    max
}

/// Largest event a record stores in full: the biggest core CLAP event struct.
pub const MAX_EVENT_SIZE: usize = largest(&[
    size_of::<clap_event_note>(),
    size_of::<clap_event_note_expression>(),
    size_of::<clap_event_param_value>(),
    size_of::<clap_event_param_mod>(),
    size_of::<clap_event_param_gesture>(),
    size_of::<clap_event_transport>(),
    size_of::<clap_event_midi>(),
    size_of::<clap_event_midi_sysex>(),
    size_of::<clap_event_midi2>(),
]);

const STORAGE_SIZE: usize = (MAX_EVENT_SIZE + 7) & !7;

#[derive(Clone, Copy)]
#[repr(C, align(8))]
struct Storage([u8; STORAGE_SIZE]);

/// CLAP event structs that start with a `clap_event_header`.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, begin with a `clap_event_header`, have an
/// alignment of at most 8, and accept any bit pattern in their fields.
/// [`write_fields`](Self::write_fields) must write every field of the struct.
pub unsafe trait CoreEvent: Copy {
    /// Write each field of `self` into `dst` one by one, leaving padding bytes
    /// as they were.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `size_of::<Self>()` bytes and aligned for `Self`.
    unsafe fn write_fields(&self, dst: *mut Self);
}

macro_rules! core_events {
    ($($ty:ty { $($field:ident),+ $(,)? }),* $(,)?) => {
        $(
            // SAFETY: clap-sys mirrors the C ABI structs, all header-first and POD,
            // and the field list below is complete.
            unsafe impl CoreEvent for $ty {
                #[inline]
                unsafe fn write_fields(&self, dst: *mut Self) {
                    $( ptr::addr_of_mut!((*dst).$field).write(self.$field); )+
                }
            }
        )*
    };
}

core_events! {
    clap_event_note { header, note_id, port_index, channel, key, velocity },
    clap_event_note_expression { header, expression_id, note_id, port_index, channel, key, value },
    clap_event_param_value { header, param_id, cookie, note_id, port_index, channel, key, value },
    clap_event_param_mod { header, param_id, cookie, note_id, port_index, channel, key, amount },
    clap_event_param_gesture { header, param_id },
    clap_event_transport {
        header,
        flags,
        song_pos_beats,
        song_pos_seconds,
        tempo,
        tempo_inc,
        loop_start_beats,
        loop_end_beats,
        loop_start_seconds,
        loop_end_seconds,
        bar_start,
        bar_number,
        tsig_num,
        tsig_denom,
    },
    clap_event_midi { header, port_index, data },
    clap_event_midi_sysex { header, port_index, buffer, size },
    clap_event_midi2 { header, port_index, data },
}

/// Build a core-space header sized for `T`.
pub fn core_header<T: CoreEvent>(time: u32, event_type: u16) -> clap_event_header {
    clap_event_header {
        size: size_of::<T>() as u32,
        time,
        space_id: CLAP_CORE_EVENT_SPACE_ID,
        type_: event_type,
        flags: 0,
    }
}

/// One captured event: header plus payload, copied by value.
///
/// The stored header's `size` always equals the number of stored bytes and
/// never exceeds [`MAX_EVENT_SIZE`]. Sources larger than that keep only their
/// header (see [`EventRecord::is_truncated`]).
#[derive(Clone, Copy)]
pub struct EventRecord {
    storage: Storage,
    source_size: u32,
}

impl EventRecord {
    /// Copy an event from its serialized bytes.
    ///
    /// The source size is the larger of `bytes.len()` and the header's declared
    /// `size`, so a slice cut short of its header is reported as truncated.
    /// Returns `None` when `bytes` is too short to hold a header.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let size_at = offset_of!(clap_event_header, size);
        let mut declared = [0u8; 4];
        declared.copy_from_slice(&bytes[size_at..size_at + 4]);
        let source_size = (u32::from_ne_bytes(declared) as usize).max(bytes.len());

        let stored = stored_len(bytes.len());
        Some(Self::copy_prefix(&bytes[..stored], source_size))
    }

    /// Copy an event straight from a host-owned header pointer.
    ///
    /// The byte length is taken from the header's `size` field. Only the bytes
    /// that will be kept are read.
    ///
    /// # Safety
    ///
    /// `header` must be null or point to at least `(*header).size` readable
    /// bytes (or a full header, whichever is larger) for the duration of the call.
    pub unsafe fn from_raw(header: *const clap_event_header) -> Option<Self> {
        if header.is_null() {
            return None;
        }
        let source_size = ptr::read_unaligned(header).size as usize;
        if source_size < HEADER_SIZE {
            return None;
        }
        let bytes = slice::from_raw_parts(header as *const u8, stored_len(source_size));
        Some(Self::copy_prefix(bytes, source_size))
    }

    /// Copy a typed core event.
    ///
    /// Fields are written one at a time into zeroed storage, so padding
    /// inside `T` reads back as zero.
    pub fn from_event<T: CoreEvent>(event: &T) -> Self {
        let mut storage = Storage([0; STORAGE_SIZE]);
        let stored = stored_len(size_of::<T>());
        // SAFETY: storage is 8-aligned and `T` needs at most 8. When `T` fits it
        // gets its full size; otherwise only the leading header is written, and
        // `T` starts with one.
        unsafe {
            if stored == size_of::<T>() {
                event.write_fields(storage.0.as_mut_ptr() as *mut T);
            } else {
                let header = *(event as *const T as *const clap_event_header);
                ptr::write(storage.0.as_mut_ptr() as *mut clap_event_header, header);
            }
        }
        Self::with_storage(storage, stored, size_of::<T>())
    }

    fn copy_prefix(bytes: &[u8], source_size: usize) -> Self {
        let mut storage = Storage([0; STORAGE_SIZE]);
        storage.0[..bytes.len()].copy_from_slice(bytes);
        Self::with_storage(storage, bytes.len(), source_size)
    }

    fn with_storage(storage: Storage, stored: usize, source_size: usize) -> Self {
        let mut record = Self {
            storage,
            source_size: u32::try_from(source_size).unwrap_or(u32::MAX),
        };
        let size_at = offset_of!(clap_event_header, size);
        record.storage.0[size_at..size_at + 4].copy_from_slice(&(stored as u32).to_ne_bytes());
        record
    }

    /// Note on/off/choke/end record.
    pub fn note(
        kind: NoteKind,
        time: u32,
        port_index: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f64,
    ) -> Self {
        let event_type = match kind {
            NoteKind::On => CLAP_EVENT_NOTE_ON,
            NoteKind::Off => CLAP_EVENT_NOTE_OFF,
            NoteKind::Choke => CLAP_EVENT_NOTE_CHOKE,
            NoteKind::End => CLAP_EVENT_NOTE_END,
        };
        Self::from_event(&clap_event_note {
            header: core_header::<clap_event_note>(time, event_type),
            note_id,
            port_index,
            channel,
            key,
            velocity,
        })
    }

    /// Parameter value change not tied to a note.
    pub fn param_value(time: u32, param_id: u32, value: f64) -> Self {
        Self::from_event(&clap_event_param_value {
            header: core_header::<clap_event_param_value>(time, CLAP_EVENT_PARAM_VALUE),
            param_id,
            cookie: ptr::null_mut(),
            note_id: -1,
            port_index: -1,
            channel: -1,
            key: -1,
            value,
        })
    }

    /// Raw MIDI 1.0 message.
    pub fn midi(time: u32, port_index: u16, data: [u8; 3]) -> Self {
        Self::from_event(&clap_event_midi {
            header: core_header::<clap_event_midi>(time, CLAP_EVENT_MIDI),
            port_index,
            data,
        })
    }

    /// Typed overlay of the stored bytes as the generic header.
    #[inline]
    pub fn view(&self) -> &clap_event_header {
        // SAFETY: storage is 8-aligned, always holds a full header, and every
        // header field accepts any bit pattern.
        unsafe { &*(self.storage.0.as_ptr() as *const clap_event_header) }
    }

    /// Typed overlay of the whole event, if enough bytes were stored for `T`.
    pub(crate) fn payload_as<T: CoreEvent>(&self) -> Option<&T> {
        if (self.size() as usize) < size_of::<T>() {
            return None;
        }
        // SAFETY: alignment of `T` is at most 8, the storage holds at least
        // `size_of::<T>()` initialized bytes, and `T` is POD.
        Some(unsafe { &*(self.storage.0.as_ptr() as *const T) })
    }

    #[inline]
    pub fn space_id(&self) -> u16 {
        self.view().space_id
    }

    /// Sample offset within the processing block.
    #[inline]
    pub fn time(&self) -> u32 {
        self.view().time
    }

    #[inline]
    pub fn event_type(&self) -> u16 {
        self.view().type_
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.view().flags
    }

    /// Stored byte length (header + payload).
    #[inline]
    pub fn size(&self) -> u32 {
        self.view().size
    }

    /// Byte length of the event this record was copied from.
    #[inline]
    pub fn source_size(&self) -> u32 {
        self.source_size
    }

    /// True when fewer bytes were stored than the source held: it exceeded
    /// [`MAX_EVENT_SIZE`] and only its header was kept, or the bytes handed
    /// over stopped short of the header's declared size.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.source_size > self.size()
    }

    #[inline]
    pub fn is_core(&self) -> bool {
        self.space_id() == CLAP_CORE_EVENT_SPACE_ID
    }

    /// Decode the stored bytes by `(space_id, type)`.
    #[inline]
    pub fn payload(&self) -> EventPayload {
        EventPayload::decode(self)
    }

    /// The stored serialized bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.0[..self.size() as usize]
    }
}

#[inline]
fn stored_len(source_size: usize) -> usize {
    if source_size > MAX_EVENT_SIZE {
        HEADER_SIZE
    } else {
        source_size
    }
}

impl Default for EventRecord {
    /// An empty core-space header with type 0 and no payload.
    fn default() -> Self {
        Self::copy_prefix(&[0; HEADER_SIZE], HEADER_SIZE)
    }
}

impl PartialEq for EventRecord {
    fn eq(&self, other: &Self) -> bool {
        self.source_size == other.source_size && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for EventRecord {}

impl fmt::Debug for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecord")
            .field("space_id", &self.space_id())
            .field("time", &self.time())
            .field("type", &self.event_type())
            .field("size", &self.size())
            .field("truncated", &self.is_truncated())
            .finish()
    }
}
