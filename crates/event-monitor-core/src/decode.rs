//! Decoding of stored records into a tagged payload and a one-line summary.
//!
//! Dispatch is on `(space_id, type)`. Anything outside the core space, any
//! unknown core type, and any record too short for its declared type all map
//! to a fallback variant, so decoding never fails.

use clap_sys::events::{
    clap_event_midi, clap_event_midi2, clap_event_midi_sysex, clap_event_note,
    clap_event_note_expression, clap_event_param_gesture, clap_event_param_mod,
    clap_event_param_value, clap_event_transport, CLAP_CORE_EVENT_SPACE_ID, CLAP_EVENT_MIDI,
    CLAP_EVENT_MIDI2, CLAP_EVENT_MIDI_SYSEX, CLAP_EVENT_NOTE_CHOKE, CLAP_EVENT_NOTE_END,
    CLAP_EVENT_NOTE_EXPRESSION, CLAP_EVENT_NOTE_OFF, CLAP_EVENT_NOTE_ON,
    CLAP_EVENT_PARAM_GESTURE_BEGIN, CLAP_EVENT_PARAM_GESTURE_END, CLAP_EVENT_PARAM_MOD,
    CLAP_EVENT_PARAM_VALUE, CLAP_EVENT_TRANSPORT, CLAP_NOTE_EXPRESSION_BRIGHTNESS,
    CLAP_NOTE_EXPRESSION_EXPRESSION, CLAP_NOTE_EXPRESSION_PAN, CLAP_NOTE_EXPRESSION_PRESSURE,
    CLAP_NOTE_EXPRESSION_TUNING, CLAP_NOTE_EXPRESSION_VIBRATO, CLAP_NOTE_EXPRESSION_VOLUME,
    CLAP_TRANSPORT_HAS_BEATS_TIMELINE, CLAP_TRANSPORT_HAS_TEMPO,
    CLAP_TRANSPORT_HAS_TIME_SIGNATURE, CLAP_TRANSPORT_IS_LOOP_ACTIVE, CLAP_TRANSPORT_IS_PLAYING,
    CLAP_TRANSPORT_IS_RECORDING,
};
use clap_sys::fixedpoint::{CLAP_BEATTIME_FACTOR, CLAP_SECTIME_FACTOR};
use std::fmt;

use crate::record::{CoreEvent, EventRecord};

/// Summary shown for events outside the core namespace.
pub const NON_CORE_SUMMARY: &str = "Non-core event";
/// Summary shown for core events of an unknown type.
pub const UNDECODED_SUMMARY: &str = "Un-decoded event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    On,
    Off,
    Choke,
    End,
}

impl NoteKind {
    fn from_event_type(event_type: u16) -> Option<Self> {
        match event_type {
            CLAP_EVENT_NOTE_ON => Some(Self::On),
            CLAP_EVENT_NOTE_OFF => Some(Self::Off),
            CLAP_EVENT_NOTE_CHOKE => Some(Self::Choke),
            CLAP_EVENT_NOTE_END => Some(Self::End),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Choke => "CHOKE",
            Self::End => "END",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteExpressionKind {
    Volume,
    Pan,
    Tuning,
    Vibrato,
    Expression,
    Brightness,
    Pressure,
    Unknown(i32),
}

impl NoteExpressionKind {
    fn from_id(id: i32) -> Self {
        match id {
            CLAP_NOTE_EXPRESSION_VOLUME => Self::Volume,
            CLAP_NOTE_EXPRESSION_PAN => Self::Pan,
            CLAP_NOTE_EXPRESSION_TUNING => Self::Tuning,
            CLAP_NOTE_EXPRESSION_VIBRATO => Self::Vibrato,
            CLAP_NOTE_EXPRESSION_EXPRESSION => Self::Expression,
            CLAP_NOTE_EXPRESSION_BRIGHTNESS => Self::Brightness,
            CLAP_NOTE_EXPRESSION_PRESSURE => Self::Pressure,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for NoteExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Pan => write!(f, "pan"),
            Self::Tuning => write!(f, "tuning"),
            Self::Vibrato => write!(f, "vibrato"),
            Self::Expression => write!(f, "expression"),
            Self::Brightness => write!(f, "brightness"),
            Self::Pressure => write!(f, "pressure"),
            Self::Unknown(id) => write!(f, "#{}", id),
        }
    }
}

/// Host transport state carried by a transport event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportInfo {
    pub flags: u32,
    pub song_pos_beats: f64,
    pub song_pos_seconds: f64,
    pub tempo: f64,
    pub bar_number: i32,
    pub tsig_num: u16,
    pub tsig_denom: u16,
}

impl TransportInfo {
    fn from_clap(event: &clap_event_transport) -> Self {
        Self {
            flags: event.flags,
            song_pos_beats: event.song_pos_beats as f64 / CLAP_BEATTIME_FACTOR as f64,
            song_pos_seconds: event.song_pos_seconds as f64 / CLAP_SECTIME_FACTOR as f64,
            tempo: event.tempo,
            bar_number: event.bar_number,
            tsig_num: event.tsig_num,
            tsig_denom: event.tsig_denom,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.flags & CLAP_TRANSPORT_IS_PLAYING != 0
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.flags & CLAP_TRANSPORT_IS_RECORDING != 0
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.flags & CLAP_TRANSPORT_IS_LOOP_ACTIVE != 0
    }
}

/// Decoded view of one record, tagged by event kind.
///
/// Pointer-valued fields of the source (parameter cookies, sysex buffers) are
/// not carried: they pointed into host memory that is gone by decode time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    Note {
        kind: NoteKind,
        port_index: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f64,
    },
    NoteExpression {
        expression: NoteExpressionKind,
        note_id: i32,
        port_index: i16,
        channel: i16,
        key: i16,
        value: f64,
    },
    ParamValue {
        param_id: u32,
        note_id: i32,
        port_index: i16,
        channel: i16,
        key: i16,
        value: f64,
    },
    ParamMod {
        param_id: u32,
        note_id: i32,
        port_index: i16,
        channel: i16,
        key: i16,
        amount: f64,
    },
    ParamGesture {
        begin: bool,
        param_id: u32,
    },
    Transport(TransportInfo),
    Midi {
        port_index: u16,
        data: [u8; 3],
    },
    MidiSysex {
        port_index: u16,
        length: u32,
    },
    Midi2 {
        port_index: u16,
        words: [u32; 4],
    },
    /// Event from a namespace other than the core one.
    NonCore { space_id: u16, event_type: u16 },
    /// Known core type, but fewer bytes were stored than the type needs.
    Truncated { event_type: u16 },
    /// Core event of a type this decoder does not know.
    Undecoded { event_type: u16 },
}

impl EventPayload {
    pub fn decode(record: &EventRecord) -> Self {
        let event_type = record.event_type();
        if !record.is_core() {
            return Self::NonCore {
                space_id: record.space_id(),
                event_type,
            };
        }

        match event_type {
            CLAP_EVENT_NOTE_ON | CLAP_EVENT_NOTE_OFF | CLAP_EVENT_NOTE_CHOKE
            | CLAP_EVENT_NOTE_END => overlay(record, |e: &clap_event_note| Self::Note {
                kind: NoteKind::from_event_type(event_type).unwrap_or(NoteKind::On),
                port_index: e.port_index,
                channel: e.channel,
                key: e.key,
                note_id: e.note_id,
                velocity: e.velocity,
            }),
            CLAP_EVENT_NOTE_EXPRESSION => {
                overlay(record, |e: &clap_event_note_expression| Self::NoteExpression {
                    expression: NoteExpressionKind::from_id(e.expression_id),
                    note_id: e.note_id,
                    port_index: e.port_index,
                    channel: e.channel,
                    key: e.key,
                    value: e.value,
                })
            }
            CLAP_EVENT_PARAM_VALUE => {
                overlay(record, |e: &clap_event_param_value| Self::ParamValue {
                    param_id: e.param_id,
                    note_id: e.note_id,
                    port_index: e.port_index,
                    channel: e.channel,
                    key: e.key,
                    value: e.value,
                })
            }
            CLAP_EVENT_PARAM_MOD => overlay(record, |e: &clap_event_param_mod| Self::ParamMod {
                param_id: e.param_id,
                note_id: e.note_id,
                port_index: e.port_index,
                channel: e.channel,
                key: e.key,
                amount: e.amount,
            }),
            CLAP_EVENT_PARAM_GESTURE_BEGIN | CLAP_EVENT_PARAM_GESTURE_END => {
                overlay(record, |e: &clap_event_param_gesture| Self::ParamGesture {
                    begin: event_type == CLAP_EVENT_PARAM_GESTURE_BEGIN,
                    param_id: e.param_id,
                })
            }
            CLAP_EVENT_TRANSPORT => overlay(record, |e: &clap_event_transport| {
                Self::Transport(TransportInfo::from_clap(e))
            }),
            CLAP_EVENT_MIDI => overlay(record, |e: &clap_event_midi| Self::Midi {
                port_index: e.port_index,
                data: e.data,
            }),
            CLAP_EVENT_MIDI_SYSEX => overlay(record, |e: &clap_event_midi_sysex| Self::MidiSysex {
                port_index: e.port_index,
                length: e.size,
            }),
            CLAP_EVENT_MIDI2 => overlay(record, |e: &clap_event_midi2| Self::Midi2 {
                port_index: e.port_index,
                words: e.data,
            }),
            _ => Self::Undecoded { event_type },
        }
    }
}

fn overlay<T: CoreEvent>(record: &EventRecord, f: impl FnOnce(&T) -> EventPayload) -> EventPayload {
    match record.payload_as::<T>() {
        Some(event) => f(event),
        None => EventPayload::Truncated {
            event_type: record.event_type(),
        },
    }
}

/// CLAP constant name for a core event type.
pub fn event_type_name(event_type: u16) -> Option<&'static str> {
    let name = match event_type {
        CLAP_EVENT_NOTE_ON => "CLAP_EVENT_NOTE_ON",
        CLAP_EVENT_NOTE_OFF => "CLAP_EVENT_NOTE_OFF",
        CLAP_EVENT_NOTE_CHOKE => "CLAP_EVENT_NOTE_CHOKE",
        CLAP_EVENT_NOTE_END => "CLAP_EVENT_NOTE_END",
        CLAP_EVENT_NOTE_EXPRESSION => "CLAP_EVENT_NOTE_EXPRESSION",
        CLAP_EVENT_PARAM_VALUE => "CLAP_EVENT_PARAM_VALUE",
        CLAP_EVENT_PARAM_MOD => "CLAP_EVENT_PARAM_MOD",
        CLAP_EVENT_PARAM_GESTURE_BEGIN => "CLAP_EVENT_PARAM_GESTURE_BEGIN",
        CLAP_EVENT_PARAM_GESTURE_END => "CLAP_EVENT_PARAM_GESTURE_END",
        CLAP_EVENT_TRANSPORT => "CLAP_EVENT_TRANSPORT",
        CLAP_EVENT_MIDI => "CLAP_EVENT_MIDI",
        CLAP_EVENT_MIDI_SYSEX => "CLAP_EVENT_MIDI_SYSEX",
        CLAP_EVENT_MIDI2 => "CLAP_EVENT_MIDI2",
        _ => return None,
    };
    Some(name)
}

impl fmt::Display for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Note {
                kind,
                port_index,
                channel,
                key,
                note_id,
                velocity,
            } => write!(
                f,
                "CLAP_EVENT_NOTE_{:<3} port={:>2} chan={:>2} key={:>3} nid={:>6} vel={:>3}",
                kind.label(),
                port_index,
                channel,
                key,
                note_id,
                velocity
            ),
            Self::NoteExpression {
                expression,
                note_id,
                port_index,
                channel,
                key,
                value,
            } => write!(
                f,
                "CLAP_EVENT_NOTE_EXPRESSION {} port={:>2} chan={:>2} key={:>3} nid={:>6} val={}",
                expression, port_index, channel, key, note_id, value
            ),
            Self::ParamValue {
                param_id,
                note_id,
                value,
                ..
            } => write!(
                f,
                "CLAP_EVENT_PARAM_VALUE id={} nid={} val={}",
                param_id, note_id, value
            ),
            Self::ParamMod {
                param_id,
                note_id,
                amount,
                ..
            } => write!(
                f,
                "CLAP_EVENT_PARAM_MOD id={} nid={} amt={}",
                param_id, note_id, amount
            ),
            Self::ParamGesture { begin, param_id } => {
                let edge = if begin { "BEGIN" } else { "END" };
                write!(f, "CLAP_EVENT_PARAM_GESTURE_{} id={}", edge, param_id)
            }
            Self::Transport(info) => {
                let state = if info.is_playing() {
                    "playing"
                } else {
                    "stopped"
                };
                write!(f, "CLAP_EVENT_TRANSPORT {}", state)?;
                if info.is_recording() {
                    write!(f, " rec")?;
                }
                if info.is_looping() {
                    write!(f, " loop")?;
                }
                if info.flags & CLAP_TRANSPORT_HAS_TEMPO != 0 {
                    write!(f, " tempo={:.2}", info.tempo)?;
                }
                if info.flags & CLAP_TRANSPORT_HAS_BEATS_TIMELINE != 0 {
                    write!(f, " beat={:.3} bar={}", info.song_pos_beats, info.bar_number)?;
                }
                if info.flags & CLAP_TRANSPORT_HAS_TIME_SIGNATURE != 0 {
                    write!(f, " sig={}/{}", info.tsig_num, info.tsig_denom)?;
                }
                Ok(())
            }
            Self::Midi { port_index, data } => write!(
                f,
                "CLAP_EVENT_MIDI port={:>2} data={:02x} {:02x} {:02x}",
                port_index, data[0], data[1], data[2]
            ),
            Self::MidiSysex { port_index, length } => write!(
                f,
                "CLAP_EVENT_MIDI_SYSEX port={:>2} len={}",
                port_index, length
            ),
            Self::Midi2 { port_index, words } => write!(
                f,
                "CLAP_EVENT_MIDI2 port={:>2} data={:08x} {:08x} {:08x} {:08x}",
                port_index, words[0], words[1], words[2], words[3]
            ),
            Self::NonCore { .. } => f.write_str(NON_CORE_SUMMARY),
            Self::Truncated { event_type } => match event_type_name(event_type) {
                Some(name) => write!(f, "{} (truncated)", name),
                None => write!(f, "{} (truncated)", UNDECODED_SUMMARY),
            },
            Self::Undecoded { .. } => f.write_str(UNDECODED_SUMMARY),
        }
    }
}

/// Human-readable one-line summary of a record.
pub fn text_summary(record: &EventRecord) -> String {
    EventPayload::decode(record).to_string()
}
