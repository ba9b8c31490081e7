// MIDI output from compositions.
//
// Export happens in two passes:
// - Layout (`Timeline::from_composition`): walk the sections in order with a
//   cursor in seconds. A note sounds from the cursor for its duration and
//   advances the cursor; tempo and time-signature markers take effect at the
//   cursor and advance it by nothing.
// - Encoding (`MidiExporter::to_smf`): convert seconds to ticks through the
//   tempo map and emit SMF Format 1: track 0 carries tempo and time-signature
//   meta events, track 1 the piano part at a fixed velocity.
//
// Uses the `midly` crate for MIDI writing.

use crate::config::{ExportParams, MIN_TEMPO_BPM};
use crate::error::{ComposeError, Result};
use crate::event::{Composition, Event, Marker, Section};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::{Path, PathBuf};

const PIANO_CHANNEL: u8 = 0;

/// A sounding note placed in time, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedNote {
    pub pitch: u8,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempoChange {
    pub time: f64,
    pub bpm: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSignatureChange {
    pub time: f64,
    pub numerator: u8,
    pub denominator: u8,
}

/// A composition laid out on a single time axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub notes: Vec<TimedNote>,
    pub tempo_changes: Vec<TempoChange>,
    pub time_signatures: Vec<TimeSignatureChange>,
    /// Seconds elapsed after the last processed event.
    pub cursor: f64,
}

impl Timeline {
    pub fn from_composition(composition: &Composition) -> Result<Self> {
        let mut timeline = Timeline::default();
        for section in &composition.sections {
            timeline.push_section(section)?;
        }
        Ok(timeline)
    }

    /// Lay out one section at the current cursor.
    pub fn push_section(&mut self, section: &Section) -> Result<()> {
        for (i, event) in section.events.iter().enumerate() {
            match event {
                Event::Note(note) => {
                    let duration = note.duration.ok_or_else(|| {
                        ComposeError::InvalidInput(format!("event {i}: note has no duration"))
                    })?;
                    if !(duration.is_finite() && duration > 0.0) {
                        return Err(ComposeError::InvalidInput(format!(
                            "event {i}: duration {duration} is not a positive length"
                        )));
                    }
                    if note.note > 127 {
                        return Err(ComposeError::InvalidInput(format!(
                            "event {i}: pitch {} is outside MIDI range",
                            note.note
                        )));
                    }
                    self.notes.push(TimedNote {
                        pitch: note.note,
                        start: self.cursor,
                        end: self.cursor + duration,
                    });
                    self.cursor += duration;
                }
                Event::Marker(Marker::Tempo { bpm }) => {
                    if *bpm < MIN_TEMPO_BPM {
                        return Err(ComposeError::InvalidInput(format!(
                            "event {i}: tempo of {bpm} BPM is below {MIN_TEMPO_BPM}"
                        )));
                    }
                    self.tempo_changes.push(TempoChange {
                        time: self.cursor,
                        bpm: *bpm,
                    });
                }
                Event::Marker(Marker::TimeSignature { label, beats }) => {
                    let (numerator, denominator) = parse_time_signature(label)?;
                    if numerator != *beats {
                        log::warn!(
                            "time signature {label} carries {beats} beats; using the label's {numerator}"
                        );
                    }
                    self.time_signatures.push(TimeSignatureChange {
                        time: self.cursor,
                        numerator,
                        denominator,
                    });
                }
                Event::Figure(_) => {
                    return Err(ComposeError::InvalidInput(format!(
                        "event {i}: ornament figure cannot be exported; expand it into notes first"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parse a label such as `6/8` into (6, 8). The denominator must be a power of two.
fn parse_time_signature(label: &str) -> Result<(u8, u8)> {
    let invalid = || ComposeError::InvalidInput(format!("bad time signature '{label}'"));
    let (num, den) = label.split_once('/').ok_or_else(invalid)?;
    let numerator: u8 = num.trim().parse().map_err(|_| invalid())?;
    let denominator: u8 = den.trim().parse().map_err(|_| invalid())?;
    if numerator == 0 || !denominator.is_power_of_two() {
        return Err(invalid());
    }
    Ok((numerator, denominator))
}

/// Piecewise-linear mapping from seconds to ticks.
struct TempoMap {
    ticks_per_quarter: f64,
    /// (start seconds, start ticks, bpm), ordered by start.
    segments: Vec<(f64, f64, f64)>,
}

impl TempoMap {
    fn new(initial_bpm: u16, ticks_per_quarter: u16, changes: &[TempoChange]) -> Self {
        let mut map = TempoMap {
            ticks_per_quarter: ticks_per_quarter as f64,
            segments: vec![(0.0, 0.0, initial_bpm as f64)],
        };
        for change in changes {
            let tick = map.ticks_f(change.time);
            match map.segments.last_mut() {
                Some(last) if last.0 >= change.time => last.2 = change.bpm as f64,
                _ => map.segments.push((change.time, tick, change.bpm as f64)),
            }
        }
        map
    }

    fn ticks_f(&self, seconds: f64) -> f64 {
        let (start, start_tick, bpm) = self
            .segments
            .iter()
            .rev()
            .find(|s| s.0 <= seconds)
            .copied()
            .unwrap_or(self.segments[0]);
        start_tick + (seconds - start) * bpm / 60.0 * self.ticks_per_quarter
    }

    fn ticks(&self, seconds: f64) -> u32 {
        self.ticks_f(seconds).round() as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct MidiExporter {
    params: ExportParams,
}

impl MidiExporter {
    pub fn new(params: ExportParams) -> Self {
        Self { params }
    }

    /// Write the composition to `<output_dir>/<file_name>` and return the path.
    pub fn export(&self, composition: &Composition, output_dir: &Path) -> Result<PathBuf> {
        let bytes = self.to_bytes(composition)?;
        let path = output_dir.join(&self.params.file_name);
        std::fs::write(&path, &bytes)
            .map_err(|e| ComposeError::ExportFailure(format!("writing {}: {e}", path.display())))?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    pub fn to_bytes(&self, composition: &Composition) -> Result<Vec<u8>> {
        let smf = self.to_smf(composition)?;
        let mut buf = Vec::new();
        smf.write(&mut buf)
            .map_err(|e| ComposeError::ExportFailure(format!("encoding MIDI: {e}")))?;
        Ok(buf)
    }

    pub fn to_smf(&self, composition: &Composition) -> Result<Smf<'static>> {
        let p = &self.params;
        if p.initial_tempo_bpm < MIN_TEMPO_BPM {
            return Err(ComposeError::UnsupportedTable(format!(
                "initial tempo of {} BPM is below {MIN_TEMPO_BPM}",
                p.initial_tempo_bpm
            )));
        }
        if p.ticks_per_quarter == 0 || p.ticks_per_quarter > 0x7fff {
            return Err(ComposeError::UnsupportedTable(format!(
                "ticks_per_quarter {} out of range",
                p.ticks_per_quarter
            )));
        }
        if p.velocity > 127 || p.program > 127 {
            return Err(ComposeError::UnsupportedTable(
                "export velocity and program must be 0..=127".into(),
            ));
        }

        let timeline = Timeline::from_composition(composition)?;
        let tempo_map = TempoMap::new(p.initial_tempo_bpm, p.ticks_per_quarter, &timeline.tempo_changes);

        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(p.ticks_per_quarter)),
        ));
        smf.tracks.push(self.meta_track(&timeline, &tempo_map));
        smf.tracks.push(self.piano_track(&timeline, &tempo_map));
        Ok(smf)
    }

    /// Track 0: initial tempo, then tempo and time-signature changes.
    fn meta_track(&self, timeline: &Timeline, tempo_map: &TempoMap) -> Track<'static> {
        let mut events: Vec<(u32, TrackEventKind<'static>)> = vec![
            (0, TrackEventKind::Meta(MetaMessage::TrackName(b"Sonatina"))),
            (0, tempo_event(self.params.initial_tempo_bpm)),
        ];
        for change in &timeline.tempo_changes {
            events.push((tempo_map.ticks(change.time), tempo_event(change.bpm)));
        }
        for ts in &timeline.time_signatures {
            events.push((
                tempo_map.ticks(ts.time),
                TrackEventKind::Meta(MetaMessage::TimeSignature(
                    ts.numerator,
                    ts.denominator.trailing_zeros() as u8,
                    24,
                    8,
                )),
            ));
        }
        // Stable sort keeps tempo before time signature at equal ticks.
        events.sort_by_key(|(tick, _)| *tick);
        to_track(events, 0)
    }

    /// Track 1: the piano part.
    fn piano_track(&self, timeline: &Timeline, tempo_map: &TempoMap) -> Track<'static> {
        let channel = u4::new(PIANO_CHANNEL);
        let velocity = u7::new(self.params.velocity);

        // (tick, 0 = off / 1 = on, kind): note-offs sort before note-ons at the same tick.
        let mut events: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::new();
        for note in &timeline.notes {
            let key = u7::new(note.pitch);
            let start = tempo_map.ticks(note.start);
            // A note shorter than a tick still lasts one, so its off follows its on.
            let end = tempo_map.ticks(note.end).max(start + 1);
            events.push((
                start,
                1,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn { key, vel: velocity },
                },
            ));
            events.push((
                end,
                0,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::new(0),
                    },
                },
            ));
        }
        events.sort_by_key(|(tick, order, _)| (*tick, *order));

        let end_tick = tempo_map.ticks(timeline.cursor);
        let mut ordered: Vec<(u32, TrackEventKind<'static>)> = vec![
            (0, TrackEventKind::Meta(MetaMessage::TrackName(b"Piano"))),
            (
                0,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(self.params.program),
                    },
                },
            ),
        ];
        ordered.extend(events.into_iter().map(|(tick, _, kind)| (tick, kind)));
        to_track(ordered, end_tick)
    }
}

/// Callers guarantee `bpm >= MIN_TEMPO_BPM`, so the period fits in 24 bits.
fn tempo_event(bpm: u16) -> TrackEventKind<'static> {
    TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / bpm as u32)))
}

/// Convert absolute-tick events (already ordered) into a delta-timed track
/// terminated by EndOfTrack at `end_tick` or the last event, whichever is later.
fn to_track(events: Vec<(u32, TrackEventKind<'static>)>, end_tick: u32) -> Track<'static> {
    let mut track: Track<'static> = Vec::with_capacity(events.len() + 1);
    let mut last_tick = 0u32;
    for (tick, kind) in events {
        track.push(TrackEvent {
            delta: u28::new(tick.saturating_sub(last_tick)),
            kind,
        });
        last_tick = last_tick.max(tick);
    }
    track.push(TrackEvent {
        delta: u28::new(end_tick.saturating_sub(last_tick)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}
