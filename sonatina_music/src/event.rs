// The composition model: events, sections, and compositions.
//
// A section is an ordered list of `Event`s. Three kinds of event flow
// through the pipeline:
// - `Figure`: a three-pitch ornament as produced by the melody stage.
// - `Note`: a single pitch that later stages annotate with dynamic,
//   articulation, and duration.
// - `Marker`: a zero-duration tempo or time-signature change.
//
// Annotating stages call `Section::normalize_figures` first, so every
// pitch they touch is a `Note` regardless of which stage produced it.
// `Melody` and `Composition` share one type; the name marks how far through
// the pipeline a value is.

use serde::{Deserialize, Serialize};

/// Dynamic marking, softest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dynamic {
    Pp,
    P,
    Mp,
    Mf,
    F,
    Ff,
}

impl Dynamic {
    pub const ALL: [Dynamic; 6] = [
        Dynamic::Pp,
        Dynamic::P,
        Dynamic::Mp,
        Dynamic::Mf,
        Dynamic::F,
        Dynamic::Ff,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Articulation {
    Legato,
    Staccato,
    Tenuto,
    Accent,
}

impl Articulation {
    pub const ALL: [Articulation; 4] = [
        Articulation::Legato,
        Articulation::Staccato,
        Articulation::Tenuto,
        Articulation::Accent,
    ];
}

/// A single sounding pitch. Fields other than `note` are filled in by the
/// annotating stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch number.
    pub note: u8,
    /// Length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<Dynamic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articulation: Option<Articulation>,
}

impl NoteEvent {
    pub fn new(note: u8) -> Self {
        NoteEvent {
            note,
            duration: None,
            dynamic: None,
            articulation: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_dynamic(mut self, dynamic: Dynamic) -> Self {
        self.dynamic = Some(dynamic);
        self
    }

    pub fn with_articulation(mut self, articulation: Articulation) -> Self {
        self.articulation = Some(articulation);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentKind {
    Passing,
    Neighbor,
    Suspension,
}

impl OrnamentKind {
    pub const ALL: [OrnamentKind; 3] = [
        OrnamentKind::Passing,
        OrnamentKind::Neighbor,
        OrnamentKind::Suspension,
    ];
}

/// A chord tone decorated by a non-chord tone: `[base, ornament, base]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrnamentFigure {
    pub kind: OrnamentKind,
    pub pitches: [u8; 3],
}

impl OrnamentFigure {
    pub fn to_notes(self) -> [NoteEvent; 3] {
        self.pitches.map(NoteEvent::new)
    }
}

/// Zero-duration metadata event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Marker {
    Tempo {
        #[serde(rename = "value")]
        bpm: u16,
    },
    TimeSignature {
        #[serde(rename = "value")]
        label: String,
        beats: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Note(NoteEvent),
    Marker(Marker),
    Figure(OrnamentFigure),
}

impl Event {
    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            Event::Note(note) => Some(note),
            _ => None,
        }
    }

    /// Time the event occupies on the export cursor. Markers occupy none;
    /// notes without a duration yet also report none.
    pub fn duration(&self) -> f64 {
        match self {
            Event::Note(note) => note.duration.unwrap_or(0.0),
            Event::Marker(_) | Event::Figure(_) => 0.0,
        }
    }
}

impl From<NoteEvent> for Event {
    fn from(note: NoteEvent) -> Self {
        Event::Note(note)
    }
}

impl From<Marker> for Event {
    fn from(marker: Marker) -> Self {
        Event::Marker(marker)
    }
}

impl From<OrnamentFigure> for Event {
    fn from(figure: OrnamentFigure) -> Self {
        Event::Figure(figure)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Section {
    pub events: Vec<Event>,
}

impl Section {
    pub fn new(events: Vec<Event>) -> Self {
        Section { events }
    }

    /// Expand every figure into its three notes, in place. Notes and markers
    /// keep their positions relative to each other.
    pub fn normalize_figures(&mut self) {
        if !self.events.iter().any(|e| matches!(e, Event::Figure(_))) {
            return;
        }
        let mut normalized = Vec::with_capacity(self.events.len() + 2);
        for event in self.events.drain(..) {
            match event {
                Event::Figure(figure) => {
                    normalized.extend(figure.to_notes().into_iter().map(Event::Note));
                }
                other => normalized.push(other),
            }
        }
        self.events = normalized;
    }

    pub fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter_map(Event::as_note)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.events.iter().filter_map(|e| match e {
            Event::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// An ordered list of sections; the value threaded through the pipeline and
/// consumed by the MIDI exporter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    pub sections: Vec<Section>,
}

/// A composition before form and tempo stages have run.
pub type Melody = Composition;

impl Composition {
    pub fn new(sections: Vec<Section>) -> Self {
        Composition { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn normalize_figures(&mut self) {
        for section in &mut self.sections {
            section.normalize_figures();
        }
    }

    pub fn note_count(&self) -> usize {
        self.sections.iter().map(|s| s.notes().count()).sum()
    }

    /// Total sounding time in seconds, summing every event's duration.
    pub fn total_duration(&self) -> f64 {
        self.sections
            .iter()
            .flat_map(|s| s.events.iter())
            .map(Event::duration)
            .sum()
    }
}
