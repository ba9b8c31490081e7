// Macro-form: repeat sections according to a whole-piece template.
//
// - AABA: the first two sections are played again at the end.
// - Rondo: the opening section returns at the end.
// - Theme and variations: everything after the theme is played again.
//
// Repeats are appended after the existing sections. Templates that reach
// past the end of a short composition repeat only what exists.

use crate::event::Composition;
use serde::{Deserialize, Serialize};
use sonatina_prng::RandomSource;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroForm {
    #[serde(rename = "AABA")]
    Aaba,
    Rondo,
    ThemeVariations,
}

impl MacroForm {
    pub const ALL: [MacroForm; 3] = [MacroForm::Aaba, MacroForm::Rondo, MacroForm::ThemeVariations];

    /// Index range of the sections this form repeats, clamped to `len`.
    pub fn repeated_range(self, len: usize) -> std::ops::Range<usize> {
        match self {
            MacroForm::Aaba => 0..len.min(2),
            MacroForm::Rondo => 0..len.min(1),
            MacroForm::ThemeVariations => len.min(1)..len,
        }
    }
}

impl fmt::Display for MacroForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MacroForm::Aaba => "AABA",
            MacroForm::Rondo => "rondo",
            MacroForm::ThemeVariations => "theme_variations",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormStructureGenerator;

impl FormStructureGenerator {
    pub fn new() -> Self {
        FormStructureGenerator
    }

    /// Pick a form uniformly and apply it.
    pub fn apply(
        &self,
        composition: Composition,
        rng: &mut impl RandomSource,
    ) -> (Composition, MacroForm) {
        let form = rng
            .pick(&MacroForm::ALL)
            .copied()
            .unwrap_or(MacroForm::Rondo);
        (self.apply_form(composition, form), form)
    }

    pub fn apply_form(&self, mut composition: Composition, form: MacroForm) -> Composition {
        let range = form.repeated_range(composition.len());
        let repeats = composition.sections[range].to_vec();
        log::debug!(
            "form: {form} repeats {} of {} sections",
            repeats.len(),
            composition.len()
        );
        composition.sections.extend(repeats);
        composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NoteEvent, Section};
    use sonatina_prng::SonatinaRng;
    use sonatina_prng::scripted::ScriptedSource;

    fn sections(n: u8) -> Composition {
        Composition::new(
            (0..n)
                .map(|i| Section::new(vec![NoteEvent::new(60 + i).with_duration(0.5).into()]))
                .collect(),
        )
    }

    #[test]
    fn rondo_repeats_the_opening() {
        let input = sections(2);
        let mut rng = ScriptedSource::constant(1, 0.5);
        let (out, form) = FormStructureGenerator::new().apply(input.clone(), &mut rng);
        assert_eq!(form, MacroForm::Rondo);
        assert_eq!(out.len(), 3);
        assert_eq!(out.sections[2], input.sections[0]);
    }

    #[test]
    fn aaba_appends_first_two() {
        let input = sections(4);
        let out = FormStructureGenerator::new().apply_form(input.clone(), MacroForm::Aaba);
        assert_eq!(out.len(), 6);
        assert_eq!(&out.sections[4..], &input.sections[..2]);
    }

    #[test]
    fn theme_variations_appends_all_but_the_theme() {
        let input = sections(4);
        let out = FormStructureGenerator::new().apply_form(input.clone(), MacroForm::ThemeVariations);
        assert_eq!(out.len(), 7);
        assert_eq!(&out.sections[4..], &input.sections[1..]);
    }

    #[test]
    fn growth_matches_form_for_every_length() {
        let generator = FormStructureGenerator::new();
        let mut rng = SonatinaRng::new(21);
        for n in 0..6u8 {
            let len = n as usize;
            for _ in 0..10 {
                let (out, form) = generator.apply(sections(n), &mut rng);
                let k = out.len() - len;
                let expected = match form {
                    MacroForm::Aaba => len.min(2),
                    MacroForm::Rondo => len.min(1),
                    MacroForm::ThemeVariations => len.saturating_sub(1),
                };
                assert_eq!(k, expected, "form {form} on {len} sections");
                if len >= 2 {
                    assert!(out.len() > len);
                }
            }
        }
    }

    #[test]
    fn form_names_serialize() {
        assert_eq!(serde_json::to_string(&MacroForm::Aaba).unwrap(), "\"AABA\"");
        assert_eq!(
            serde_json::to_string(&MacroForm::ThemeVariations).unwrap(),
            "\"theme_variations\""
        );
    }
}
