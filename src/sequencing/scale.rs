/*
Scales and Note Mapping
=======================

Melody rows are scale degrees, not chromatic notes. Row 0 is the root of the
selected key, row 1 the next degree up, and so on; rows past the end of the
scale wrap into the next octave.

    major, key C:   row  0  1  2  3  4  5  6  7
                    semi 0  2  4  5  7  9 11 12

A note index can also carry whole octaves on top of the row (the arpeggiator
adds multiples of 12), so an index is decoded as

    octave = index div 12     (euclidean)
    row    = index mod 12

and the frequency is

    f = 440 · 2^((key + scale[row mod len] + 12·(row div len + octave + transpose)) / 12)

The reference pitch sits on the key's root: key C with no transpose puts row 0
at 440 Hz.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frequency of row 0 in key C with no transpose.
pub const REFERENCE_HZ: f32 = 440.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Blues,
}

impl Scale {
    pub const ALL: [Scale; 4] = [Scale::Major, Scale::Minor, Scale::Pentatonic, Scale::Blues];

    /// Semitone offsets of each degree from the root.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Key {
    #[default]
    C,
    #[cfg_attr(feature = "serde", serde(rename = "C#"))]
    CSharp,
    D,
    #[cfg_attr(feature = "serde", serde(rename = "D#"))]
    DSharp,
    E,
    F,
    #[cfg_attr(feature = "serde", serde(rename = "F#"))]
    FSharp,
    G,
    #[cfg_attr(feature = "serde", serde(rename = "G#"))]
    GSharp,
    A,
    #[cfg_attr(feature = "serde", serde(rename = "A#"))]
    ASharp,
    B,
}

impl Key {
    pub const ALL: [Key; 12] = [
        Key::C,
        Key::CSharp,
        Key::D,
        Key::DSharp,
        Key::E,
        Key::F,
        Key::FSharp,
        Key::G,
        Key::GSharp,
        Key::A,
        Key::ASharp,
        Key::B,
    ];

    /// Semitones above C.
    pub fn semitone(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Key::C => "C",
            Key::CSharp => "C#",
            Key::D => "D",
            Key::DSharp => "D#",
            Key::E => "E",
            Key::F => "F",
            Key::FSharp => "F#",
            Key::G => "G",
            Key::GSharp => "G#",
            Key::A => "A",
            Key::ASharp => "A#",
            Key::B => "B",
        }
    }
}

/// Semitones above the reference pitch for a note index.
pub fn note_to_semitones(note: i32, scale: Scale, key: Key, transpose: i32) -> i32 {
    let intervals = scale.intervals();
    let len = intervals.len() as i32;

    let octave = note.div_euclid(12);
    let row = note.rem_euclid(12);
    let degree = intervals[(row % len) as usize];

    key.semitone() + degree + 12 * (row / len + octave + transpose)
}

/// Frequency in Hz for a note index (see the module notes for the encoding).
pub fn note_to_frequency(note: i32, scale: Scale, key: Key, transpose: i32) -> f32 {
    let semitones = note_to_semitones(note, scale, key, transpose);
    REFERENCE_HZ * 2.0f32.powf(semitones as f32 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn root_is_reference_pitch() {
        assert!(close(note_to_frequency(0, Scale::Major, Key::C, 0), 440.0));
        assert!(close(note_to_frequency(0, Scale::Minor, Key::A, 0), 440.0 * 2.0f32.powf(9.0 / 12.0)));
    }

    #[test]
    fn rows_walk_the_scale_and_wrap() {
        let semis: Vec<i32> = (0..8).map(|row| note_to_semitones(row, Scale::Major, Key::C, 0)).collect();
        assert_eq!(semis, vec![0, 2, 4, 5, 7, 9, 11, 12]);

        let semis: Vec<i32> = (0..8).map(|row| note_to_semitones(row, Scale::Pentatonic, Key::C, 0)).collect();
        assert_eq!(semis, vec![0, 2, 4, 7, 9, 12, 14, 16]);
    }

    #[test]
    fn twelve_steps_up_is_one_octave() {
        for scale in Scale::ALL {
            for row in 0..8 {
                let base = note_to_frequency(row, scale, Key::D, 0);
                let up = note_to_frequency(row + 12, scale, Key::D, 0);
                assert!(close(up / base, 2.0), "{} row {row}: ratio {}", scale.name(), up / base);
            }
        }
    }

    #[test]
    fn transpose_shifts_whole_octaves() {
        let base = note_to_frequency(3, Scale::Blues, Key::G, 0);
        let down = note_to_frequency(3, Scale::Blues, Key::G, -1);
        assert!(close(base / down, 2.0));
    }
}
