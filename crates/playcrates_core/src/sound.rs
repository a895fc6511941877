//! Ambient sound cues played when a crate hands out a reward.

use serde::{Deserialize, Serialize};

/// Sound played on reward unless the host configures something else.
pub const DEFAULT_REWARD_SOUND: &str = "block.amethyst_block.chime";

/// A sound to play: identifier, volume and pitch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    /// Host sound identifier.
    pub sound: String,
    /// Playback volume.
    #[serde(default = "unit")]
    pub volume: f32,
    /// Playback pitch.
    #[serde(default = "unit")]
    pub pitch: f32,
}

impl SoundCue {
    /// Creates a cue at volume 1.0 and pitch 1.0.
    #[must_use]
    pub fn new(sound: impl Into<String>) -> Self {
        Self {
            sound: sound.into(),
            volume: 1.0,
            pitch: 1.0,
        }
    }

    /// Sets volume and pitch.
    #[must_use]
    pub const fn with_levels(mut self, volume: f32, pitch: f32) -> Self {
        self.volume = volume;
        self.pitch = pitch;
        self
    }
}

impl Default for SoundCue {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_SOUND)
    }
}

const fn unit() -> f32 {
    1.0
}

/// Serde adapter for `Vec<Option<SoundCue>>`.
///
/// TOML has no null, so a disabled slot is written as a table without a
/// `sound` key.
pub(crate) mod optional_cues {
    use super::{unit, SoundCue};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct SoundSlot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sound: Option<String>,
        #[serde(default = "unit")]
        volume: f32,
        #[serde(default = "unit")]
        pitch: f32,
    }

    pub fn serialize<S: Serializer>(
        cues: &[Option<SoundCue>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let slots: Vec<SoundSlot> = cues
            .iter()
            .map(|cue| match cue {
                Some(cue) => SoundSlot {
                    sound: Some(cue.sound.clone()),
                    volume: cue.volume,
                    pitch: cue.pitch,
                },
                None => SoundSlot {
                    sound: None,
                    volume: 1.0,
                    pitch: 1.0,
                },
            })
            .collect();
        slots.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<SoundCue>>, D::Error> {
        let slots = Vec::<SoundSlot>::deserialize(deserializer)?;
        Ok(slots
            .into_iter()
            .map(|slot| {
                slot.sound.map(|sound| SoundCue {
                    sound,
                    volume: slot.volume,
                    pitch: slot.pitch,
                })
            })
            .collect())
    }
}
