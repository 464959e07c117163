//! Change-kinds
//!
//! A [`Recalc`] mask describes which categories of a datablock changed.
//! Tagging code walks the set bits one at a time; each bit is classified
//! independently into the component and operation it invalidates.

use std::fmt;

use bitflags::Flags;

bitflags::bitflags! {
    /// Change-kind bits accumulated on a datablock.
    ///
    /// The empty mask is the legacy "zero" change-kind: something changed,
    /// but nobody said what.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Recalc: u32 {
        const TRANSFORM = 1 << 0;
        const GEOMETRY = 1 << 1;
        const ANIMATION = 1 << 2;

        const PSYS_REDO = 1 << 3;
        const PSYS_RESET = 1 << 4;
        const PSYS_CHILD = 1 << 5;
        const PSYS_PHYS = 1 << 6;
        /// Every particle change-kind.
        const PSYS_ALL = Self::PSYS_REDO.bits()
            | Self::PSYS_RESET.bits()
            | Self::PSYS_CHILD.bits()
            | Self::PSYS_PHYS.bits();

        const SHADING = 1 << 7;
        const SELECT = 1 << 9;
        const BASE_FLAGS = 1 << 10;
        const POINT_CACHE = 1 << 11;
        /// Notify editors; no graph component is involved.
        const EDITORS = 1 << 12;
        const COPY_ON_WRITE = 1 << 13;
        const SEQUENCER_STRIPS = 1 << 14;

        const AUDIO_SEEK = 1 << 15;
        const AUDIO_FPS = 1 << 16;
        const AUDIO_VOLUME = 1 << 17;
        const AUDIO_MUTE = 1 << 18;
        const AUDIO_LISTENER = 1 << 19;
        const AUDIO = Self::AUDIO_SEEK.bits()
            | Self::AUDIO_FPS.bits()
            | Self::AUDIO_VOLUME.bits()
            | Self::AUDIO_MUTE.bits()
            | Self::AUDIO_LISTENER.bits();

        const PARAMETERS = 1 << 20;
        const SOURCE = 1 << 21;
    }
}

impl Recalc {
    /// Bits set on a datablock invalidated without a known change-kind.
    ///
    /// Particles and animation are left out: they are expensive to redo and
    /// rarely implied by an unspecified change.
    pub fn zero_invalidation() -> Recalc {
        Recalc::all().difference(Recalc::PSYS_ALL | Recalc::ANIMATION)
    }

    /// Iterate over every set bit, lowest first, each as its own mask.
    ///
    /// Bits without a name are yielded too.
    pub fn single_bits(self) -> SingleBits {
        SingleBits {
            remaining: self.bits(),
        }
    }

    /// Name of a single named flag, such as `"GEOMETRY"`.
    pub fn flag_name(self) -> Option<&'static str> {
        Self::FLAGS
            .iter()
            .find(|flag| flag.value().bits() == self.bits())
            .map(|flag| flag.name())
    }
}

/// Iterator over the set bits of a [`Recalc`] mask.
#[derive(Debug, Clone)]
pub struct SingleBits {
    remaining: u32,
}

impl Iterator for SingleBits {
    type Item = Recalc;

    fn next(&mut self) -> Option<Recalc> {
        if self.remaining == 0 {
            return None;
        }
        let lowest = self.remaining & self.remaining.wrapping_neg();
        self.remaining &= !lowest;
        Some(Recalc::from_bits_retain(lowest))
    }
}

impl fmt::Display for Recalc {
    /// Symbolic form used in tag logs, e.g. `TRANSFORM, GEOMETRY`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("LEGACY_0");
        }

        let mut remaining = *self;
        let mut separator = "";
        if remaining.contains(Recalc::PSYS_ALL) {
            f.write_str("PSYS_ALL")?;
            remaining.remove(Recalc::PSYS_ALL);
            separator = ", ";
        }
        for bit in remaining.single_bits() {
            f.write_str(separator)?;
            match bit.flag_name() {
                Some(name) => f.write_str(name)?,
                None => write!(f, "UNKNOWN(0x{:x})", bit.bits())?,
            }
            separator = ", ";
        }
        Ok(())
    }
}

/// Where a tag request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateSource {
    /// Frame change or other time advance.
    Time,
    /// Direct edit by the user, through an editor or an operator.
    UserEdit,
    /// Relations of the graph were rebuilt.
    Relations,
    /// Visibility of datablocks changed.
    Visibility,
}

impl UpdateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateSource::Time => "TIME",
            UpdateSource::UserEdit => "USER_EDIT",
            UpdateSource::Relations => "RELATIONS",
            UpdateSource::Visibility => "VISIBILITY",
        }
    }
}

impl fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
