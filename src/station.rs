//! In-memory image of the station outputs.

use core::fmt;

/// One bit per station, index 0 is station 1.  `true` means energised.
///
/// The controller never builds a vector with more than one bit set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationVector {
    bits: Vec<bool>,
}

impl StationVector {
    /// Every station off.
    pub fn all_off(stations: u8) -> Self {
        Self {
            bits: vec![false; stations as usize],
        }
    }

    /// Only `station` (1-based) on.  Station 0 yields the all-off vector.
    pub fn single(stations: u8, station: u8) -> Self {
        let mut v = Self::all_off(stations);
        if station > 0 && station <= stations {
            v.bits[(station - 1) as usize] = true;
        }
        v
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit for a 0-based index.
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    pub fn is_all_off(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    /// 1-based numbers of the energised stations.
    pub fn active_stations(&self) -> Vec<u8> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| (i + 1) as u8)
            .collect()
    }

    /// Bits in shift order: highest station first.
    pub fn shift_order(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().rev().copied()
    }
}

impl fmt::Display for StationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bits {
            f.write_str(if *b { "1" } else { "0" })?;
        }
        Ok(())
    }
}
